use std::{
    io,
    ops::Range,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use blockpad::editor::{
    ActiveMenu, BlockEditor, BlockId, BlockType, CaretPlacement, EditError, KeyInput, MenuEntry,
    MenuItem, NavKey, TEMPLATE_PAGES, insert_menu_entries,
};
use blockpad::editor_display::{EditorDisplay, HitTarget};
use blockpad::render::{CaretSlot, RenderResult};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const MOUSE_SCROLL_LINES: usize = 3;
const LOG_FILTER_ENV: &str = "BLOCKPAD_LOG";

/// A block-structured document editor for the terminal
#[derive(Debug, Parser)]
#[command(name = "blockpad", version, about)]
struct Args {
    /// Page to open. `welcome` and `getting-started` open a template, any
    /// other name starts an untitled page
    #[arg(value_name = "PAGE", default_value = "welcome")]
    page: String,

    /// File the log is written to
    #[arg(long, value_name = "PATH", default_value = "blockpad.log")]
    log_file: PathBuf,

    /// Print the built-in page templates and exit
    #[arg(long)]
    list_pages: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.list_pages {
        for page in TEMPLATE_PAGES {
            println!("{page}");
        }
        return Ok(());
    }

    let _log_guard = configure_logging(&args.log_file)?;
    run(&args.page)
}

/// Logs go to a file because the terminal belongs to the UI.
fn configure_logging(path: &Path) -> Result<Option<WorkerGuard>> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // A subscriber is already installed; the guard is dropped so its writer shuts down.
        Err(_) => Ok(None),
    }
}

fn editor_wrap_configuration(width: usize) -> (usize, usize) {
    if width == 0 {
        return (1, 0);
    }
    if width < 60 {
        let wrap_width = width.saturating_sub(1).max(1);
        return (wrap_width, 0);
    }
    if width < 100 {
        let padding = 2.min(width / 2);
        let wrap_width = width.saturating_sub(padding.saturating_mul(2)).max(1);
        return (wrap_width, padding);
    }
    let mut left_padding = width.saturating_sub(100) / 2 + 4;
    let max_padding = width.saturating_sub(1) / 2;
    if left_padding > max_padding {
        left_padding = max_padding;
    }
    let wrap_width = width.saturating_sub(left_padding.saturating_mul(2)).max(1);
    (wrap_width, left_padding)
}

/// Places a `width` x `height` menu right below the block spanning
/// `block_lines`, or above it when there is no room below. The block may be
/// scrolled out of view, so the result is clamped to `area`.
fn menu_popup_area(
    area: Rect,
    text_area: Rect,
    block_lines: Option<Range<usize>>,
    scroll_top: usize,
    width: u16,
    height: u16,
) -> Rect {
    let visible_rows = text_area.height as usize;
    let anchor_row = block_lines
        .map_or(0, |lines| lines.end)
        .saturating_sub(scroll_top)
        .min(visible_rows) as u16;
    let below = text_area.y.saturating_add(anchor_row);
    let y = if below.saturating_add(height) <= area.bottom() {
        below
    } else {
        below.saturating_sub(height + 1)
    };
    let y = y
        .min(area.bottom().saturating_sub(height))
        .max(area.y);
    let x = text_area
        .x
        .min(area.x + area.width.saturating_sub(width))
        .max(area.x);
    Rect::new(x, y, width, height).intersection(area)
}

fn run(page: &str) -> Result<()> {
    info!(target: "blockpad", page, "starting");
    let mut app = App::new(page);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    info!(target: "blockpad", "exiting");
    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let had_message_before = app.has_status_message();
            app.on_tick();
            last_tick = Instant::now();
            if had_message_before && !app.has_status_message() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

/// A row of a block menu popup.
enum MenuRow {
    Section(&'static str),
    Item(MenuItem),
}

struct App {
    display: EditorDisplay,
    scroll_top: usize,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
    last_text_area: Rect,
}

impl App {
    fn new(page: &str) -> Self {
        let mut display = EditorDisplay::new(BlockEditor::open(page));
        display.focus_title();
        Self {
            display,
            scroll_top: 0,
            should_quit: false,
            status_message: None,
            last_text_area: Rect::default(),
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn has_status_message(&self) -> bool {
        self.status_message.is_some()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Surfaces a failed edit in the status bar instead of ending the session.
    fn report<T>(&mut self, result: Result<T, EditError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "blockpad", %err, "edit failed");
                self.set_status(err.to_string());
                None
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let editor_area = vertical[0];
        let status_area = vertical[1];

        let (wrap_width, left_padding) = editor_wrap_configuration(editor_area.width as usize);
        let text_area = Rect::new(
            editor_area.x + left_padding as u16,
            editor_area.y,
            (wrap_width as u16).min(editor_area.width.saturating_sub(left_padding as u16)),
            editor_area.height,
        );

        let render = self.display.render(wrap_width);
        self.display
            .update_after_render(text_area, render.total_lines);
        self.last_text_area = text_area;
        let viewport_height = text_area.height as usize;
        self.adjust_scroll(&render, viewport_height);

        let paragraph = Paragraph::new(Text::from(render.lines.clone()))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        if let Some(cursor) = self.display.last_cursor_visual()
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport_height
            && text_area.width > 0
        {
            let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        let status_line = self.status_line(status_area.width as usize);
        let status_widget = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::NONE))
            .style(self.display.theme().status_bar_style());
        frame.render_widget(status_widget, status_area);

        if let Some(menu) = self.display.active_menu() {
            self.render_block_menu(frame, editor_area, menu);
        }
    }

    fn menu_rows(&self, menu: ActiveMenu) -> (&'static str, Vec<MenuRow>, usize) {
        match menu {
            ActiveMenu::Insert(_) => {
                let current = self.display.menus().insert_selection().unwrap_or(0);
                let mut rows = Vec::new();
                let mut selected = 0;
                let mut item_index = 0;
                for entry in insert_menu_entries() {
                    match entry {
                        MenuEntry::Section(title) => rows.push(MenuRow::Section(*title)),
                        MenuEntry::Item(item) => {
                            if item_index == current {
                                selected = rows.len();
                            }
                            rows.push(MenuRow::Item(*item));
                            item_index += 1;
                        }
                    }
                }
                ("Add block", rows, selected)
            }
            ActiveMenu::Slash(_) => {
                let rows = self
                    .display
                    .menus()
                    .visible_slash_items()
                    .into_iter()
                    .map(MenuRow::Item)
                    .collect();
                let selected = self.display.menus().slash_selection().unwrap_or(0);
                ("Turn into", rows, selected)
            }
        }
    }

    /// Draws the active menu just below (or above) the block it belongs to.
    fn render_block_menu(&self, frame: &mut Frame, area: Rect, menu: ActiveMenu) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let (title, rows, selected) = self.menu_rows(menu);
        let theme = self.display.theme();

        let max_label_width = rows
            .iter()
            .map(|row| match row {
                MenuRow::Item(item) => item.label.chars().count(),
                MenuRow::Section(_) => 0,
            })
            .max()
            .unwrap_or(0);
        let content_width = rows
            .iter()
            .map(|row| match row {
                MenuRow::Item(item) => max_label_width + 2 + item.description.chars().count(),
                MenuRow::Section(section) => section.chars().count(),
            })
            .max()
            .unwrap_or(0)
            .max(title.chars().count());

        let width = (content_width as u16 + 4).min(area.width).max(10.min(area.width));
        let height = (rows.len() as u16 + 2).min(area.height).max(3.min(area.height));

        let target = match menu {
            ActiveMenu::Insert(id) | ActiveMenu::Slash(id) => id,
        };
        let popup_area = menu_popup_area(
            area,
            self.last_text_area,
            self.display.block_lines(target),
            self.scroll_top,
            width,
            height,
        );
        if popup_area.is_empty() {
            return;
        }

        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match row {
                MenuRow::Section(section) => ListItem::new(Line::from(Span::styled(
                    *section,
                    theme.menu_section_style(),
                ))),
                MenuRow::Item(item) => ListItem::new(Line::from(vec![
                    Span::raw(format!(
                        "{label:<width$}  ",
                        label = item.label,
                        width = max_label_width
                    )),
                    Span::styled(item.description, theme.menu_description_style()),
                ])),
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(selected));

        let list = List::new(items)
            .highlight_style(theme.menu_selected_style())
            .style(theme.menu_style())
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .style(theme.menu_style())
                    .border_style(theme.gutter_style()),
            );

        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn status_line(&mut self, terminal_width: usize) -> Line<'static> {
        self.prune_status_message();

        let position = self.caret_position_text();
        if let Some((message, _)) = &self.status_message {
            return Line::from(vec![
                Span::raw(format!("{} ", position)),
                Span::raw(message.clone()),
            ]);
        }

        let theme = self.display.theme();
        let block_count = self.display.blocks().len();
        let word_count = self.count_words();
        let all_shortcuts = [
            "^D:Duplicate",
            "^K:Delete",
            "^N:New",
            "^Space:Insert",
            "^Q:Quit",
        ];

        let mut spans = vec![
            Span::raw(position),
            Span::raw(" "),
            Span::styled(self.display.page_id().to_string(), theme.page_id_style()),
            Span::raw(format!(", {} blocks, {} words", block_count, word_count)),
        ];

        let left_width: usize = spans.iter().map(|span| span.content.chars().count()).sum();
        let min_padding = 1;
        let mut shortcuts_to_show = Vec::new();
        let mut shortcuts_width = 0;
        for shortcut in all_shortcuts.iter().rev() {
            let test_width = if shortcuts_to_show.is_empty() {
                shortcut.chars().count()
            } else {
                shortcuts_width + 1 + shortcut.chars().count()
            };
            if left_width + min_padding + test_width <= terminal_width {
                shortcuts_to_show.insert(0, *shortcut);
                shortcuts_width = test_width;
            } else {
                break;
            }
        }

        if !shortcuts_to_show.is_empty() {
            let padding = terminal_width
                .saturating_sub(left_width)
                .saturating_sub(shortcuts_width)
                .max(min_padding);
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::raw(shortcuts_to_show.join(" ")));
        }

        Line::from(spans)
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn caret_position_text(&self) -> String {
        match self.display.caret().map(|caret| caret.slot) {
            Some(CaretSlot::Title) => "Title".to_string(),
            Some(CaretSlot::Block(id)) => {
                let index = self.display.store().position(id).map_or(0, |index| index + 1);
                let label = self
                    .display
                    .block(id)
                    .map_or("", |block| block.block_type.label());
                format!("{} {}/{}", label, index, self.display.blocks().len())
            }
            None => "-".to_string(),
        }
    }

    fn count_words(&self) -> usize {
        self.display
            .blocks()
            .iter()
            .map(|block| block.content.split_whitespace().count())
            .sum()
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render
            .total_lines
            .saturating_sub(viewport)
            .min(render.total_lines);
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
        if self.display.cursor_following()
            && let Some(cursor) = self.display.last_cursor_visual()
        {
            self.scroll_top = self.scroll_top_for_cursor(cursor.line, viewport, max_scroll);
        }
    }

    fn scroll_top_for_cursor(
        &self,
        cursor_line: usize,
        viewport: usize,
        max_scroll: usize,
    ) -> usize {
        let mut scroll = self.scroll_top.min(max_scroll);
        if viewport == 0 {
            return scroll;
        }

        let margin = if viewport >= 3 { 1 } else { 0 };
        let top_limit = scroll.saturating_add(margin);
        let bottom_offset = viewport.saturating_sub(1).saturating_sub(margin);
        let bottom_limit = scroll.saturating_add(bottom_offset);
        if cursor_line < top_limit {
            scroll = cursor_line.saturating_sub(margin);
        } else if cursor_line > bottom_limit {
            scroll = cursor_line.saturating_sub(bottom_offset);
        }

        scroll.min(max_scroll)
    }

    fn scroll_by_lines(&mut self, delta: isize) {
        if delta == 0 {
            return;
        }
        self.display.set_cursor_following(false);
        let viewport = self.display.last_view_height().max(1);
        let max_scroll = self
            .display
            .last_total_lines()
            .saturating_sub(viewport) as isize;
        let new_scroll = (self.scroll_top as isize + delta).clamp(0, max_scroll.max(0));
        self.scroll_top = new_scroll as usize;
    }

    fn focused_block(&mut self) -> Option<BlockId> {
        let focused = self.display.focused();
        if focused.is_none() {
            self.set_status("Select a block first");
        }
        focused
    }

    // Keyboard

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers),
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if self.handle_menu_key(code) {
            return;
        }

        let control = modifiers.contains(KeyModifiers::CONTROL);
        let command = control || modifiers.contains(KeyModifiers::ALT);
        let shift = modifiers.contains(KeyModifiers::SHIFT);

        match code {
            KeyCode::Char('q') | KeyCode::Char('c') if control => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') if control => {
                if let Some(id) = self.focused_block() {
                    let result = self.display.toggle_insert_menu(id);
                    self.report(result);
                    self.display.set_cursor_following(true);
                }
            }
            KeyCode::Char('d') if control => {
                if let Some(id) = self.focused_block() {
                    let result = self.display.duplicate(id);
                    if self.report(result).is_some() {
                        self.set_status("Block duplicated");
                    }
                }
            }
            KeyCode::Char('x') if control => {
                if let Some(id) = self.focused_block() {
                    let result = self.display.toggle_checked(id);
                    if self.report(result) == Some(false) {
                        self.set_status("Only to-do items can be checked");
                    }
                }
            }
            KeyCode::Char('k') if control => {
                if let Some(id) = self.focused_block() {
                    let result = self.display.delete(id);
                    if self.report(result) == Some(false) {
                        self.set_status("The last block cannot be deleted");
                    }
                }
            }
            KeyCode::Char('n') if control => {
                let result = self.display.append_block(BlockType::Paragraph);
                self.report(result);
            }
            KeyCode::Char(ch) if !command => {
                let result = self.display.insert_char(ch);
                self.report(result);
            }
            KeyCode::Enter => self.nav_key(NavKey::Enter, shift, false),
            KeyCode::Backspace => self.nav_key(NavKey::Backspace, false, false),
            KeyCode::Up => self.nav_key(NavKey::Up, false, command),
            KeyCode::Down => self.nav_key(NavKey::Down, false, command),
            KeyCode::Delete => {
                let result = self.display.delete_forward();
                self.report(result);
            }
            KeyCode::Left => {
                self.display.move_left();
            }
            KeyCode::Right => {
                self.display.move_right();
            }
            KeyCode::Home => {
                self.display.move_to_start();
            }
            KeyCode::End => {
                self.display.move_to_end();
            }
            KeyCode::Esc if self.display.dragged().is_some() => {
                self.display.cancel_drag();
                self.display.set_drop_target(None);
            }
            KeyCode::Esc => self.display.blur(),
            _ => {}
        }
    }

    fn nav_key(&mut self, key: NavKey, shift: bool, command: bool) {
        let input = KeyInput {
            key,
            shift,
            command,
        };
        let result = self.display.handle_nav_key(input);
        if let Some(outcome) = self.report(result) {
            debug!(target: "blockpad", ?input, ?outcome, "navigation key");
        }
    }

    /// Up, Down, Enter and Esc drive the active menu while one is open.
    fn handle_menu_key(&mut self, code: KeyCode) -> bool {
        let Some(menu) = self.display.active_menu() else {
            return false;
        };
        match code {
            KeyCode::Esc => self.display.close_active_menu(),
            KeyCode::Up => self.display.move_menu_selection(-1),
            KeyCode::Down => self.display.move_menu_selection(1),
            KeyCode::Enter => {
                let result = self.display.select_menu_entry();
                if let Some(Some(id)) = self.report(result) {
                    let label = self
                        .display
                        .block(id)
                        .map_or("", |block| block.block_type.label());
                    let message = match menu {
                        ActiveMenu::Insert(_) => format!("Added {label}"),
                        ActiveMenu::Slash(_) => format!("Turned into {label}"),
                    };
                    self.set_status(message);
                }
            }
            _ => return false,
        }
        true
    }

    // Mouse

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.scroll_by_lines(-(MOUSE_SCROLL_LINES as isize));
            }
            MouseEventKind::ScrollDown => {
                self.scroll_by_lines(MOUSE_SCROLL_LINES as isize);
            }
            MouseEventKind::Down(MouseButton::Left) => self.handle_mouse_down(event),
            MouseEventKind::Drag(MouseButton::Left) => self.handle_mouse_drag(event),
            MouseEventKind::Up(MouseButton::Left) => self.handle_mouse_up(event),
            _ => {}
        }
    }

    fn handle_mouse_down(&mut self, event: MouseEvent) {
        let hit = self
            .display
            .hit_test(event.column, event.row, self.scroll_top);
        if self.display.active_menu().is_some()
            && !matches!(hit, Some(HitTarget::InsertButton(_)))
        {
            self.display.close_active_menu();
            return;
        }

        let result = match hit {
            Some(HitTarget::Title) => {
                self.display.focus_title();
                Ok(())
            }
            Some(HitTarget::DragHandle(id)) => self.display.begin_drag(id),
            Some(HitTarget::InsertButton(id)) => self.display.toggle_insert_menu(id),
            Some(HitTarget::Checkbox(id)) => self.display.toggle_checked(id).map(|_| ()),
            Some(HitTarget::Text(id)) => self.display.focus_block(id, CaretPlacement::End),
            None => Ok(()),
        };
        self.report(result);
    }

    fn handle_mouse_drag(&mut self, event: MouseEvent) {
        if self.display.dragged().is_none() {
            return;
        }
        let target = self
            .display
            .hit_test(event.column, event.row, self.scroll_top)
            .and_then(HitTarget::block);
        self.display.set_drop_target(target);
    }

    fn handle_mouse_up(&mut self, event: MouseEvent) {
        if self.display.dragged().is_none() {
            return;
        }
        self.display.set_drop_target(None);
        let target = self
            .display
            .hit_test(event.column, event.row, self.scroll_top)
            .and_then(HitTarget::block);
        match target {
            Some(target) => {
                let result = self.display.drop_on(target);
                if self.report(result) == Some(true) {
                    self.set_status("Block moved");
                }
            }
            None => self.display.cancel_drag(),
        }
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn draw(terminal: &mut Terminal<TestBackend>, app: &mut App) {
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }

    fn control(app: &mut App, ch: char) {
        app.handle_key(KeyCode::Char(ch), KeyModifiers::CONTROL);
    }

    #[test]
    fn insert_menu_for_block_scrolled_out_of_view_draws_inside_frame() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let mut app = App::new("welcome");
        for _ in 0..40 {
            control(&mut app, 'n');
        }
        draw(&mut terminal, &mut app);
        let last = app.display.store().last_id();
        assert_eq!(app.display.focused(), Some(last));
        assert!(app.scroll_top > 0);

        app.scroll_by_lines(-1000);
        assert_eq!(app.scroll_top, 0);
        control(&mut app, ' ');
        assert_eq!(app.display.active_menu(), Some(ActiveMenu::Insert(last)));

        draw(&mut terminal, &mut app);
        assert!(app.scroll_top > 0);
        let lines = app.display.block_lines(last).unwrap();
        assert!(lines.start >= app.scroll_top);
    }

    #[test]
    fn menu_popup_is_clamped_to_the_editor_area() {
        let area = Rect::new(0, 0, 60, 11);

        // Block far below the viewport: the popup sits at the bottom.
        let popup = menu_popup_area(area, area, Some(38..39), 0, 30, 8);
        assert_eq!(popup, Rect::new(0, 2, 30, 8));

        // Block above the viewport: the popup starts at the top.
        let popup = menu_popup_area(area, area, Some(0..2), 20, 30, 8);
        assert_eq!(popup, Rect::new(0, 0, 30, 8));

        // Visible block: the popup opens right below it.
        let popup = menu_popup_area(area, area, Some(2..3), 0, 30, 8);
        assert_eq!(popup, Rect::new(0, 3, 30, 8));

        // Oversized popups are cut down to the area.
        let popup = menu_popup_area(area, area, None, 0, 80, 20);
        assert_eq!(popup, area);
    }

    #[test]
    fn escape_leaves_the_focused_block() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut app = App::new("welcome");
        control(&mut app, 'n');
        draw(&mut terminal, &mut app);
        let last = app.display.store().last_id();
        assert_eq!(app.display.focused(), Some(last));

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.display.focused(), None);
        assert_eq!(app.display.caret(), None);

        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(app.display.block(last).unwrap().content, "");
    }

    #[test]
    fn escape_during_drag_cancels_only_the_drag() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut app = App::new("welcome");
        control(&mut app, 'n');
        draw(&mut terminal, &mut app);
        let first = app.display.store().first_id();
        let last = app.display.store().last_id();
        app.display.begin_drag(first).unwrap();

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.display.dragged(), None);
        assert_eq!(app.display.focused(), Some(last));
    }
}
