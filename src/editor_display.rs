use std::ops::{Deref, DerefMut, Range};

use ratatui::layout::Rect;
use tracing::debug;

use crate::editor::{
    BlockEditor, BlockId, BlockType, CaretPlacement, EditError, FocusRequest, FocusSurface,
    KeyInput, KeyOutcome, NavKey, affordance,
};
use crate::render::{
    Caret, CaretSlot, CursorVisualPosition, GUTTER_WIDTH, INSERT_BUTTON_COLUMN, PageView,
    RenderResult, render_page,
};
use crate::theme::Theme;

/// Marks the caret inside text handed to the renderer.
pub const CURSOR_SENTINEL: char = '\u{F8FF}';

const CHECKBOX_WIDTH: u16 = 4;

/// What sits under a mouse position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Title,
    DragHandle(BlockId),
    InsertButton(BlockId),
    Checkbox(BlockId),
    Text(BlockId),
}

impl HitTarget {
    pub fn block(self) -> Option<BlockId> {
        match self {
            HitTarget::Title => None,
            HitTarget::DragHandle(id)
            | HitTarget::InsertButton(id)
            | HitTarget::Checkbox(id)
            | HitTarget::Text(id) => Some(id),
        }
    }
}

/// EditorDisplay wraps a BlockEditor and owns everything the editor itself
/// keeps out of: the caret, the mounted layout and the visual state of a
/// drag in progress.
#[derive(Debug)]
pub struct EditorDisplay {
    editor: BlockEditor,
    surface: MountedSurface,
    theme: Theme,
    drop_target: Option<BlockId>,
    last_cursor_visual: Option<CursorVisualPosition>,
    cursor_following: bool,
    last_view_height: usize,
    last_total_lines: usize,
    last_text_area: Rect,
}

impl EditorDisplay {
    /// Create a new EditorDisplay with the given editor
    pub fn new(editor: BlockEditor) -> Self {
        Self::with_theme(editor, Theme::default())
    }

    pub fn with_theme(editor: BlockEditor, theme: Theme) -> Self {
        Self {
            editor,
            surface: MountedSurface::default(),
            theme,
            drop_target: None,
            last_cursor_visual: None,
            cursor_following: true,
            last_view_height: 1,
            last_total_lines: 0,
            last_text_area: Rect::default(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Current caret, if any field is being edited
    pub fn caret(&self) -> Option<Caret> {
        self.surface.caret
    }

    /// Get the last cursor visual position
    pub fn last_cursor_visual(&self) -> Option<CursorVisualPosition> {
        self.last_cursor_visual
    }

    /// Check if cursor following is enabled
    pub fn cursor_following(&self) -> bool {
        self.cursor_following
    }

    /// Set cursor following mode
    pub fn set_cursor_following(&mut self, following: bool) {
        self.cursor_following = following;
    }

    /// Get last view height
    pub fn last_view_height(&self) -> usize {
        self.last_view_height
    }

    /// Get last total lines
    pub fn last_total_lines(&self) -> usize {
        self.last_total_lines
    }

    /// Rendered lines of a mounted block
    pub fn block_lines(&self, id: BlockId) -> Option<Range<usize>> {
        self.surface
            .blocks
            .iter()
            .find(|mounted| mounted.id == id)
            .map(|mounted| mounted.lines.clone())
    }

    pub fn drop_target(&self) -> Option<BlockId> {
        self.drop_target
    }

    /// Highlight `target` as the landing spot of the block being dragged
    pub fn set_drop_target(&mut self, target: Option<BlockId>) {
        self.drop_target = target.filter(|target| self.editor.drag_over(*target));
    }

    /// Render the page at the given width, mount the result and run any
    /// focus move the editor scheduled against the fresh layout.
    pub fn render(&mut self, width: usize) -> RenderResult {
        self.reconcile_caret();
        let mut result = self.render_view(width);
        self.commit(&result);
        if self.editor.flush_pending_focus(&mut self.surface).is_some() {
            self.cursor_following = true;
            result = self.render_view(width);
            self.commit(&result);
        }
        self.last_cursor_visual = result.cursor;
        result
    }

    /// Update tracking state after rendering (called from draw)
    pub fn update_after_render(&mut self, text_area: Rect, total_lines: usize) {
        self.last_text_area = text_area;
        self.last_total_lines = total_lines;
        self.last_view_height = (text_area.height as usize).max(1);
    }

    fn render_view(&self, width: usize) -> RenderResult {
        let view = PageView {
            title: self.editor.title(),
            blocks: self.editor.blocks(),
            focused: self.editor.focused(),
            dragged: self.editor.dragged(),
            drop_target: self.drop_target,
            caret: self.surface.caret,
        };
        render_page(&view, width, &self.theme, CURSOR_SENTINEL)
    }

    fn commit(&mut self, result: &RenderResult) {
        let blocks = result
            .blocks
            .iter()
            .filter_map(|entry| {
                let block = self.editor.block(entry.id)?;
                Some(MountedBlock {
                    id: entry.id,
                    block_type: block.block_type,
                    lines: entry.lines.clone(),
                    chars: block.content.chars().count(),
                })
            })
            .collect();
        self.surface.blocks = blocks;
        self.surface.title_lines = result.title_lines.clone();
    }

    /// Drops a caret whose block is gone and clamps the offset to the text.
    fn reconcile_caret(&mut self) {
        let Some(caret) = self.surface.caret else {
            return;
        };
        let len = match caret.slot {
            CaretSlot::Title => self.editor.title().chars().count(),
            CaretSlot::Block(id) => match self.editor.block(id) {
                Some(block) => block.content.chars().count(),
                None => {
                    debug!(target: "blockpad::display", block = %id, "caret block removed");
                    self.surface.caret = None;
                    return;
                }
            },
        };
        self.surface.caret = Some(Caret {
            offset: caret.offset.min(len),
            ..caret
        });
    }

    // Focus

    /// Move editing into the title field
    pub fn focus_title(&mut self) {
        let len = self.editor.title().chars().count();
        self.surface.caret = Some(Caret {
            slot: CaretSlot::Title,
            offset: len,
        });
        // Title edits never involve a block.
        self.editor.clear_focus();
        self.cursor_following = true;
    }

    /// Focus `block` now if it is mounted, otherwise on the next render
    pub fn focus_block(&mut self, block: BlockId, caret: CaretPlacement) -> Result<(), EditError> {
        self.editor.request_focus(FocusRequest { block, caret })?;
        self.editor.flush_pending_focus(&mut self.surface);
        self.cursor_following = true;
        Ok(())
    }

    /// Leave every field; the caret disappears
    pub fn blur(&mut self) {
        self.surface.caret = None;
        self.editor.clear_focus();
    }

    // Text editing

    pub fn insert_char(&mut self, ch: char) -> Result<bool, EditError> {
        if ch == CURSOR_SENTINEL || ch.is_control() {
            return Ok(false);
        }
        self.edit_text(|text, offset| Some((insert_at(text, offset, ch), offset + 1)))
    }

    /// Insert a soft line break; only multi-line blocks accept one.
    pub fn insert_line_break(&mut self) -> Result<bool, EditError> {
        let Some(CaretSlot::Block(id)) = self.surface.caret.map(|caret| caret.slot) else {
            return Ok(false);
        };
        let block = self.editor.block(id).ok_or(EditError::UnknownBlock(id))?;
        if !affordance(block.block_type).accepts_line_breaks() {
            return Ok(false);
        }
        self.edit_text(|text, offset| Some((insert_at(text, offset, '\n'), offset + 1)))
    }

    pub fn delete_backward(&mut self) -> Result<bool, EditError> {
        self.edit_text(|text, offset| {
            let offset = offset.checked_sub(1)?;
            Some((remove_at(text, offset)?, offset))
        })
    }

    pub fn delete_forward(&mut self) -> Result<bool, EditError> {
        self.edit_text(|text, offset| Some((remove_at(text, offset)?, offset)))
    }

    /// Applies `edit` to the text under the caret. `edit` gets the text and
    /// the caret offset and returns the new text and offset, or `None` when
    /// nothing changes.
    fn edit_text(
        &mut self,
        edit: impl FnOnce(&str, usize) -> Option<(String, usize)>,
    ) -> Result<bool, EditError> {
        let Some(caret) = self.surface.caret else {
            return Ok(false);
        };
        let offset = match caret.slot {
            CaretSlot::Title => {
                let Some((title, offset)) = edit(self.editor.title(), caret.offset) else {
                    return Ok(false);
                };
                self.editor.set_title(title);
                offset
            }
            CaretSlot::Block(id) => {
                let block = self.editor.block(id).ok_or(EditError::UnknownBlock(id))?;
                if !affordance(block.block_type).accepts_text() {
                    return Ok(false);
                }
                let Some((content, offset)) = edit(&block.content, caret.offset) else {
                    return Ok(false);
                };
                self.editor.update(id, &content)?;
                offset
            }
        };
        self.surface.caret = Some(Caret { offset, ..caret });
        self.cursor_following = true;
        Ok(true)
    }

    // Caret movement inside the field

    pub fn move_left(&mut self) -> bool {
        self.move_caret(|offset, _| offset.checked_sub(1))
    }

    pub fn move_right(&mut self) -> bool {
        self.move_caret(|offset, len| (offset < len).then_some(offset + 1))
    }

    pub fn move_to_start(&mut self) -> bool {
        self.move_caret(|offset, _| (offset > 0).then_some(0))
    }

    pub fn move_to_end(&mut self) -> bool {
        self.move_caret(|offset, len| (offset < len).then_some(len))
    }

    fn move_caret(&mut self, step: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let Some(caret) = self.surface.caret else {
            return false;
        };
        let len = match caret.slot {
            CaretSlot::Title => self.editor.title().chars().count(),
            CaretSlot::Block(id) => self
                .editor
                .block(id)
                .map_or(0, |block| block.content.chars().count()),
        };
        let Some(offset) = step(caret.offset.min(len), len) else {
            return false;
        };
        self.surface.caret = Some(Caret { offset, ..caret });
        self.cursor_following = true;
        true
    }

    // Keyboard navigation

    /// Routes a navigation key through the editor first, then applies the
    /// field's own behaviour if the editor left it alone.
    pub fn handle_nav_key(&mut self, input: KeyInput) -> Result<KeyOutcome, EditError> {
        let Some(caret) = self.surface.caret else {
            return Ok(KeyOutcome::Ignored);
        };
        let id = match caret.slot {
            CaretSlot::Title => return self.handle_title_key(input),
            CaretSlot::Block(id) => id,
        };
        let outcome = self.editor.handle_key(id, input)?;
        if outcome.suppresses_default() {
            self.cursor_following = true;
            return Ok(outcome);
        }
        let handled = match input.key {
            NavKey::Enter if input.shift => self.insert_line_break()?,
            NavKey::Backspace => self.delete_backward()?,
            NavKey::Up if !input.command && self.editor.store().first_id() == id => {
                self.focus_title();
                true
            }
            _ => false,
        };
        Ok(if handled {
            KeyOutcome::Consumed
        } else {
            KeyOutcome::Ignored
        })
    }

    fn handle_title_key(&mut self, input: KeyInput) -> Result<KeyOutcome, EditError> {
        match input.key {
            NavKey::Enter | NavKey::Down => {
                let first = self.editor.store().first_id();
                self.focus_block(first, CaretPlacement::Start)?;
                Ok(KeyOutcome::Consumed)
            }
            NavKey::Backspace => {
                self.delete_backward()?;
                Ok(KeyOutcome::Consumed)
            }
            NavKey::Up => Ok(KeyOutcome::Ignored),
        }
    }

    // Mouse

    /// Resolve a terminal position against the last mounted layout
    pub fn hit_test(&self, column: u16, row: u16, scroll_top: usize) -> Option<HitTarget> {
        let area = self.last_text_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let max_x = area.x.saturating_add(area.width);
        let max_y = area.y.saturating_add(area.height);
        if column < area.x || column >= max_x || row < area.y || row >= max_y {
            return None;
        }
        let line = scroll_top.saturating_add((row - area.y) as usize);
        let relative_column = column - area.x;

        if self.surface.title_lines.contains(&line) {
            return Some(HitTarget::Title);
        }
        let mounted = self
            .surface
            .blocks
            .iter()
            .find(|mounted| mounted.lines.contains(&line))?;
        let on_first_line = line == mounted.lines.start;
        let gutter = GUTTER_WIDTH as u16;
        Some(match relative_column {
            col if on_first_line && col < INSERT_BUTTON_COLUMN => {
                HitTarget::DragHandle(mounted.id)
            }
            col if on_first_line && col < gutter => HitTarget::InsertButton(mounted.id),
            col if on_first_line
                && mounted.block_type == BlockType::Checklist
                && col < gutter + CHECKBOX_WIDTH =>
            {
                HitTarget::Checkbox(mounted.id)
            }
            _ => HitTarget::Text(mounted.id),
        })
    }
}

impl Deref for EditorDisplay {
    type Target = BlockEditor;

    fn deref(&self) -> &Self::Target {
        &self.editor
    }
}

impl DerefMut for EditorDisplay {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.editor
    }
}

/// Layout of the last committed render plus the caret it carries.
#[derive(Debug, Default)]
struct MountedSurface {
    blocks: Vec<MountedBlock>,
    title_lines: Range<usize>,
    caret: Option<Caret>,
}

#[derive(Debug)]
struct MountedBlock {
    id: BlockId,
    block_type: BlockType,
    lines: Range<usize>,
    chars: usize,
}

impl FocusSurface for MountedSurface {
    fn focus_block(&mut self, block: BlockId, caret: CaretPlacement) -> bool {
        let Some(mounted) = self.blocks.iter().find(|mounted| mounted.id == block) else {
            return false;
        };
        let offset = match caret {
            CaretPlacement::Start => 0,
            CaretPlacement::End => mounted.chars,
        };
        self.caret = Some(Caret {
            slot: CaretSlot::Block(block),
            offset,
        });
        true
    }
}

fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(idx, _)| idx)
}

fn insert_at(text: &str, offset: usize, ch: char) -> String {
    let mut result = text.to_string();
    result.insert(byte_index(text, offset), ch);
    result
}

fn remove_at(text: &str, offset: usize) -> Option<String> {
    let (idx, _) = text.char_indices().nth(offset)?;
    let mut result = text.to_string();
    result.remove(idx);
    Some(result)
}
