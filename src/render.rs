use std::borrow::Cow;
use std::ops::Range;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::editor::{Block, BlockId, BlockType, UNTITLED, affordance};
use crate::theme::Theme;

/// Columns left of every block reserved for the drag handle and the insert
/// button.
pub const GUTTER_WIDTH: usize = 4;
/// Column of the drag handle, relative to the text area.
pub const DRAG_HANDLE_COLUMN: u16 = 0;
/// Column of the insert button, relative to the text area.
pub const INSERT_BUTTON_COLUMN: u16 = 2;

const GUTTER: &str = "⠿ + ";
const MIN_RULE_WIDTH: usize = 3;

/// The editable field holding the caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretSlot {
    Title,
    Block(BlockId),
}

/// Caret location as a character offset into the slot's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caret {
    pub slot: CaretSlot,
    pub offset: usize,
}

/// Everything needed to draw one page.
#[derive(Clone, Copy, Debug)]
pub struct PageView<'a> {
    pub title: &'a str,
    pub blocks: &'a [Block],
    pub focused: Option<BlockId>,
    pub dragged: Option<BlockId>,
    pub drop_target: Option<BlockId>,
    pub caret: Option<Caret>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

/// Rendered lines occupied by one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockLines {
    pub id: BlockId,
    pub lines: Range<usize>,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
    pub title_lines: Range<usize>,
    pub blocks: Vec<BlockLines>,
}

impl RenderResult {
    pub fn block_at_line(&self, line: usize) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|entry| entry.lines.contains(&line))
            .map(|entry| entry.id)
    }

    pub fn lines_of(&self, id: BlockId) -> Option<Range<usize>> {
        self.blocks
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.lines.clone())
    }
}

pub fn render_page(view: &PageView<'_>, width: usize, theme: &Theme, sentinel: char) -> RenderResult {
    let mut renderer = Renderer::new(width.max(GUTTER_WIDTH + 1), sentinel, theme);
    renderer.render_title(view.title, caret_in(view.caret, CaretSlot::Title));
    for block in view.blocks {
        let caret = caret_in(view.caret, CaretSlot::Block(block.id));
        let start = renderer.lines.len();
        renderer.render_block(block, caret);
        let lines = start..renderer.lines.len();
        renderer.decorate(lines.clone(), block.id, view);
        renderer.blocks.push(BlockLines {
            id: block.id,
            lines,
        });
    }
    renderer.finish()
}

fn caret_in(caret: Option<Caret>, slot: CaretSlot) -> Option<usize> {
    caret
        .filter(|caret| caret.slot == slot)
        .map(|caret| caret.offset)
}

struct Renderer<'a> {
    wrap_width: usize,
    sentinel: char,
    theme: &'a Theme,
    cursor: Option<CursorVisualPosition>,
    lines: Vec<Line<'static>>,
    title_lines: Range<usize>,
    blocks: Vec<BlockLines>,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, sentinel: char, theme: &'a Theme) -> Self {
        Self {
            wrap_width,
            sentinel,
            theme,
            cursor: None,
            lines: Vec::new(),
            title_lines: 0..0,
            blocks: Vec::new(),
        }
    }

    fn render_title(&mut self, title: &str, caret: Option<usize>) {
        let style = self.theme.title_style();
        let fragments = self.content_fragments(title, caret, style, UNTITLED);
        let prefix = vec![LineSegment::blank(GUTTER_WIDTH)];
        let lines = wrap_fragments(&fragments, &prefix, &prefix, self.wrap_width);
        self.consume_lines(lines);
        self.title_lines = 0..self.lines.len();
        self.push_blank_line();
    }

    fn render_block(&mut self, block: &Block, caret: Option<usize>) {
        match block.block_type {
            BlockType::Heading1 | BlockType::Heading2 | BlockType::Heading3 => {
                self.render_heading(block, caret)
            }
            BlockType::Paragraph => self.render_text(block, caret, Style::default(), "", ""),
            BlockType::List => self.render_text(block, caret, Style::default(), "• ", "  "),
            BlockType::Checklist => {
                let (marker, style) = if block.is_checked() {
                    ("[✓] ", self.theme.checked_style())
                } else {
                    ("[ ] ", Style::default())
                };
                self.render_text(block, caret, style, marker, "    ");
            }
            BlockType::Quote => {
                let style = self.theme.quote_style();
                self.render_text(block, caret, style, "| ", "| ");
            }
            BlockType::Code => self.render_code(block, caret),
            BlockType::Divider => self.render_divider(caret),
            BlockType::Image => self.render_image(block, caret),
        }
    }

    fn render_text(
        &mut self,
        block: &Block,
        caret: Option<usize>,
        style: Style,
        marker: &str,
        continuation: &str,
    ) {
        let placeholder = affordance(block.block_type).placeholder;
        let fragments = self.content_fragments(&block.content, caret, style, placeholder);
        let first_prefix = self.gutter_prefix(marker);
        let continuation_prefix = vec![
            LineSegment::blank(GUTTER_WIDTH),
            LineSegment::raw(continuation),
        ];
        let lines = wrap_fragments(
            &fragments,
            &first_prefix,
            &continuation_prefix,
            self.wrap_width,
        );
        self.consume_lines(lines);
    }

    fn render_heading(&mut self, block: &Block, caret: Option<usize>) {
        let style = Style::default().add_modifier(Modifier::BOLD);
        let start = self.lines.len();
        self.render_text(block, caret, style, "", "");

        let underline_char = match block.block_type {
            BlockType::Heading1 => '=',
            BlockType::Heading2 => '-',
            _ => return,
        };
        let width = self.lines[start..]
            .iter()
            .map(line_width)
            .max()
            .unwrap_or(0)
            .saturating_sub(GUTTER_WIDTH);
        let underline = underline_string(width, underline_char);
        self.lines.push(Line::from(vec![
            Span::raw(" ".repeat(GUTTER_WIDTH)),
            Span::styled(underline, style),
        ]));
    }

    fn render_code(&mut self, block: &Block, caret: Option<usize>) {
        let fence = self.rule(GUTTER_WIDTH, '-');
        let code_style = self.theme.code_style();
        let mut first = self.gutter_prefix("");
        first.push(LineSegment::styled(fence.clone(), self.theme.divider_style()));
        self.lines.push(segments_to_line(first));

        let placeholder = affordance(BlockType::Code).placeholder;
        let fragments = self.content_fragments(&block.content, caret, code_style, placeholder);
        let prefix = vec![LineSegment::blank(GUTTER_WIDTH)];
        let lines = wrap_fragments(&fragments, &prefix, &prefix, usize::MAX / 4);
        self.consume_lines(lines);

        self.lines.push(Line::from(vec![
            Span::raw(" ".repeat(GUTTER_WIDTH)),
            Span::styled(fence, self.theme.divider_style()),
        ]));
    }

    fn render_divider(&mut self, caret: Option<usize>) {
        let rule = self.rule(GUTTER_WIDTH, '─');
        let mut segments = self.gutter_prefix("");
        segments.push(LineSegment::styled(rule, self.theme.divider_style()));
        if caret.is_some() {
            self.cursor = Some(CursorVisualPosition {
                line: self.lines.len(),
                column: GUTTER_WIDTH as u16,
            });
        }
        self.lines.push(segments_to_line(segments));
    }

    fn render_image(&mut self, block: &Block, caret: Option<usize>) {
        let url = block.image_url.as_deref().unwrap_or_default();
        let mut segments = self.gutter_prefix("");
        segments.push(LineSegment::styled(
            format!("[image: {url}]"),
            self.theme.image_style(),
        ));
        self.lines.push(segments_to_line(segments));

        let placeholder = affordance(BlockType::Image).placeholder;
        let caption_style = Style::default().add_modifier(Modifier::ITALIC);
        let fragments =
            self.content_fragments(&block.content, caret, caption_style, placeholder);
        let prefix = vec![LineSegment::blank(GUTTER_WIDTH)];
        let lines = wrap_fragments(&fragments, &prefix, &prefix, self.wrap_width);
        self.consume_lines(lines);
    }

    fn content_fragments(
        &self,
        content: &str,
        caret: Option<usize>,
        style: Style,
        placeholder: &str,
    ) -> Vec<FragmentItem> {
        let mut fragments = Vec::new();
        if content.is_empty() {
            if caret.is_some() {
                tokenize_text(&self.sentinel.to_string(), style, self.sentinel, &mut fragments);
            }
            let placeholder_style = self.theme.placeholder_style();
            tokenize_text(placeholder, placeholder_style, self.sentinel, &mut fragments);
            return fragments;
        }
        let text = match caret {
            Some(offset) => Cow::Owned(with_sentinel(content, offset, self.sentinel)),
            None => Cow::Borrowed(content),
        };
        tokenize_text(&text, style, self.sentinel, &mut fragments);
        fragments
    }

    fn gutter_prefix(&self, marker: &str) -> Vec<LineSegment> {
        let mut prefix = vec![LineSegment::styled(GUTTER, self.theme.gutter_style())];
        if !marker.is_empty() {
            prefix.push(LineSegment::raw(marker));
        }
        prefix
    }

    fn rule(&self, prefix_width: usize, ch: char) -> String {
        let available = self.wrap_width.saturating_sub(prefix_width);
        underline_string(available.max(MIN_RULE_WIDTH), ch)
    }

    /// Layers focus, drag and drop-target styling over a rendered block.
    fn decorate(&mut self, lines: Range<usize>, id: BlockId, view: &PageView<'_>) {
        let mut overlay = Style::default();
        let mut fill = false;
        if view.focused == Some(id) {
            overlay = overlay.patch(self.theme.focused_block_style());
            fill = true;
        }
        if view.drop_target == Some(id) && view.dragged.is_some_and(|dragged| dragged != id) {
            overlay = overlay.patch(self.theme.drop_target_style());
            fill = true;
        }
        if view.dragged == Some(id) {
            overlay = overlay.patch(self.theme.dragged_block_style());
        }
        if overlay == Style::default() {
            return;
        }
        for line in &mut self.lines[lines] {
            for span in &mut line.spans {
                span.style = span.style.patch(overlay);
            }
            let width = line_width(line);
            if fill && width < self.wrap_width {
                line.spans
                    .push(Span::styled(" ".repeat(self.wrap_width - width), overlay));
            }
        }
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            if let Some(column) = output.cursor {
                self.cursor = Some(CursorVisualPosition {
                    line: self.lines.len(),
                    column,
                });
            }
            self.lines.push(segments_to_line(output.spans));
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
            title_lines: self.title_lines,
            blocks: self.blocks,
        }
    }
}

/// Inserts `sentinel` before the character at `offset`, clamped to the end.
fn with_sentinel(content: &str, offset: usize, sentinel: char) -> String {
    let byte = content
        .char_indices()
        .nth(offset)
        .map_or(content.len(), |(idx, _)| idx);
    let mut text = String::with_capacity(content.len() + sentinel.len_utf8());
    text.push_str(&content[..byte]);
    text.push(sentinel);
    text.push_str(&content[byte..]);
    text
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

impl LineSegment {
    fn raw(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank(width: usize) -> Self {
        Self::raw(" ".repeat(width))
    }
}

fn segments_to_line(segments: Vec<LineSegment>) -> Line<'static> {
    Line::from(
        segments
            .into_iter()
            .map(|segment| Span::styled(segment.text, segment.style))
            .collect::<Vec<_>>(),
    )
}

#[derive(Clone)]
struct LineOutput {
    spans: Vec<LineSegment>,
    cursor: Option<u16>,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    /// Width offset of the caret inside this fragment.
    cursor: Option<usize>,
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

fn tokenize_text(text: &str, style: Style, sentinel: char, fragments: &mut Vec<FragmentItem>) {
    let mut builder: Option<TokenBuilder> = None;
    let mut pending_cursor = false;

    for ch in text.chars() {
        if ch == sentinel {
            pending_cursor = true;
            continue;
        }
        if ch == '\r' {
            continue;
        }
        if ch == '\n' {
            if let Some(mut token) = builder.take() {
                token.take_cursor(&mut pending_cursor);
                fragments.push(FragmentItem::Token(token.finish()));
            } else if pending_cursor {
                pending_cursor = false;
                fragments.push(FragmentItem::Token(Fragment::caret(style)));
            }
            fragments.push(FragmentItem::LineBreak);
            continue;
        }

        let expanded: &[char] = if ch == '\t' { &[' '; 4] } else { &[ch] };
        for &actual in expanded {
            let is_whitespace = actual.is_whitespace();
            match builder.as_mut() {
                Some(current) if current.kind_matches(is_whitespace) => {
                    current.take_cursor(&mut pending_cursor);
                    current.push_char(actual);
                }
                _ => {
                    if let Some(mut existing) = builder.take() {
                        existing.take_cursor(&mut pending_cursor);
                        fragments.push(FragmentItem::Token(existing.finish()));
                    }
                    let mut new_builder = TokenBuilder::new(style, is_whitespace);
                    new_builder.take_cursor(&mut pending_cursor);
                    new_builder.push_char(actual);
                    builder = Some(new_builder);
                }
            }
        }
    }

    if let Some(mut token) = builder {
        token.take_cursor(&mut pending_cursor);
        fragments.push(FragmentItem::Token(token.finish()));
    } else if pending_cursor {
        fragments.push(FragmentItem::Token(Fragment::caret(style)));
    }
}

impl Fragment {
    /// Zero-width word carrying only the caret.
    fn caret(style: Style) -> Self {
        Self {
            text: String::new(),
            style,
            kind: FragmentKind::Word,
            width: 0,
            cursor: Some(0),
        }
    }
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    cursor: Option<usize>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            cursor: None,
        }
    }

    fn kind_matches(&self, is_whitespace: bool) -> bool {
        matches!(
            (self.kind, is_whitespace),
            (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
        )
    }

    fn take_cursor(&mut self, pending: &mut bool) {
        if std::mem::take(pending) {
            self.cursor = Some(self.width);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            cursor: self.cursor,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &[LineSegment],
    continuation_prefix: &[LineSegment],
    width: usize,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.width > builder.prefix_width
                        && builder.width + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new(continuation_prefix);
                    }
                    builder.consume_pending(&mut pending_whitespace);
                    builder.append_token(token.clone());
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    cursor: Option<u16>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &[LineSegment]) -> Self {
        let segments: Vec<LineSegment> = prefix
            .iter()
            .filter(|segment| !segment.text.is_empty())
            .cloned()
            .collect();
        let prefix_width = segments
            .iter()
            .map(|segment| visible_width(&segment.text))
            .sum();
        Self {
            segments,
            cursor: None,
            width: prefix_width,
            prefix_width,
        }
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        if let Some(offset) = fragment.cursor {
            self.cursor = Some((self.width + offset) as u16);
        }
        if !fragment.text.is_empty() {
            self.width += fragment.width;
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment::raw(""));
        }
        LineOutput {
            spans: self.segments,
            cursor: self.cursor,
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| visible_width(span.content.as_ref()))
        .sum()
}

fn underline_string(width: usize, ch: char) -> String {
    std::iter::repeat_n(ch, width.max(1)).collect()
}
