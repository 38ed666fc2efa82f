use super::block::BlockId;

/// Where the caret lands when a block receives focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretPlacement {
    Start,
    End,
}

/// A focus move scheduled to run once the block sequence it refers to has
/// been committed and the target's editable surface is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub block: BlockId,
    pub caret: CaretPlacement,
}

impl FocusRequest {
    pub fn at_start(block: BlockId) -> Self {
        Self {
            block,
            caret: CaretPlacement::Start,
        }
    }

    pub fn at_end(block: BlockId) -> Self {
        Self {
            block,
            caret: CaretPlacement::End,
        }
    }
}

/// Capability offered by the presentation layer so the editor can move
/// editing focus without owning any view state.
pub trait FocusSurface {
    /// Focuses the editable surface of `block` and places the caret.
    /// Returns `false` when that surface is not mounted yet.
    fn focus_block(&mut self, block: BlockId, caret: CaretPlacement) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Enter,
    Backspace,
    Up,
    Down,
}

/// A keystroke delivered to the focused block's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: NavKey,
    pub shift: bool,
    /// Meta on macOS keyboards, Ctrl elsewhere.
    pub command: bool,
}

impl KeyInput {
    pub const fn plain(key: NavKey) -> Self {
        Self {
            key,
            shift: false,
            command: false,
        }
    }

    pub const fn with_shift(key: NavKey) -> Self {
        Self {
            key,
            shift: true,
            command: false,
        }
    }

    pub const fn with_command(key: NavKey) -> Self {
        Self {
            key,
            shift: false,
            command: true,
        }
    }
}

/// What the navigation controller did with a keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Handled; the input's default behaviour must be suppressed.
    Consumed,
    /// Not a navigation key in this state; the input handles it.
    Ignored,
}

impl KeyOutcome {
    pub fn suppresses_default(self) -> bool {
        matches!(self, KeyOutcome::Consumed)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FocusState {
    pub(crate) focused: Option<BlockId>,
    pub(crate) dragged: Option<BlockId>,
    pub(crate) pending: Option<FocusRequest>,
}

impl FocusState {
    pub(crate) fn schedule(&mut self, request: FocusRequest) {
        tracing::debug!(target: "blockpad::focus", block = %request.block, caret = ?request.caret, "schedule focus");
        self.pending = Some(request);
    }

    /// Runs the pending request against `surface`. The request stays queued
    /// if the surface cannot take it yet.
    pub(crate) fn flush(&mut self, surface: &mut dyn FocusSurface) -> Option<BlockId> {
        let request = self.pending?;
        if !surface.focus_block(request.block, request.caret) {
            tracing::debug!(target: "blockpad::focus", block = %request.block, "focus target not mounted yet");
            return None;
        }
        self.pending = None;
        self.focused = Some(request.block);
        Some(request.block)
    }

    pub(crate) fn forget(&mut self, block: BlockId) {
        if self.focused == Some(block) {
            self.focused = None;
        }
        if self.dragged == Some(block) {
            self.dragged = None;
        }
        if self.pending.is_some_and(|request| request.block == block) {
            self.pending = None;
        }
    }
}
