use thiserror::Error;
use tracing::{debug, warn};

mod affordance;
mod block;
mod document;
mod focus;
mod menu;
mod store;

pub use affordance::{Affordance, ExtraControls, InputShape, affordance, affordance_for_tag};
pub use block::{Block, BlockId, BlockType, Direction, IMAGE_PLACEHOLDER_URL};
pub use document::{Document, TEMPLATE_PAGES, UNTITLED, open_document};
pub use focus::{CaretPlacement, FocusRequest, FocusSurface, KeyInput, KeyOutcome, NavKey};
pub use menu::{
    MenuController, MenuEntry, MenuItem, insert_menu_entries, insert_menu_items, slash_menu_items,
};
pub use store::{BlockStore, Deletion};

use focus::FocusState;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// The id does not belong to the open document. The caller's view of the
    /// block sequence is out of date.
    #[error("block {0} is not part of the document")]
    UnknownBlock(BlockId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveMenu {
    Insert(BlockId),
    Slash(BlockId),
}

#[derive(Debug)]
pub struct BlockEditor {
    page_id: String,
    document: Document,
    focus: FocusState,
    menus: MenuController,
}

impl BlockEditor {
    pub fn open(page_id: &str) -> Self {
        debug!(target: "blockpad::editor", page_id, "open document");
        Self::with_document(page_id, open_document(page_id))
    }

    pub fn with_document(page_id: &str, document: Document) -> Self {
        Self {
            page_id: page_id.to_string(),
            document,
            focus: FocusState::default(),
            menus: MenuController::new(),
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn title(&self) -> &str {
        &self.document.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.store.blocks()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.document.store.get(id)
    }

    pub fn store(&self) -> &BlockStore {
        &self.document.store
    }

    pub fn can_delete(&self) -> bool {
        self.document.store.can_delete()
    }

    pub fn can_move(&self, id: BlockId, direction: Direction) -> Result<bool, EditError> {
        self.document.store.can_move(id, direction).inspect_err(log_stale)
    }

    pub fn insert_after(
        &mut self,
        anchor: BlockId,
        block_type: BlockType,
    ) -> Result<BlockId, EditError> {
        let id = self
            .document
            .store
            .insert_after(anchor, block_type)
            .inspect_err(log_stale)?;
        self.menus.close_all();
        self.focus.schedule(FocusRequest::at_start(id));
        Ok(id)
    }

    /// Adds a block at the very end of the document.
    pub fn append_block(&mut self, block_type: BlockType) -> Result<BlockId, EditError> {
        let last = self.document.store.last_id();
        self.insert_after(last, block_type)
    }

    pub fn update(&mut self, id: BlockId, content: &str) -> Result<(), EditError> {
        self.document
            .store
            .update(id, content)
            .inspect_err(log_stale)?;
        self.menus.content_changed(id, content);
        Ok(())
    }

    /// Removes the block unless it is the last one. Focus moves to the
    /// block that preceded it, or to the new first block.
    pub fn delete(&mut self, id: BlockId) -> Result<bool, EditError> {
        match self.document.store.delete(id).inspect_err(log_stale)? {
            Deletion::Kept => Ok(false),
            Deletion::Removed { focus } => {
                self.focus.forget(id);
                self.menus.forget(id);
                self.focus.schedule(FocusRequest::at_end(focus));
                Ok(true)
            }
        }
    }

    pub fn duplicate(&mut self, id: BlockId) -> Result<BlockId, EditError> {
        self.document.store.duplicate(id).inspect_err(log_stale)
    }

    pub fn move_block(&mut self, id: BlockId, direction: Direction) -> Result<bool, EditError> {
        self.document
            .store
            .move_block(id, direction)
            .inspect_err(log_stale)
    }

    pub fn retype(&mut self, id: BlockId, block_type: BlockType) -> Result<(), EditError> {
        self.document
            .store
            .retype(id, block_type)
            .inspect_err(log_stale)?;
        self.menus.close_slash();
        // The block's input is replaced by one of the new shape.
        self.focus.schedule(FocusRequest::at_start(id));
        Ok(())
    }

    pub fn toggle_checked(&mut self, id: BlockId) -> Result<bool, EditError> {
        self.document
            .store
            .toggle_checked(id)
            .inspect_err(log_stale)
    }

    /// Moves `source` to the position of `target`. Only the block currently
    /// being dragged can be reordered.
    pub fn reorder(&mut self, source: BlockId, target: BlockId) -> Result<bool, EditError> {
        self.document.store.position(source).inspect_err(log_stale)?;
        self.document.store.position(target).inspect_err(log_stale)?;
        if self.focus.dragged != Some(source) {
            debug!(target: "blockpad::editor", %source, "reorder ignored, not the drag source");
            return Ok(false);
        }
        self.document.store.relocate(source, target)
    }

    // Focus and drag state

    pub fn focused(&self) -> Option<BlockId> {
        self.focus.focused
    }

    /// Mirrors the editable surface of `id` gaining focus.
    pub fn set_focused(&mut self, id: BlockId) -> Result<(), EditError> {
        self.document.store.position(id).inspect_err(log_stale)?;
        self.focus.focused = Some(id);
        Ok(())
    }

    /// Mirrors the focused surface losing focus.
    pub fn clear_focus(&mut self) {
        if let Some(id) = self.focus.focused.take() {
            debug!(target: "blockpad::editor", %id, "blur");
        }
    }

    pub fn pending_focus(&self) -> Option<FocusRequest> {
        self.focus.pending
    }

    pub fn request_focus(&mut self, request: FocusRequest) -> Result<(), EditError> {
        self.document
            .store
            .position(request.block)
            .inspect_err(log_stale)?;
        self.focus.schedule(request);
        Ok(())
    }

    /// Runs the pending focus move. Call this only after the current block
    /// sequence has been committed to `surface`.
    pub fn flush_pending_focus(&mut self, surface: &mut dyn FocusSurface) -> Option<BlockId> {
        if let Some(request) = self.focus.pending
            && !self.document.store.contains(request.block)
        {
            warn!(target: "blockpad::editor", block = %request.block, "dropping focus request for removed block");
            self.focus.pending = None;
            return None;
        }
        self.focus.flush(surface)
    }

    pub fn dragged(&self) -> Option<BlockId> {
        self.focus.dragged
    }

    pub fn begin_drag(&mut self, id: BlockId) -> Result<(), EditError> {
        self.document.store.position(id).inspect_err(log_stale)?;
        debug!(target: "blockpad::editor", %id, "drag start");
        self.focus.dragged = Some(id);
        Ok(())
    }

    /// Every block is a valid drop target.
    pub fn drag_over(&self, _target: BlockId) -> bool {
        self.focus.dragged.is_some()
    }

    /// Drops the dragged block onto `target`. The drag ends either way.
    pub fn drop_on(&mut self, target: BlockId) -> Result<bool, EditError> {
        let result = match self.focus.dragged {
            Some(source) => self.reorder(source, target),
            None => Ok(false),
        };
        self.focus.dragged = None;
        result
    }

    pub fn cancel_drag(&mut self) {
        self.focus.dragged = None;
    }

    // Menus

    pub fn menus(&self) -> &MenuController {
        &self.menus
    }

    /// The menu keyboard input goes to: the slash menu wins over the insert
    /// menu when both are open.
    pub fn active_menu(&self) -> Option<ActiveMenu> {
        self.menus
            .slash_menu()
            .map(ActiveMenu::Slash)
            .or_else(|| self.menus.insert_menu().map(ActiveMenu::Insert))
    }

    pub fn toggle_insert_menu(&mut self, id: BlockId) -> Result<(), EditError> {
        self.document.store.position(id).inspect_err(log_stale)?;
        self.menus.toggle_insert(id);
        Ok(())
    }

    pub fn close_active_menu(&mut self) {
        match self.active_menu() {
            Some(ActiveMenu::Slash(_)) => self.menus.close_slash(),
            Some(ActiveMenu::Insert(_)) => self.menus.close_insert(),
            None => {}
        }
    }

    pub fn move_menu_selection(&mut self, delta: i32) {
        match self.active_menu() {
            Some(ActiveMenu::Slash(_)) => self.menus.move_slash_selection(delta),
            Some(ActiveMenu::Insert(_)) => self.menus.move_insert_selection(delta),
            None => {}
        }
    }

    /// Applies the highlighted entry of the active menu. Returns the block
    /// that was inserted or retyped.
    pub fn select_menu_entry(&mut self) -> Result<Option<BlockId>, EditError> {
        match self.active_menu() {
            Some(ActiveMenu::Slash(id)) => {
                let Some(item) = self.menus.selected_slash_item() else {
                    return Ok(None);
                };
                self.retype(id, item.block_type)?;
                Ok(Some(id))
            }
            Some(ActiveMenu::Insert(id)) => {
                let Some(item) = self.menus.selected_insert_item() else {
                    return Ok(None);
                };
                self.insert_after(id, item.block_type).map(Some)
            }
            None => Ok(None),
        }
    }

    // Keyboard navigation

    /// Interprets a keystroke typed into block `id`.
    pub fn handle_key(&mut self, id: BlockId, input: KeyInput) -> Result<KeyOutcome, EditError> {
        let index = self.document.store.position(id).inspect_err(log_stale)?;
        let plain = !input.shift && !input.command;
        match input.key {
            NavKey::Enter if plain => {
                self.insert_after(id, BlockType::Paragraph)?;
                Ok(KeyOutcome::Consumed)
            }
            NavKey::Backspace if self.blocks()[index].is_empty() => {
                self.delete(id)?;
                Ok(KeyOutcome::Consumed)
            }
            NavKey::Up if input.command => {
                self.move_block(id, Direction::Up)?;
                Ok(KeyOutcome::Consumed)
            }
            NavKey::Down if input.command => {
                self.move_block(id, Direction::Down)?;
                Ok(KeyOutcome::Consumed)
            }
            NavKey::Up if plain => match self.document.store.previous_id(id)? {
                Some(previous) => {
                    self.focus.schedule(FocusRequest::at_end(previous));
                    Ok(KeyOutcome::Consumed)
                }
                None => Ok(KeyOutcome::Ignored),
            },
            NavKey::Down if plain => match self.document.store.next_id(id)? {
                Some(next) => {
                    self.focus.schedule(FocusRequest::at_start(next));
                    Ok(KeyOutcome::Consumed)
                }
                None => Ok(KeyOutcome::Ignored),
            },
            _ => Ok(KeyOutcome::Ignored),
        }
    }
}

fn log_stale(err: &EditError) {
    warn!(target: "blockpad::editor", %err, "stale block reference");
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;
