use super::*;

fn id(raw: u64) -> BlockId {
    BlockId::new(raw)
}

fn paragraph(raw: u64, text: &str) -> Block {
    Block::new(id(raw), BlockType::Paragraph).with_content(text)
}

fn editor_with(blocks: Vec<Block>) -> BlockEditor {
    BlockEditor::with_document("test", Document::new("Test", blocks))
}

/// Three paragraphs A, B, C with ids 1, 2, 3.
fn abc() -> BlockEditor {
    editor_with(vec![
        paragraph(1, "A"),
        paragraph(2, "B"),
        paragraph(3, "C"),
    ])
}

fn contents(editor: &BlockEditor) -> Vec<&str> {
    editor.blocks().iter().map(|b| b.content.as_str()).collect()
}

/// Surface that mounts whatever blocks it is told about.
#[derive(Default)]
struct TestSurface {
    mounted: Vec<BlockId>,
    focused: Option<(BlockId, CaretPlacement)>,
}

impl TestSurface {
    fn commit(editor: &BlockEditor) -> Self {
        Self {
            mounted: editor.blocks().iter().map(|b| b.id).collect(),
            focused: None,
        }
    }
}

impl FocusSurface for TestSurface {
    fn focus_block(&mut self, block: BlockId, caret: CaretPlacement) -> bool {
        if !self.mounted.contains(&block) {
            return false;
        }
        self.focused = Some((block, caret));
        true
    }
}

#[test]
fn insert_heading_after_single_paragraph() {
    let mut editor = editor_with(vec![paragraph(1, "")]);
    let b = editor.insert_after(id(1), BlockType::Heading1).unwrap();

    let blocks = editor.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].id, id(1));
    assert_eq!(blocks[0].block_type, BlockType::Paragraph);
    assert_eq!(blocks[1].id, b);
    assert_eq!(blocks[1].block_type, BlockType::Heading1);
    assert_eq!(blocks[1].content, "");
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_start(b)));
}

#[test]
fn pending_focus_only_lands_after_commit() {
    let mut editor = editor_with(vec![paragraph(1, "")]);
    let stale_view = TestSurface::commit(&editor);
    let b = editor.insert_after(id(1), BlockType::Paragraph).unwrap();

    let mut surface = stale_view;
    assert_eq!(editor.flush_pending_focus(&mut surface), None);
    assert_eq!(editor.focused(), None);

    let mut surface = TestSurface::commit(&editor);
    assert_eq!(editor.flush_pending_focus(&mut surface), Some(b));
    assert_eq!(editor.focused(), Some(b));
    assert_eq!(surface.focused, Some((b, CaretPlacement::Start)));
    assert_eq!(editor.pending_focus(), None);
}

#[test]
fn move_up_then_down_restores_order() {
    let mut editor = abc();
    assert!(editor.move_block(id(2), Direction::Up).unwrap());
    assert_eq!(contents(&editor), vec!["B", "A", "C"]);
    assert!(editor.move_block(id(2), Direction::Down).unwrap());
    assert_eq!(contents(&editor), vec!["A", "B", "C"]);
}

#[test]
fn delete_single_block_is_noop() {
    let mut editor = editor_with(vec![paragraph(1, "A")]);
    assert!(!editor.delete(id(1)).unwrap());
    assert_eq!(contents(&editor), vec!["A"]);
    assert_eq!(editor.pending_focus(), None);
}

#[test]
fn clear_focus_forgets_the_focused_block() {
    let mut editor = abc();
    editor.set_focused(id(2)).unwrap();
    assert_eq!(editor.focused(), Some(id(2)));
    editor.clear_focus();
    assert_eq!(editor.focused(), None);
    assert_eq!(editor.pending_focus(), None);
}

#[test]
fn delete_focuses_previous_block() {
    let mut editor = abc();
    editor.set_focused(id(3)).unwrap();
    assert!(editor.delete(id(3)).unwrap());
    assert_eq!(editor.focused(), None);
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_end(id(2))));
}

#[test]
fn delete_first_block_focuses_new_first() {
    let mut editor = abc();
    assert!(editor.delete(id(1)).unwrap());
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_end(id(2))));
}

#[test]
fn drag_and_drop_reorders() {
    let mut editor = abc();
    editor.begin_drag(id(3)).unwrap();
    assert!(editor.drag_over(id(1)));
    assert!(editor.drop_on(id(1)).unwrap());
    assert_eq!(contents(&editor), vec!["C", "A", "B"]);
    assert_eq!(editor.dragged(), None);
}

#[test]
fn drop_on_drag_source_clears_drag() {
    let mut editor = abc();
    editor.begin_drag(id(2)).unwrap();
    assert!(!editor.drop_on(id(2)).unwrap());
    assert_eq!(contents(&editor), vec!["A", "B", "C"]);
    assert_eq!(editor.dragged(), None);
}

#[test]
fn reorder_requires_active_drag_source() {
    let mut editor = abc();
    assert!(!editor.reorder(id(3), id(1)).unwrap());
    editor.begin_drag(id(2)).unwrap();
    assert!(!editor.reorder(id(3), id(1)).unwrap());
    assert_eq!(contents(&editor), vec!["A", "B", "C"]);
    assert!(editor.reorder(id(2), id(1)).unwrap());
    assert_eq!(contents(&editor), vec!["B", "A", "C"]);
}

#[test]
fn drop_without_drag_is_noop() {
    let mut editor = abc();
    assert!(!editor.drop_on(id(1)).unwrap());
    assert!(!editor.drag_over(id(1)));
}

#[test]
fn slash_opens_and_closes_menu() {
    let mut editor = abc();
    editor.update(id(2), "/").unwrap();
    assert_eq!(editor.menus().slash_menu(), Some(id(2)));
    editor.update(id(2), "/x").unwrap();
    assert_eq!(editor.menus().slash_menu(), None);

    editor.update(id(2), "/").unwrap();
    editor.update(id(2), "").unwrap();
    assert_eq!(editor.menus().slash_menu(), None);
}

#[test]
fn slash_selection_retypes_block() {
    let mut editor = abc();
    editor.update(id(1), "/").unwrap();
    editor.update(id(1), "/to").unwrap();
    assert_eq!(editor.active_menu(), Some(ActiveMenu::Slash(id(1))));
    assert_eq!(editor.select_menu_entry().unwrap(), Some(id(1)));

    let block = editor.block(id(1)).unwrap();
    assert_eq!(block.block_type, BlockType::Checklist);
    assert_eq!(block.content, "");
    assert_eq!(block.checked, Some(false));
    assert_eq!(editor.menus().slash_menu(), None);
}

#[test]
fn retype_to_checklist_resets_state() {
    let mut editor = editor_with(vec![
        Block::new(id(1), BlockType::Checklist)
            .with_content("done")
            .with_checked(true),
    ]);
    editor.retype(id(1), BlockType::Checklist).unwrap();
    let block = editor.block(id(1)).unwrap();
    assert_eq!(block.checked, Some(false));
    assert_eq!(block.content, "");
}

#[test]
fn insert_menu_selection_inserts_after_target() {
    let mut editor = abc();
    editor.toggle_insert_menu(id(1)).unwrap();
    editor.move_menu_selection(1);
    let inserted = editor.select_menu_entry().unwrap().unwrap();
    assert_eq!(editor.blocks()[1].id, inserted);
    assert_eq!(editor.blocks()[1].block_type, BlockType::Heading1);
    assert_eq!(editor.menus().insert_menu(), None);
}

#[test]
fn insert_closes_both_menus() {
    let mut editor = abc();
    editor.toggle_insert_menu(id(1)).unwrap();
    editor.update(id(3), "/").unwrap();
    editor.insert_after(id(2), BlockType::Quote).unwrap();
    assert_eq!(editor.menus().insert_menu(), None);
    assert_eq!(editor.menus().slash_menu(), None);
}

#[test]
fn slash_menu_takes_keyboard_over_insert_menu() {
    let mut editor = abc();
    editor.toggle_insert_menu(id(1)).unwrap();
    editor.update(id(2), "/").unwrap();
    assert_eq!(editor.active_menu(), Some(ActiveMenu::Slash(id(2))));
    editor.close_active_menu();
    assert_eq!(editor.active_menu(), Some(ActiveMenu::Insert(id(1))));
}

#[test]
fn deleting_block_closes_its_menus() {
    let mut editor = abc();
    editor.toggle_insert_menu(id(2)).unwrap();
    editor.delete(id(2)).unwrap();
    assert_eq!(editor.menus().insert_menu(), None);
}

#[test]
fn enter_inserts_paragraph_and_suppresses_default() {
    let mut editor = abc();
    let outcome = editor
        .handle_key(id(2), KeyInput::plain(NavKey::Enter))
        .unwrap();
    assert!(outcome.suppresses_default());
    assert_eq!(editor.blocks().len(), 4);
    let new_block = &editor.blocks()[2];
    assert_eq!(new_block.block_type, BlockType::Paragraph);
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_start(new_block.id)));
}

#[test]
fn shift_enter_is_left_to_the_input() {
    let mut editor = abc();
    let outcome = editor
        .handle_key(id(2), KeyInput::with_shift(NavKey::Enter))
        .unwrap();
    assert_eq!(outcome, KeyOutcome::Ignored);
    assert_eq!(editor.blocks().len(), 3);
}

#[test]
fn backspace_deletes_only_empty_blocks() {
    let mut editor = editor_with(vec![paragraph(1, "A"), paragraph(2, "")]);
    let outcome = editor
        .handle_key(id(1), KeyInput::plain(NavKey::Backspace))
        .unwrap();
    assert_eq!(outcome, KeyOutcome::Ignored);

    let outcome = editor
        .handle_key(id(2), KeyInput::plain(NavKey::Backspace))
        .unwrap();
    assert_eq!(outcome, KeyOutcome::Consumed);
    assert_eq!(contents(&editor), vec!["A"]);
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_end(id(1))));
}

#[test]
fn backspace_on_last_empty_block_keeps_it() {
    let mut editor = editor_with(vec![paragraph(1, "")]);
    let outcome = editor
        .handle_key(id(1), KeyInput::plain(NavKey::Backspace))
        .unwrap();
    assert_eq!(outcome, KeyOutcome::Consumed);
    assert_eq!(editor.blocks().len(), 1);
}

#[test]
fn command_arrows_move_blocks() {
    let mut editor = abc();
    editor
        .handle_key(id(3), KeyInput::with_command(NavKey::Up))
        .unwrap();
    assert_eq!(contents(&editor), vec!["A", "C", "B"]);
    editor
        .handle_key(id(1), KeyInput::with_command(NavKey::Down))
        .unwrap();
    assert_eq!(contents(&editor), vec!["C", "A", "B"]);
    let outcome = editor
        .handle_key(id(3), KeyInput::with_command(NavKey::Up))
        .unwrap();
    assert_eq!(outcome, KeyOutcome::Consumed);
    assert_eq!(contents(&editor), vec!["C", "A", "B"]);
}

#[test]
fn arrows_walk_focus_with_caret_placement() {
    let mut editor = abc();
    editor
        .handle_key(id(2), KeyInput::plain(NavKey::Up))
        .unwrap();
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_end(id(1))));
    editor
        .handle_key(id(2), KeyInput::plain(NavKey::Down))
        .unwrap();
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_start(id(3))));
}

#[test]
fn arrows_at_edges_are_ignored() {
    let mut editor = abc();
    assert_eq!(
        editor.handle_key(id(1), KeyInput::plain(NavKey::Up)).unwrap(),
        KeyOutcome::Ignored
    );
    assert_eq!(
        editor.handle_key(id(3), KeyInput::plain(NavKey::Down)).unwrap(),
        KeyOutcome::Ignored
    );
    assert_eq!(editor.pending_focus(), None);
}

#[test]
fn append_block_goes_to_the_end() {
    let mut editor = abc();
    let appended = editor.append_block(BlockType::Divider).unwrap();
    assert_eq!(editor.blocks().last().map(|b| b.id), Some(appended));
    assert_eq!(editor.pending_focus(), Some(FocusRequest::at_start(appended)));
}

#[test]
fn image_blocks_get_placeholder_url() {
    let mut editor = abc();
    let image = editor.insert_after(id(1), BlockType::Image).unwrap();
    assert_eq!(
        editor.block(image).unwrap().image_url.as_deref(),
        Some(IMAGE_PLACEHOLDER_URL)
    );
}

#[test]
fn action_availability_tracks_position() {
    let editor = abc();
    assert!(editor.can_delete());
    assert!(!editor.can_move(id(1), Direction::Up).unwrap());
    assert!(editor.can_move(id(1), Direction::Down).unwrap());
    assert!(!editor.can_move(id(3), Direction::Down).unwrap());

    let single = editor_with(vec![paragraph(1, "")]);
    assert!(!single.can_delete());
}

#[test]
fn stale_ids_surface_as_errors() {
    let mut editor = abc();
    let stale = id(77);
    assert_eq!(
        editor.insert_after(stale, BlockType::Paragraph),
        Err(EditError::UnknownBlock(stale))
    );
    assert_eq!(
        editor.handle_key(stale, KeyInput::plain(NavKey::Enter)),
        Err(EditError::UnknownBlock(stale))
    );
    assert_eq!(editor.begin_drag(stale), Err(EditError::UnknownBlock(stale)));
    assert_eq!(
        editor.set_focused(stale),
        Err(EditError::UnknownBlock(stale))
    );
    assert_eq!(contents(&editor), vec!["A", "B", "C"]);
    assert_eq!(editor.pending_focus(), None);
}

#[test]
fn title_is_replaced_verbatim() {
    let mut editor = BlockEditor::open("nowhere");
    assert_eq!(editor.title(), UNTITLED);
    editor.set_title("  Draft: Q3 plan ");
    assert_eq!(editor.title(), "  Draft: Q3 plan ");
}

#[test]
fn duplicate_keeps_fields_and_gets_fresh_id() {
    let mut editor = editor_with(vec![
        Block::new(id(1), BlockType::Image).with_content("Caption"),
        paragraph(2, "B"),
    ]);
    let copy = editor.duplicate(id(1)).unwrap();
    assert_ne!(copy, id(1));
    let blocks = editor.blocks();
    assert_eq!(blocks[1].id, copy);
    assert_eq!(blocks[1].content, "Caption");
    assert_eq!(blocks[1].image_url, blocks[0].image_url);
}
