use super::block::{BlockId, BlockType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub block_type: BlockType,
    pub label: &'static str,
    pub description: &'static str,
    keywords: &'static [&'static str],
}

impl MenuItem {
    const fn new(
        block_type: BlockType,
        label: &'static str,
        description: &'static str,
        keywords: &'static [&'static str],
    ) -> Self {
        Self {
            block_type,
            label,
            description,
            keywords,
        }
    }

    /// Case-insensitive match of `query` against the label or the start of
    /// any of its words and keywords. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let label = self.label.to_lowercase();
        label.starts_with(&query)
            || label
                .split(|ch: char| ch.is_whitespace() || ch == '-')
                .any(|word| word.starts_with(&query))
            || self.keywords.iter().any(|word| word.starts_with(&query))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    Section(&'static str),
    Item(MenuItem),
}

const INSERT_MENU: [MenuEntry; 13] = [
    MenuEntry::Section("BASIC BLOCKS"),
    MenuEntry::Item(MenuItem::new(
        BlockType::Paragraph,
        "Text",
        "Just start writing with plain text.",
        &["paragraph"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Heading1,
        "Heading 1",
        "Big section heading.",
        &["h1"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Heading2,
        "Heading 2",
        "Medium section heading.",
        &["h2"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Heading3,
        "Heading 3",
        "Small section heading.",
        &["h3"],
    )),
    MenuEntry::Section("LISTS"),
    MenuEntry::Item(MenuItem::new(
        BlockType::List,
        "Bulleted list",
        "Create a simple bulleted list.",
        &["list", "bullet"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Checklist,
        "To-do list",
        "Track tasks with a to-do list.",
        &["todo", "checklist", "task"],
    )),
    MenuEntry::Section("MEDIA"),
    MenuEntry::Item(MenuItem::new(
        BlockType::Image,
        "Image",
        "Upload or embed with a link.",
        &["picture"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Quote,
        "Quote",
        "Capture a quote.",
        &["blockquote"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Code,
        "Code",
        "Capture a code snippet.",
        &["snippet"],
    )),
    MenuEntry::Item(MenuItem::new(
        BlockType::Divider,
        "Divider",
        "Visually divide blocks.",
        &["rule", "separator"],
    )),
];

const SLASH_MENU: [MenuItem; 8] = [
    MenuItem::new(BlockType::Paragraph, "Text", "Plain text.", &["paragraph"]),
    MenuItem::new(BlockType::Heading1, "Heading 1", "Big section heading.", &["h1"]),
    MenuItem::new(BlockType::Heading2, "Heading 2", "Medium section heading.", &["h2"]),
    MenuItem::new(BlockType::Heading3, "Heading 3", "Small section heading.", &["h3"]),
    MenuItem::new(
        BlockType::List,
        "Bullet List",
        "Simple bulleted list.",
        &["list"],
    ),
    MenuItem::new(
        BlockType::Checklist,
        "To-do",
        "Track a task.",
        &["todo", "checklist", "task"],
    ),
    MenuItem::new(BlockType::Quote, "Quote", "Capture a quote.", &["blockquote"]),
    MenuItem::new(BlockType::Code, "Code", "Code snippet.", &["snippet"]),
];

pub fn insert_menu_entries() -> &'static [MenuEntry] {
    &INSERT_MENU
}

pub fn insert_menu_items() -> impl Iterator<Item = &'static MenuItem> {
    INSERT_MENU.iter().filter_map(|entry| match entry {
        MenuEntry::Item(item) => Some(item),
        MenuEntry::Section(_) => None,
    })
}

pub fn slash_menu_items(query: &str) -> Vec<MenuItem> {
    SLASH_MENU
        .iter()
        .filter(|item| item.matches(query))
        .copied()
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct InsertMenu {
    block: BlockId,
    selected: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SlashMenu {
    block: BlockId,
    selected: usize,
    query: String,
}

/// Tracks the single insert-menu target and the single slash-menu target.
#[derive(Clone, Debug, Default)]
pub struct MenuController {
    insert: Option<InsertMenu>,
    slash: Option<SlashMenu>,
}

impl MenuController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_menu(&self) -> Option<BlockId> {
        self.insert.as_ref().map(|menu| menu.block)
    }

    pub fn slash_menu(&self) -> Option<BlockId> {
        self.slash.as_ref().map(|menu| menu.block)
    }

    /// Opens the insert menu for `block`, or closes it if it is already open
    /// there. A menu open on another block is replaced.
    pub fn toggle_insert(&mut self, block: BlockId) {
        if self.insert_menu() == Some(block) {
            self.insert = None;
        } else {
            self.insert = Some(InsertMenu { block, selected: 0 });
        }
        tracing::debug!(target: "blockpad::menu", %block, open = self.insert.is_some(), "toggle insert menu");
    }

    pub fn close_insert(&mut self) {
        self.insert = None;
    }

    pub fn open_slash(&mut self, block: BlockId) {
        tracing::debug!(target: "blockpad::menu", %block, "open slash menu");
        self.slash = Some(SlashMenu {
            block,
            selected: 0,
            query: String::new(),
        });
    }

    pub fn close_slash(&mut self) {
        self.slash = None;
    }

    pub fn close_all(&mut self) {
        self.insert = None;
        self.slash = None;
    }

    pub fn forget(&mut self, block: BlockId) {
        if self.insert_menu() == Some(block) {
            self.insert = None;
        }
        if self.slash_menu() == Some(block) {
            self.slash = None;
        }
    }

    /// Reacts to new content in `block`: a lone `/` opens the slash menu,
    /// anything not starting with `/` (or a query with no match) closes it.
    pub fn content_changed(&mut self, block: BlockId, content: &str) {
        if content == "/" {
            self.open_slash(block);
            return;
        }
        let Some(menu) = self.slash.as_mut().filter(|menu| menu.block == block) else {
            return;
        };
        let Some(query) = content.strip_prefix('/') else {
            tracing::debug!(target: "blockpad::menu", %block, "close slash menu");
            self.slash = None;
            return;
        };
        let matches = slash_menu_items(query).len();
        if matches == 0 {
            tracing::debug!(target: "blockpad::menu", %block, query, "no slash entry matches");
            self.slash = None;
            return;
        }
        menu.query = query.to_string();
        menu.selected = menu.selected.min(matches - 1);
    }

    pub fn insert_selection(&self) -> Option<usize> {
        self.insert.as_ref().map(|menu| menu.selected)
    }

    pub fn slash_selection(&self) -> Option<usize> {
        self.slash.as_ref().map(|menu| menu.selected)
    }

    pub fn selected_insert_item(&self) -> Option<MenuItem> {
        let menu = self.insert.as_ref()?;
        insert_menu_items().nth(menu.selected).copied()
    }

    pub fn selected_slash_item(&self) -> Option<MenuItem> {
        let menu = self.slash.as_ref()?;
        slash_menu_items(&menu.query).get(menu.selected).copied()
    }

    pub fn visible_slash_items(&self) -> Vec<MenuItem> {
        self.slash
            .as_ref()
            .map(|menu| slash_menu_items(&menu.query))
            .unwrap_or_default()
    }

    pub fn move_insert_selection(&mut self, delta: i32) {
        let len = insert_menu_items().count();
        if let Some(menu) = self.insert.as_mut() {
            menu.selected = cycle(menu.selected, delta, len);
        }
    }

    pub fn move_slash_selection(&mut self, delta: i32) {
        if let Some(menu) = self.slash.as_mut() {
            let len = slash_menu_items(&menu.query).len();
            menu.selected = cycle(menu.selected, delta, len);
        }
    }
}

fn cycle(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as i64 + delta as i64).rem_euclid(len as i64) as usize
}
