use super::block::{Block, BlockId, BlockType};
use super::store::BlockStore;

pub const UNTITLED: &str = "Untitled";

/// Page identifiers that open a built-in template.
pub const TEMPLATE_PAGES: [&str; 2] = ["welcome", "getting-started"];

/// A title plus its block sequence, held in memory while the page is open.
#[derive(Clone, Debug)]
pub struct Document {
    pub title: String,
    pub store: BlockStore,
}

impl Document {
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            store: BlockStore::from_blocks(blocks),
        }
    }

    pub fn untitled() -> Self {
        Self::new(UNTITLED, Vec::new())
    }

    pub fn blocks(&self) -> &[Block] {
        self.store.blocks()
    }
}

/// Seeds the document for `page_id`: a fixed template for known pages, an
/// untitled single empty paragraph for everything else.
pub fn open_document(page_id: &str) -> Document {
    match page_id {
        "welcome" => Document::new(
            "Welcome to Your Workspace",
            vec![
                seed(1, BlockType::Heading1, "Welcome to Your Workspace"),
                seed(
                    2,
                    BlockType::Paragraph,
                    "This is your personal workspace where you can create pages, manage databases, and organize your thoughts.",
                ),
                seed(3, BlockType::Heading2, "Getting Started"),
                seed(4, BlockType::List, "Create your first page"),
                seed(5, BlockType::List, "Set up a database"),
                seed(6, BlockType::List, "Invite team members"),
            ],
        ),
        "getting-started" => Document::new(
            "Getting Started Guide",
            vec![
                seed(1, BlockType::Heading1, "Getting Started Guide"),
                seed(
                    2,
                    BlockType::Paragraph,
                    "Learn how to use this workspace effectively.",
                ),
            ],
        ),
        _ => Document::untitled(),
    }
}

fn seed(id: u64, block_type: BlockType, content: &str) -> Block {
    Block::new(BlockId::new(id), block_type).with_content(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_template_has_heading_intro_and_list() {
        let doc = open_document("welcome");
        assert_eq!(doc.title, "Welcome to Your Workspace");
        let types: Vec<_> = doc.blocks().iter().map(|b| b.block_type).collect();
        assert_eq!(
            types,
            vec![
                BlockType::Heading1,
                BlockType::Paragraph,
                BlockType::Heading2,
                BlockType::List,
                BlockType::List,
                BlockType::List,
            ]
        );
        assert_eq!(doc.blocks()[5].content, "Invite team members");
    }

    #[test]
    fn getting_started_template() {
        let doc = open_document("getting-started");
        assert_eq!(doc.title, "Getting Started Guide");
        assert_eq!(doc.blocks().len(), 2);
    }

    #[test]
    fn unknown_page_is_untitled_with_one_empty_paragraph() {
        let doc = open_document("meeting-notes-2024");
        assert_eq!(doc.title, UNTITLED);
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].block_type, BlockType::Paragraph);
        assert!(doc.blocks()[0].is_empty());
    }

    #[test]
    fn every_listed_template_is_recognised() {
        for page in TEMPLATE_PAGES {
            assert_ne!(open_document(page).title, UNTITLED, "{page}");
        }
    }
}
