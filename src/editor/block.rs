use std::fmt;

pub const IMAGE_PLACEHOLDER_URL: &str = "/placeholder-image.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(u64);

impl BlockId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockType {
    Heading1,
    Heading2,
    Heading3,
    #[default]
    Paragraph,
    List,
    Checklist,
    Quote,
    Code,
    Divider,
    Image,
}

impl BlockType {
    pub const ALL: [BlockType; 10] = [
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::Paragraph,
        BlockType::List,
        BlockType::Checklist,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Divider,
        BlockType::Image,
    ];

    /// The lowercase tag used for this type in templates and logs.
    pub fn tag(self) -> &'static str {
        match self {
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Heading3 => "heading3",
            BlockType::Paragraph => "paragraph",
            BlockType::List => "list",
            BlockType::Checklist => "checklist",
            BlockType::Quote => "quote",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
            BlockType::Image => "image",
        }
    }

    pub fn from_tag(tag: &str) -> Option<BlockType> {
        BlockType::ALL.into_iter().find(|ty| ty.tag() == tag)
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockType::Heading1 => "Heading 1",
            BlockType::Heading2 => "Heading 2",
            BlockType::Heading3 => "Heading 3",
            BlockType::Paragraph => "Text",
            BlockType::List => "Bulleted list",
            BlockType::Checklist => "To-do list",
            BlockType::Quote => "Quote",
            BlockType::Code => "Code",
            BlockType::Divider => "Divider",
            BlockType::Image => "Image",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// One addressable unit of document content.
///
/// `checked` is only `Some` for checklist blocks and `image_url` is only
/// `Some` for image blocks. Both are kept in sync with `block_type` by the
/// constructors and by [`Block::retype`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub block_type: BlockType,
    pub content: String,
    pub checked: Option<bool>,
    pub image_url: Option<String>,
}

impl Block {
    pub fn new(id: BlockId, block_type: BlockType) -> Self {
        let mut block = Self {
            id,
            block_type,
            content: String::new(),
            checked: None,
            image_url: None,
        };
        block.init_type_fields();
        block
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        if self.block_type == BlockType::Checklist {
            self.checked = Some(checked);
        }
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        if self.block_type == BlockType::Image {
            self.image_url = Some(url.into());
        }
        self
    }

    pub fn is_checked(&self) -> bool {
        self.checked.unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Copy of this block under a different id.
    pub fn duplicate_as(&self, id: BlockId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    pub(crate) fn retype(&mut self, block_type: BlockType) {
        self.block_type = block_type;
        self.content.clear();
        self.init_type_fields();
    }

    /// Brings `checked` and `image_url` in line with `block_type`, keeping
    /// values that are already valid for the type.
    pub(crate) fn normalize_type_fields(&mut self) {
        if self.block_type == BlockType::Checklist {
            self.checked.get_or_insert(false);
        } else {
            self.checked = None;
        }
        if self.block_type == BlockType::Image {
            self.image_url
                .get_or_insert_with(|| IMAGE_PLACEHOLDER_URL.to_string());
        } else {
            self.image_url = None;
        }
    }

    fn init_type_fields(&mut self) {
        self.checked = match self.block_type {
            BlockType::Checklist => Some(false),
            _ => None,
        };
        self.image_url = match self.block_type {
            BlockType::Image => Some(IMAGE_PLACEHOLDER_URL.to_string()),
            _ => None,
        };
    }
}
