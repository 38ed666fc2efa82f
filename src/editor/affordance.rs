use super::block::BlockType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputShape {
    SingleLine,
    MultiLine,
    /// No editable text at all (dividers).
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtraControls {
    None,
    Checkbox,
    CaptionedImage,
}

/// The editing affordance a block type needs from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affordance {
    pub input_shape: InputShape,
    pub extra_controls: ExtraControls,
    pub placeholder: &'static str,
}

impl Affordance {
    const fn new(
        input_shape: InputShape,
        extra_controls: ExtraControls,
        placeholder: &'static str,
    ) -> Self {
        Self {
            input_shape,
            extra_controls,
            placeholder,
        }
    }

    pub fn accepts_text(&self) -> bool {
        self.input_shape != InputShape::None
    }

    pub fn accepts_line_breaks(&self) -> bool {
        self.input_shape == InputShape::MultiLine
    }
}

/// Dividers expose no text input at all and report [`InputShape::None`];
/// every other type is single-line or multi-line.
pub fn affordance(block_type: BlockType) -> Affordance {
    use ExtraControls as X;
    use InputShape as S;

    match block_type {
        BlockType::Heading1 => Affordance::new(S::SingleLine, X::None, "Heading 1"),
        BlockType::Heading2 => Affordance::new(S::SingleLine, X::None, "Heading 2"),
        BlockType::Heading3 => Affordance::new(S::SingleLine, X::None, "Heading 3"),
        BlockType::Paragraph => {
            Affordance::new(S::MultiLine, X::None, "Type '/' for commands")
        }
        BlockType::List => Affordance::new(S::SingleLine, X::None, "List item"),
        BlockType::Checklist => Affordance::new(S::SingleLine, X::Checkbox, "To-do"),
        BlockType::Quote => Affordance::new(S::MultiLine, X::None, "Quote"),
        BlockType::Code => Affordance::new(S::MultiLine, X::None, "Code"),
        BlockType::Divider => Affordance::new(S::None, X::None, ""),
        BlockType::Image => {
            Affordance::new(S::SingleLine, X::CaptionedImage, "Add a caption...")
        }
    }
}

/// Dispatch on a raw type tag. Unknown tags are treated as paragraphs.
pub fn affordance_for_tag(tag: &str) -> Affordance {
    match BlockType::from_tag(tag) {
        Some(block_type) => affordance(block_type),
        None => {
            tracing::warn!(target: "blockpad::affordance", tag, "unknown block type, using paragraph");
            affordance(BlockType::Paragraph)
        }
    }
}
