pub mod editor;
pub mod editor_display;
pub mod render;
pub mod theme;
