use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the block editor
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground color for the page title
    pub title_fg: Color,

    /// Background color behind the focused block
    pub focused_block_bg: Color,

    /// Background color of the block the dragged block would land on
    pub drop_target_bg: Color,

    /// Foreground color for placeholder text in empty blocks
    pub placeholder_fg: Color,

    /// Foreground color for completed checklist items
    pub checked_fg: Color,

    /// Foreground color for code blocks
    pub code_fg: Color,

    /// Foreground color for quote blocks
    pub quote_fg: Color,

    /// Foreground color for divider rules
    pub divider_fg: Color,

    /// Foreground color for image references
    pub image_fg: Color,

    /// Foreground color for the drag handle and insert button
    pub gutter_fg: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the page id in the status bar
    pub page_id_color: Color,

    /// Foreground color for menu items
    pub menu_fg: Color,

    /// Background color for menu
    pub menu_bg: Color,

    /// Foreground color for menu item descriptions
    pub menu_description_fg: Color,

    /// Foreground color for selected menu entry
    pub menu_selected_fg: Color,

    /// Background color for selected menu entry
    pub menu_selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title_fg: Color::Reset,
            focused_block_bg: Color::Rgb(40, 40, 48),
            drop_target_bg: Color::Blue,
            placeholder_fg: Color::DarkGray,
            checked_fg: Color::DarkGray,
            code_fg: Color::LightGreen,
            quote_fg: Color::Gray,
            divider_fg: Color::DarkGray,
            image_fg: Color::LightMagenta,
            gutter_fg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            page_id_color: Color::LightYellow,
            menu_fg: Color::White,
            menu_bg: Color::Black,
            menu_description_fg: Color::DarkGray,
            menu_selected_fg: Color::Black,
            menu_selected_bg: Color::White,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title_fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Layered over every span of the focused block
    pub fn focused_block_style(&self) -> Style {
        Style::default().bg(self.focused_block_bg)
    }

    /// Layered over every span of the block being dragged
    pub fn dragged_block_style(&self) -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }

    pub fn drop_target_style(&self) -> Style {
        Style::default().bg(self.drop_target_bg)
    }

    pub fn placeholder_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_fg)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn checked_style(&self) -> Style {
        Style::default()
            .fg(self.checked_fg)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code_fg)
    }

    pub fn quote_style(&self) -> Style {
        Style::default()
            .fg(self.quote_fg)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn divider_style(&self) -> Style {
        Style::default().fg(self.divider_fg)
    }

    pub fn image_style(&self) -> Style {
        Style::default().fg(self.image_fg)
    }

    pub fn gutter_style(&self) -> Style {
        Style::default().fg(self.gutter_fg)
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the page id in the status bar
    pub fn page_id_style(&self) -> Style {
        Style::default().fg(self.page_id_color)
    }

    /// Get the style for the menu/popup
    pub fn menu_style(&self) -> Style {
        Style::default().fg(self.menu_fg).bg(self.menu_bg)
    }

    pub fn menu_section_style(&self) -> Style {
        self.menu_style().add_modifier(Modifier::BOLD)
    }

    pub fn menu_description_style(&self) -> Style {
        Style::default().fg(self.menu_description_fg)
    }

    /// Get the style for a selected menu entry
    pub fn menu_selected_style(&self) -> Style {
        Style::default()
            .fg(self.menu_selected_fg)
            .bg(self.menu_selected_bg)
    }
}
