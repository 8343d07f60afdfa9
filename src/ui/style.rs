use std::path::Path;

use ratatui::style::{Color, Modifier, Style as RatStyle};
use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Color as written in a theme file
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// Named color: "red", "blue", "cyan", etc.
    Named(NamedColor),
    /// RGB color: [255, 128, 0]
    Rgb([u8; 3]),
    /// 256-color index: 42
    Indexed(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
    Reset,
}

impl From<ThemeColor> for Color {
    fn from(tc: ThemeColor) -> Color {
        match tc {
            ThemeColor::Named(n) => match n {
                NamedColor::Black => Color::Black,
                NamedColor::Red => Color::Red,
                NamedColor::Green => Color::Green,
                NamedColor::Yellow => Color::Yellow,
                NamedColor::Blue => Color::Blue,
                NamedColor::Magenta => Color::Magenta,
                NamedColor::Cyan => Color::Cyan,
                NamedColor::Gray => Color::Gray,
                NamedColor::DarkGray => Color::DarkGray,
                NamedColor::LightRed => Color::LightRed,
                NamedColor::LightGreen => Color::LightGreen,
                NamedColor::LightYellow => Color::LightYellow,
                NamedColor::LightBlue => Color::LightBlue,
                NamedColor::LightMagenta => Color::LightMagenta,
                NamedColor::LightCyan => Color::LightCyan,
                NamedColor::White => Color::White,
                NamedColor::Reset => Color::Reset,
            },
            ThemeColor::Rgb([r, g, b]) => Color::Rgb(r, g, b),
            ThemeColor::Indexed(i) => Color::Indexed(i),
        }
    }
}

/// Style of one screen element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<ThemeColor>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub dim: bool,
}

impl ElementStyle {
    pub fn fg(color: ThemeColor) -> Self {
        Self { fg: Some(color), ..Default::default() }
    }

    pub fn with_bg(mut self, color: ThemeColor) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn to_ratatui(&self) -> RatStyle {
        let mut style = RatStyle::default();
        if let Some(fg) = self.fg {
            style = style.fg(fg.into());
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg.into());
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

/// Complete theme configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    #[serde(default)]
    pub background: Option<ThemeColor>,

    // Table
    pub cell: ElementStyle,
    pub cell_cursor: ElementStyle,
    pub column_selected: ElementStyle,
    pub header: ElementStyle,
    pub header_selected: ElementStyle,
    pub row_number: ElementStyle,
    pub row_number_cursor: ElementStyle,

    // Diff pane
    pub diff_original: ElementStyle,
    pub diff_renamed: ElementStyle,

    // Status bar
    pub status_bar: ElementStyle,
    pub status_mode_normal: ElementStyle,
    pub status_mode_command: ElementStyle,
    pub status_mode_prompt: ElementStyle,
    pub status_unsaved: ElementStyle,

    // Messages
    pub message_info: ElementStyle,
    pub message_warning: ElementStyle,
    pub message_error: ElementStyle,

    // Command line and overlays
    pub command_line: ElementStyle,
    pub command_prompt: ElementStyle,
    pub overlay: ElementStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        use NamedColor::*;
        let c = ThemeColor::Named;
        Self {
            name: "dark".to_string(),
            background: Some(c(Black)),
            cell: ElementStyle::fg(c(White)),
            cell_cursor: ElementStyle::fg(c(Black)).with_bg(c(LightCyan)).with_bold(),
            column_selected: ElementStyle::fg(c(White)).with_bg(c(DarkGray)),
            header: ElementStyle::fg(c(LightGreen)).with_bold(),
            header_selected: ElementStyle::fg(c(Black)).with_bg(c(LightGreen)).with_bold(),
            row_number: ElementStyle::fg(c(Gray)),
            row_number_cursor: ElementStyle::fg(c(LightYellow)).with_bold(),
            diff_original: ElementStyle::fg(c(LightYellow)).with_bold(),
            diff_renamed: ElementStyle::fg(c(LightCyan)),
            status_bar: ElementStyle::fg(c(White)).with_bg(c(DarkGray)),
            status_mode_normal: ElementStyle::fg(c(Black)).with_bg(c(LightBlue)).with_bold(),
            status_mode_command: ElementStyle::fg(c(Black)).with_bg(c(LightYellow)).with_bold(),
            status_mode_prompt: ElementStyle::fg(c(Black)).with_bg(c(LightGreen)).with_bold(),
            status_unsaved: ElementStyle::fg(c(LightRed)).with_bg(c(DarkGray)).with_bold(),
            message_info: ElementStyle::fg(c(White)),
            message_warning: ElementStyle::fg(c(LightYellow)),
            message_error: ElementStyle::fg(c(LightRed)).with_bold(),
            command_line: ElementStyle::fg(c(White)),
            command_prompt: ElementStyle::fg(c(LightCyan)),
            overlay: ElementStyle::fg(c(White)).with_bg(c(Black)),
        }
    }

    pub fn light() -> Self {
        use NamedColor::*;
        let c = ThemeColor::Named;
        Self {
            name: "light".to_string(),
            background: None, // Use terminal default
            cell: ElementStyle::fg(c(Black)),
            cell_cursor: ElementStyle::fg(c(White)).with_bg(c(Blue)).with_bold(),
            column_selected: ElementStyle::fg(c(Black)).with_bg(c(LightCyan)),
            header: ElementStyle::fg(c(Blue)).with_bold(),
            header_selected: ElementStyle::fg(c(White)).with_bg(c(Blue)).with_bold(),
            row_number: ElementStyle::fg(c(Gray)),
            row_number_cursor: ElementStyle::fg(c(Blue)).with_bold(),
            diff_original: ElementStyle::fg(c(Magenta)).with_bold(),
            diff_renamed: ElementStyle::fg(c(Blue)),
            status_bar: ElementStyle::fg(c(Black)).with_bg(c(Gray)),
            status_mode_normal: ElementStyle::fg(c(White)).with_bg(c(Blue)).with_bold(),
            status_mode_command: ElementStyle::fg(c(Black)).with_bg(c(Yellow)).with_bold(),
            status_mode_prompt: ElementStyle::fg(c(White)).with_bg(c(Green)).with_bold(),
            status_unsaved: ElementStyle::fg(c(Red)).with_bg(c(Gray)).with_bold(),
            message_info: ElementStyle::fg(c(Black)),
            message_warning: ElementStyle::fg(c(Yellow)),
            message_error: ElementStyle::fg(c(Red)).with_bold(),
            command_line: ElementStyle::fg(c(Black)),
            command_prompt: ElementStyle::fg(c(Blue)),
            overlay: ElementStyle::fg(c(Black)).with_bg(c(White)),
        }
    }

    pub fn solarized_dark() -> Self {
        let base03 = ThemeColor::Rgb([0, 43, 54]);
        let base02 = ThemeColor::Rgb([7, 54, 66]);
        let base01 = ThemeColor::Rgb([88, 110, 117]);
        let base0 = ThemeColor::Rgb([131, 148, 150]);
        let base1 = ThemeColor::Rgb([147, 161, 161]);
        let yellow = ThemeColor::Rgb([181, 137, 0]);
        let orange = ThemeColor::Rgb([203, 75, 22]);
        let red = ThemeColor::Rgb([220, 50, 47]);
        let magenta = ThemeColor::Rgb([211, 54, 130]);
        let blue = ThemeColor::Rgb([38, 139, 210]);
        let cyan = ThemeColor::Rgb([42, 161, 152]);
        let green = ThemeColor::Rgb([133, 153, 0]);

        Self {
            name: "solarized-dark".to_string(),
            background: Some(base03),
            cell: ElementStyle::fg(base0),
            cell_cursor: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            column_selected: ElementStyle::fg(base1).with_bg(base02),
            header: ElementStyle::fg(cyan).with_bold(),
            header_selected: ElementStyle::fg(base03).with_bg(cyan).with_bold(),
            row_number: ElementStyle::fg(base01),
            row_number_cursor: ElementStyle::fg(yellow).with_bold(),
            diff_original: ElementStyle::fg(magenta).with_bold(),
            diff_renamed: ElementStyle::fg(cyan).with_italic(),
            status_bar: ElementStyle::fg(base1).with_bg(base02),
            status_mode_normal: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            status_mode_command: ElementStyle::fg(base03).with_bg(yellow).with_bold(),
            status_mode_prompt: ElementStyle::fg(base03).with_bg(green).with_bold(),
            status_unsaved: ElementStyle::fg(red).with_bg(base02).with_bold(),
            message_info: ElementStyle::fg(base0),
            message_warning: ElementStyle::fg(orange),
            message_error: ElementStyle::fg(red).with_bold(),
            command_line: ElementStyle::fg(base0),
            command_prompt: ElementStyle::fg(cyan),
            overlay: ElementStyle::fg(base1).with_bg(base03),
        }
    }

    /// Load theme from TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse theme file: {}", e.message()))
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "solarized" | "solarized-dark" => Some(Self::solarized_dark()),
            _ => None,
        }
    }

    /// List available built-in themes
    pub fn builtin_names() -> &'static [&'static str] {
        &["dark", "light", "solarized-dark"]
    }
}

/// Runtime style manager
#[derive(Default)]
pub struct Style {
    pub theme: Theme,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    // Convenience accessors that return ratatui styles
    pub fn cell(&self) -> RatStyle {
        self.theme.cell.to_ratatui()
    }

    pub fn cell_cursor(&self) -> RatStyle {
        self.theme.cell_cursor.to_ratatui()
    }

    pub fn column_selected(&self) -> RatStyle {
        self.theme.column_selected.to_ratatui()
    }

    pub fn header(&self) -> RatStyle {
        self.theme.header.to_ratatui()
    }

    pub fn header_selected(&self) -> RatStyle {
        self.theme.header_selected.to_ratatui()
    }

    pub fn row_number(&self) -> RatStyle {
        self.theme.row_number.to_ratatui()
    }

    pub fn row_number_cursor(&self) -> RatStyle {
        self.theme.row_number_cursor.to_ratatui()
    }

    pub fn diff_original(&self) -> RatStyle {
        self.theme.diff_original.to_ratatui()
    }

    pub fn diff_renamed(&self) -> RatStyle {
        self.theme.diff_renamed.to_ratatui()
    }

    pub fn status_bar(&self) -> RatStyle {
        self.theme.status_bar.to_ratatui()
    }

    pub fn status_mode(&self, mode: &Mode) -> RatStyle {
        match mode {
            Mode::Normal => self.theme.status_mode_normal.to_ratatui(),
            Mode::Command => self.theme.status_mode_command.to_ratatui(),
            Mode::Prompt(_) => self.theme.status_mode_prompt.to_ratatui(),
        }
    }

    pub fn status_unsaved(&self) -> RatStyle {
        self.theme.status_unsaved.to_ratatui()
    }

    pub fn message_info(&self) -> RatStyle {
        self.theme.message_info.to_ratatui()
    }

    pub fn message_warning(&self) -> RatStyle {
        self.theme.message_warning.to_ratatui()
    }

    pub fn message_error(&self) -> RatStyle {
        self.theme.message_error.to_ratatui()
    }

    pub fn command_line(&self) -> RatStyle {
        self.theme.command_line.to_ratatui()
    }

    pub fn command_prompt(&self) -> RatStyle {
        self.theme.command_prompt.to_ratatui()
    }

    pub fn overlay(&self) -> RatStyle {
        self.theme.overlay.to_ratatui()
    }

    pub fn background(&self) -> Option<Color> {
        self.theme.background.map(|c| c.into())
    }
}
