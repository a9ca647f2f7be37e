// TOML theme format parser
//
// Native theme format for tutorial-reader. Each theme defines every semantic
// color explicitly; only [lesson] and [diagram] entries may be omitted and
// fall back to UI colors.
//
// Format version: 1

use ratatui::style::Color;
use serde::Deserialize;

/// Root structure for TOML theme files
#[derive(Debug, Clone, Deserialize)]
pub struct TomlTheme {
    pub meta: ThemeMeta,
    pub ui: UiColors,
    pub status: StatusColors,
    pub lesson: Option<LessonColors>,
    pub diagram: Option<DiagramColors>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeMeta {
    pub name: String,
    #[allow(dead_code)] // For future schema evolution
    pub version: u32,
}

/// Base UI chrome colors
#[derive(Debug, Clone, Deserialize)]
pub struct UiColors {
    pub background: String,
    pub foreground: String,
    pub border: String,
    pub border_focused: String,
    pub title: String,
    pub status_bar: String,
    pub selection_bg: String,
    pub selection_fg: String,
    pub muted: String,
    /// "plain", "rounded", "double", "thick" (default: plain)
    pub border_type: Option<String>,
}

/// Loading / advisory / error colors
#[derive(Debug, Clone, Deserialize)]
pub struct StatusColors {
    pub ok: String,
    pub warn: String,
    pub error: String,
}

/// Markdown rendering colors
#[derive(Debug, Clone, Deserialize)]
pub struct LessonColors {
    pub heading: String,
    pub subheading: String,
    pub minor_heading: String,
    pub code_inline: String,
    pub code_block: String,
    pub link: String,
    pub quote: String,
}

/// Diagram rendering colors
#[derive(Debug, Clone, Deserialize)]
pub struct DiagramColors {
    pub node: String,
    pub edge: String,
    pub label: String,
}

impl TomlTheme {
    /// Parse a TOML theme from string
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse a color string to ratatui Color
    ///
    /// Supports `#RRGGBB` and `ansi:0`..`ansi:15` / `ansi:fg` / `ansi:bg`
    /// for terminal-native colors. Unparseable values become white.
    pub fn parse_color(value: &str) -> Color {
        if let Some(ansi) = value.strip_prefix("ansi:") {
            return match ansi {
                "0" => Color::Black,
                "1" => Color::Red,
                "2" => Color::Green,
                "3" => Color::Yellow,
                "4" => Color::Blue,
                "5" => Color::Magenta,
                "6" => Color::Cyan,
                "7" => Color::White,
                "8" => Color::DarkGray,
                "9" => Color::LightRed,
                "10" => Color::LightGreen,
                "11" => Color::LightYellow,
                "12" => Color::LightBlue,
                "13" => Color::LightMagenta,
                "14" => Color::LightCyan,
                "15" => Color::Gray,
                "fg" | "bg" => Color::Reset,
                _ => Color::White,
            };
        }

        let hex = value.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Color::White;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match (channel(0..2), channel(2..4), channel(4..6)) {
            (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => Color::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(TomlTheme::parse_color("#ff0000"), Color::Rgb(255, 0, 0));
        assert_eq!(TomlTheme::parse_color("00ff00"), Color::Rgb(0, 255, 0));
        assert_eq!(TomlTheme::parse_color("ansi:4"), Color::Blue);
        assert_eq!(TomlTheme::parse_color("ansi:bg"), Color::Reset);
        assert_eq!(TomlTheme::parse_color("#zzzzzz"), Color::White);
        assert_eq!(TomlTheme::parse_color("#fff"), Color::White);
    }

    #[test]
    fn test_optional_sections() {
        let toml = r##"
[meta]
name = "Minimal"
version = 1

[ui]
background = "#000000"
foreground = "#ffffff"
border = "#444444"
border_focused = "#ffcc00"
title = "#ffffff"
status_bar = "#ffffff"
selection_bg = "#333333"
selection_fg = "#ffffff"
muted = "#888888"

[status]
ok = "#00ff00"
warn = "#ffcc00"
error = "#ff0000"
"##;

        let theme = TomlTheme::from_str(toml).unwrap();
        assert_eq!(theme.meta.name, "Minimal");
        assert!(theme.lesson.is_none());
        assert!(theme.diagram.is_none());
    }
}
