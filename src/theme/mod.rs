// Theme system for the reader TUI
//
// - TomlTheme: on-disk format with explicit semantic color definitions
// - Theme: resolved theme with all colors ready for use
//
// Theme loading priority:
// 1. External TOML themes from ~/.config/tutorial-reader/themes/*.toml
// 2. Bundled themes (extracted on first run)
// 3. Fallback to hardcoded default

mod bundled;
mod toml_format;

pub use toml_format::TomlTheme;

use crate::tui::scroll::FocusablePanel;
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use std::path::PathBuf;

/// Theme configuration options
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    /// Use theme's background color (true) or terminal's default (false)
    pub use_theme_background: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            use_theme_background: true,
        }
    }
}

/// Complete resolved theme ready for use in the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // ─── UI Chrome ───────────────────────────────────────────
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub highlight: Color, // Maps to border_focused
    pub title: Color,
    pub status_bar: Color,
    pub selection: Color,
    pub selection_fg: Color,
    pub muted: Color,
    pub border_type: BorderType,

    // ─── Status ──────────────────────────────────────────────
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // ─── Lesson Markdown ─────────────────────────────────────
    pub heading1: Color,
    pub heading2: Color,
    pub heading3: Color,
    pub code_inline: Color,
    pub code_block: Color,
    pub link: Color,
    pub quote: Color,

    // ─── Diagrams ────────────────────────────────────────────
    pub diagram_node: Color,
    pub diagram_edge: Color,
    pub diagram_label: Color,
}

impl Theme {
    /// Load theme by name with default configuration
    pub fn by_name(name: &str) -> Self {
        Self::by_name_with_config(name, &ThemeConfig::default())
    }

    /// Load theme by name, falling back to the hardcoded default when unknown
    pub fn by_name_with_config(name: &str, config: &ThemeConfig) -> Self {
        if let Some(theme) = Self::load_toml(name, config) {
            return theme;
        }

        tracing::warn!(
            "Theme '{}' not found (available: {}), using fallback",
            name,
            Self::list_available().join(", ")
        );
        Self::hardcoded_default(config)
    }

    /// Load from TOML theme file or bundled theme
    fn load_toml(name: &str, config: &ThemeConfig) -> Option<Self> {
        let normalized = name.replace(' ', "_");

        if let Some(themes_dir) = Self::themes_dir() {
            for candidate in [name, normalized.as_str()] {
                let path = themes_dir.join(format!("{}.toml", candidate));
                let Ok(contents) = std::fs::read_to_string(&path) else {
                    continue;
                };
                match TomlTheme::from_str(&contents) {
                    Ok(toml_theme) => return Some(Self::from_toml(toml_theme, config)),
                    Err(e) => tracing::warn!("Ignoring malformed theme {:?}: {}", path, e),
                }
            }
        }

        let filename = format!("{}.toml", normalized);
        bundled::BUNDLED_THEMES
            .iter()
            .find(|theme| theme.filename.eq_ignore_ascii_case(&filename))
            .and_then(|theme| TomlTheme::from_str(theme.content).ok())
            .map(|toml_theme| Self::from_toml(toml_theme, config))
    }

    /// Get themes directory path
    fn themes_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("tutorial-reader").join("themes"))
    }

    /// Parse border type string to BorderType enum
    fn parse_border_type(value: Option<&str>) -> BorderType {
        match value {
            Some("rounded") => BorderType::Rounded,
            Some("double") => BorderType::Double,
            Some("thick") => BorderType::Thick,
            _ => BorderType::Plain,
        }
    }

    /// Create theme from native TOML format
    fn from_toml(toml: TomlTheme, config: &ThemeConfig) -> Self {
        let parse = TomlTheme::parse_color;

        let background = if config.use_theme_background {
            parse(&toml.ui.background)
        } else {
            Color::Reset
        };
        let foreground = parse(&toml.ui.foreground);
        let title = parse(&toml.ui.title);
        let highlight = parse(&toml.ui.border_focused);
        let muted = parse(&toml.ui.muted);

        // Lesson and diagram sections are optional; fall back to UI chrome
        let lesson = toml.lesson.as_ref();
        let lesson_color = |pick: fn(&toml_format::LessonColors) -> &String, fallback: Color| {
            lesson.map(|l| parse(pick(l))).unwrap_or(fallback)
        };
        let diagram = toml.diagram.as_ref();
        let diagram_color = |pick: fn(&toml_format::DiagramColors) -> &String, fallback: Color| {
            diagram.map(|d| parse(pick(d))).unwrap_or(fallback)
        };

        Self {
            name: toml.meta.name.clone(),

            background,
            foreground,
            border: parse(&toml.ui.border),
            highlight,
            title,
            status_bar: parse(&toml.ui.status_bar),
            selection: parse(&toml.ui.selection_bg),
            selection_fg: parse(&toml.ui.selection_fg),
            muted,
            border_type: Self::parse_border_type(toml.ui.border_type.as_deref()),

            success: parse(&toml.status.ok),
            warning: parse(&toml.status.warn),
            error: parse(&toml.status.error),

            heading1: lesson_color(|l| &l.heading, title),
            heading2: lesson_color(|l| &l.subheading, title),
            heading3: lesson_color(|l| &l.minor_heading, foreground),
            code_inline: lesson_color(|l| &l.code_inline, highlight),
            code_block: lesson_color(|l| &l.code_block, foreground),
            link: lesson_color(|l| &l.link, highlight),
            quote: lesson_color(|l| &l.quote, muted),

            diagram_node: diagram_color(|d| &d.node, title),
            diagram_edge: diagram_color(|d| &d.edge, muted),
            diagram_label: diagram_color(|d| &d.label, highlight),
        }
    }

    /// Hardcoded fallback when no themes can be loaded
    fn hardcoded_default(config: &ThemeConfig) -> Self {
        let background = if config.use_theme_background {
            Color::Rgb(29, 32, 38)
        } else {
            Color::Reset
        };

        Self {
            name: "Reader Dark (Fallback)".to_string(),

            background,
            foreground: Color::Rgb(215, 218, 224),
            border: Color::Rgb(75, 82, 99),
            highlight: Color::Rgb(229, 192, 123),
            title: Color::Rgb(97, 175, 239),
            status_bar: Color::Rgb(171, 178, 191),
            selection: Color::Rgb(62, 68, 81),
            selection_fg: Color::Rgb(255, 255, 255),
            muted: Color::Rgb(127, 132, 142),
            border_type: BorderType::Plain,

            success: Color::Rgb(152, 195, 121),
            warning: Color::Rgb(229, 192, 123),
            error: Color::Rgb(224, 108, 117),

            heading1: Color::Rgb(198, 120, 221),
            heading2: Color::Rgb(97, 175, 239),
            heading3: Color::Rgb(86, 182, 194),
            code_inline: Color::Rgb(86, 182, 194),
            code_block: Color::Rgb(171, 178, 191),
            link: Color::Rgb(229, 192, 123),
            quote: Color::Rgb(127, 132, 142),

            diagram_node: Color::Rgb(97, 175, 239),
            diagram_edge: Color::Rgb(127, 132, 142),
            diagram_label: Color::Rgb(229, 192, 123),
        }
    }

    /// Get border color for a panel based on focus state
    pub fn panel_border(&self, panel: FocusablePanel, focused: bool) -> Color {
        if !focused {
            return self.border;
        }
        match panel {
            FocusablePanel::Sidebar => self.highlight,
            FocusablePanel::Content => self.title,
            FocusablePanel::Logs => self.success,
        }
    }

    /// List all available themes (bundled + external)
    pub fn list_available() -> Vec<String> {
        let mut themes = bundled::list_bundled_themes();

        if let Some(themes_dir) = Self::themes_dir() {
            if let Ok(entries) = std::fs::read_dir(themes_dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "toml") {
                        if let Some(stem) = path.file_stem() {
                            // Convert filename format (underscore) to display format (space)
                            let display_name = stem.to_string_lossy().replace('_', " ");
                            if !themes.iter().any(|t| t.eq_ignore_ascii_case(&display_name)) {
                                themes.push(display_name);
                            }
                        }
                    }
                }
            }
        }

        themes
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::by_name_with_config(crate::config::DEFAULT_THEME, &ThemeConfig::default())
    }
}

/// Ensure themes directory exists and extract bundled themes on first run
pub fn ensure_themes_extracted() {
    let Some(themes_dir) = Theme::themes_dir() else {
        return;
    };

    if std::fs::create_dir_all(&themes_dir).is_err() {
        return;
    }

    // Marker file records that extraction already happened
    let marker = themes_dir.join(".extracted_v1");
    if marker.exists() {
        return;
    }

    for theme in bundled::BUNDLED_THEMES {
        let path = themes_dir.join(theme.filename);
        // Don't overwrite user modifications
        if !path.exists() {
            let _ = std::fs::write(&path, theme.content);
        }
    }

    let _ = std::fs::write(&marker, "1");
}
