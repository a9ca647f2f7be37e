//! Bundled TOML themes (compiled into binary)
//!
//! Extracted to ~/.config/tutorial-reader/themes/ on first run so users can
//! copy and modify them. One module per theme.

mod catppuccin_mocha;
mod reader_dark;
mod reader_light;
mod terminal_ansi;

/// A theme shipped inside the binary
pub struct BundledTheme {
    pub filename: &'static str,
    pub content: &'static str,
}

pub const BUNDLED_THEMES: &[BundledTheme] = &[
    BundledTheme {
        filename: "Reader_Dark.toml",
        content: reader_dark::THEME,
    },
    BundledTheme {
        filename: "Reader_Light.toml",
        content: reader_light::THEME,
    },
    BundledTheme {
        filename: "Catppuccin_Mocha.toml",
        content: catppuccin_mocha::THEME,
    },
    BundledTheme {
        filename: "Terminal_ANSI.toml",
        content: terminal_ansi::THEME,
    },
];

/// Display names of bundled themes
pub fn list_bundled_themes() -> Vec<String> {
    BUNDLED_THEMES
        .iter()
        .map(|t| t.filename.trim_end_matches(".toml").replace('_', " "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::TomlTheme;

    #[test]
    fn test_all_bundled_themes_parse() {
        for theme in BUNDLED_THEMES {
            let parsed = TomlTheme::from_str(theme.content);
            assert!(
                parsed.is_ok(),
                "{} failed to parse: {:?}",
                theme.filename,
                parsed.err()
            );
        }
    }

    #[test]
    fn test_names_match_filenames() {
        for (theme, name) in BUNDLED_THEMES.iter().zip(list_bundled_themes()) {
            let parsed = TomlTheme::from_str(theme.content).unwrap();
            assert_eq!(parsed.meta.name, name);
        }
    }
}
