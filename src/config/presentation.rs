//! Presentation settings: lesson transitions and diagram blocks

use serde::Deserialize;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Transition
// ─────────────────────────────────────────────────────────────────────────────

/// Fade timings used when switching lessons
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionConfig {
    pub fade_out_ms: u64,
    pub fade_in_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: 150,
            fade_in_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTransition {
    pub fade_out_ms: Option<u64>,
    pub fade_in_ms: Option<u64>,
}

impl TransitionConfig {
    pub fn from_file(file: Option<FileTransition>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            fade_out_ms: file.fade_out_ms.unwrap_or(defaults.fade_out_ms),
            fade_in_ms: file.fade_in_ms.unwrap_or(defaults.fade_in_ms),
        }
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Diagrams
// ─────────────────────────────────────────────────────────────────────────────

/// Box-drawing character set for diagrams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GlyphStyle {
    #[default]
    Unicode,
    /// Plain `+-|` for terminals without box-drawing fonts
    Ascii,
}

impl GlyphStyle {
    /// Parse from config (unknown values mean unicode)
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ascii" => Self::Ascii,
            _ => Self::Unicode,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unicode => "unicode",
            Self::Ascii => "ascii",
        }
    }
}

/// Diagram block settings
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSettings {
    /// Fence language tag that marks a diagram block
    pub tag: String,
    pub glyphs: GlyphStyle,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            tag: "mermaid".to_string(),
            glyphs: GlyphStyle::Unicode,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDiagram {
    pub tag: Option<String>,
    pub glyphs: Option<String>,
}

impl DiagramSettings {
    pub fn from_file(file: Option<FileDiagram>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            tag: file
                .tag
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or(defaults.tag),
            glyphs: file
                .glyphs
                .map(|g| GlyphStyle::from_str(&g))
                .unwrap_or(defaults.glyphs),
        }
    }
}
