//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::{Config, API_ENV_VAR};

impl Config {
    /// Serialize config to TOML string
    pub fn to_toml(&self) -> String {
        format!(
            r#"# tutorial-reader configuration

# Tutorial backend API ({env} env var overrides)
api_base_url = "{api}"

# Seconds before a backend request is abandoned
request_timeout_secs = {timeout}

# Theme: Reader Dark, Reader Light, Catppuccin Mocha, Terminal ANSI,
# or the name of a .toml file in ~/.config/tutorial-reader/themes/
theme = "{theme}"

# Use theme's background color (true) or terminal's default (false)
use_theme_background = {use_bg}

# Fade between lessons (0 disables a phase)
[transition]
fade_out_ms = {fade_out}
fade_in_ms = {fade_in}

# Fenced blocks with this language tag are drawn as diagrams
[diagram]
tag = "{diagram_tag}"
glyphs = "{diagram_glyphs}"  # unicode, ascii

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to the TUI log panel)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            env = API_ENV_VAR,
            api = self.api_base_url,
            timeout = self.request_timeout_secs,
            theme = self.theme,
            use_bg = self.use_theme_background,
            fade_out = self.transition.fade_out_ms,
            fade_in = self.transition.fade_in_ms,
            diagram_tag = self.diagram.tag,
            diagram_glyphs = self.diagram.glyphs.as_str(),
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }
}
