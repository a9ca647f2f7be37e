//! `[logging]` section
//!
//! Config is loaded before the tracing subscriber exists, so problems with
//! these values are reported on stderr and replaced by defaults.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "never" => Ok(Self::Never),
            other => Err(format!("unknown rotation {:?}", other)),
        }
    }
}

impl fmt::Display for LogRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved logging settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for our own crate; RUST_LOG overrides it entirely
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// `tutorial-reader` gives `tutorial-reader.2024-01-15` under daily rotation
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::default(),
            file_prefix: "tutorial-reader".to_string(),
        }
    }
}

/// `[logging]` as written in the file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<PathBuf>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let Some(file) = file else {
            return Self::default();
        };
        let defaults = Self::default();

        let level = match file.level.map(|l| l.trim().to_ascii_lowercase()) {
            Some(level) if LEVELS.contains(&level.as_str()) => level,
            Some(level) => {
                eprintln!(
                    "Warning: logging.level {:?} is not one of {}, using {}",
                    level,
                    LEVELS.join("/"),
                    defaults.level
                );
                defaults.level
            }
            None => defaults.level,
        };

        let file_rotation = match file.file_rotation.as_deref().map(str::parse::<LogRotation>) {
            Some(Ok(rotation)) => rotation,
            Some(Err(e)) => {
                eprintln!("Warning: logging.file_rotation: {}, using daily", e);
                LogRotation::Daily
            }
            None => defaults.file_rotation,
        };

        Self {
            level,
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.unwrap_or(defaults.file_dir),
            file_rotation,
            file_prefix: file
                .file_prefix
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.file_prefix),
        }
    }
}
