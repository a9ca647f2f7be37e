//! Backend collaborator - where tutorial structure and lesson bodies come from
//!
//! The browser core never talks HTTP directly. It goes through [`Backend`],
//! which the real client ([`http::HttpBackend`]) and the in-memory test
//! double implement.

pub mod http;

#[cfg(test)]
pub mod fake;

use crate::browser::model::TutorialStructure;
use async_trait::async_trait;

/// Failure fetching structure or content
///
/// `Clone` so that every caller coalesced onto one request receives the
/// same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Tutorial or lesson is absent (usually: generation still running)
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport or server failure
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Message without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::NotFound(msg) | Self::Network(msg) => msg,
        }
    }
}

/// Source of tutorial data
#[async_trait]
pub trait Backend: Send + Sync {
    /// Chapter/lesson tree for a tutorial
    async fn fetch_structure(&self, tutorial_id: &str) -> Result<TutorialStructure, FetchError>;

    /// Raw markdown body of one lesson
    async fn fetch_content(&self, tutorial_id: &str, lesson_path: &str)
        -> Result<String, FetchError>;
}

/// Reduce a repository URL to the tutorial id the backend stores it under
///
/// `https://github.com/owner/repo.git` becomes `repo`. Plain ids pass
/// through unchanged. Returns `None` when nothing usable is left.
pub fn normalize_tutorial_id(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches('/');
    let looks_like_url = trimmed.contains("://") || trimmed.starts_with("github.com/");

    let id = if looks_like_url {
        let without_git = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        without_git.rsplit('/').next().unwrap_or_default()
    } else {
        trimmed
    };

    let id = id.replace("..", "").replace('/', "");
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_id() {
        assert_eq!(normalize_tutorial_id("pocketflow"), Some("pocketflow".into()));
        assert_eq!(normalize_tutorial_id("  crewAI "), Some("crewAI".into()));
    }

    #[test]
    fn test_normalize_github_urls() {
        assert_eq!(
            normalize_tutorial_id("https://github.com/The-Pocket/PocketFlow"),
            Some("PocketFlow".into())
        );
        assert_eq!(
            normalize_tutorial_id("https://github.com/owner/repo.git"),
            Some("repo".into())
        );
        assert_eq!(
            normalize_tutorial_id("github.com/owner/repo/"),
            Some("repo".into())
        );
    }

    #[test]
    fn test_normalize_rejects_empty_and_traversal() {
        assert_eq!(normalize_tutorial_id(""), None);
        assert_eq!(normalize_tutorial_id(".."), None);
    }

    #[test]
    fn test_fetch_error_detail() {
        let err = FetchError::NotFound("Output not found".into());
        assert!(err.is_not_found());
        assert_eq!(err.detail(), "Output not found");
        assert_eq!(err.to_string(), "not found: Output not found");
        assert!(!FetchError::Network("timeout".into()).is_not_found());
    }
}
