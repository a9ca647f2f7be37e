//! Navigable address: `/output/{tutorialId}[/{lessonPath}]`
//!
//! The address is the shareable deep link to whatever lesson is on screen.
//! Lesson paths are percent-encoded one segment at a time when formatted
//! and decoded exactly once when parsed, so `chapter 1/intro.md` round-trips
//! as `chapter%201/intro.md` and never as `chapter%25201/...`.
//!
//! [`AddressBar`] keeps browser-style history so back/forward work within a
//! session.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Characters left as-is inside a path segment (RFC 3986 unreserved)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Prefix shared by both tutorial routes
const OUTPUT_PREFIX: &str = "/output/";

/// Percent-encode a single path segment (`/` is encoded too)
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Percent-encode a lesson path, keeping `/` as the separator
pub fn encode_lesson_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode an encoded lesson path (single pass)
pub fn decode_lesson_path(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

/// Address that does not name a tutorial route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("address must start with /output/: {0}")]
    NotOutputRoute(String),
    #[error("address has no tutorial id: {0}")]
    MissingTutorial(String),
}

/// A tutorial route: root (auto-select) or a specific lesson
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub tutorial_id: String,
    pub lesson_path: Option<String>,
}

impl Route {
    /// Tutorial root; the browser picks the default lesson
    pub fn root(tutorial_id: impl Into<String>) -> Self {
        Self {
            tutorial_id: tutorial_id.into(),
            lesson_path: None,
        }
    }

    /// Deep link to one lesson
    pub fn lesson(tutorial_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            tutorial_id: tutorial_id.into(),
            lesson_path: Some(path.into()),
        }
    }

    /// Parse `/output/{id}[/{lessonPath}]`
    ///
    /// The leading slash is optional. A trailing slash after the id means
    /// the root route. Query strings and fragments are not part of the route
    /// (an encoded `#` or `?` inside a path is fine, it arrives as `%23`/`%3F`).
    pub fn parse(address: &str) -> Result<Self, RouteError> {
        let trimmed = address.trim();
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };

        let rest = normalized
            .strip_prefix(OUTPUT_PREFIX)
            .ok_or_else(|| RouteError::NotOutputRoute(address.to_string()))?;
        let rest = rest.split(['?', '#']).next().unwrap_or_default();

        let (id, lesson) = match rest.split_once('/') {
            Some((id, lesson)) => (id, lesson),
            None => (rest, ""),
        };

        let tutorial_id = decode_lesson_path(id);
        if tutorial_id.is_empty() {
            return Err(RouteError::MissingTutorial(address.to_string()));
        }

        let lesson_path = if lesson.is_empty() {
            None
        } else {
            Some(decode_lesson_path(lesson))
        };

        Ok(Self {
            tutorial_id,
            lesson_path,
        })
    }

    /// Encoded address text
    pub fn to_address(&self) -> String {
        match &self.lesson_path {
            Some(path) => format!(
                "{}{}/{}",
                OUTPUT_PREFIX,
                encode_segment(&self.tutorial_id),
                encode_lesson_path(path)
            ),
            None => format!("{}{}", OUTPUT_PREFIX, encode_segment(&self.tutorial_id)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

/// Address bar with back/forward history
#[derive(Debug, Clone)]
pub struct AddressBar {
    history: Vec<Route>,
    cursor: usize,
}

impl AddressBar {
    pub fn new(initial: Route) -> Self {
        Self {
            history: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.history[self.cursor]
    }

    /// Navigate to a new address; drops forward history
    ///
    /// Pushing the address already shown is a no-op.
    pub fn push(&mut self, route: Route) {
        if *self.current() == route {
            return;
        }
        self.history.truncate(self.cursor + 1);
        self.history.push(route);
        self.cursor = self.history.len() - 1;
    }

    pub fn back(&mut self) -> Option<&Route> {
        if self.can_go_back() {
            self.cursor -= 1;
            Some(self.current())
        } else {
            None
        }
    }

    pub fn forward(&mut self) -> Option<&Route> {
        if self.can_go_forward() {
            self.cursor += 1;
            Some(self.current())
        } else {
            None
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_route() {
        let route = Route::parse("/output/PocketFlow").unwrap();
        assert_eq!(route, Route::root("PocketFlow"));

        let route = Route::parse("output/PocketFlow/").unwrap();
        assert_eq!(route, Route::root("PocketFlow"));
    }

    #[test]
    fn test_parse_lesson_route_with_nested_path() {
        let route = Route::parse("/output/repo/chapter_1/lesson_1_intro.md").unwrap();
        assert_eq!(route, Route::lesson("repo", "chapter_1/lesson_1_intro.md"));
    }

    #[test]
    fn test_parse_decodes_once() {
        // %2520 is an encoded "%20": decoding once must leave "%20" literally
        let route = Route::parse("/output/repo/a%2520b.md").unwrap();
        assert_eq!(route.lesson_path.as_deref(), Some("a%20b.md"));

        let route = Route::parse("/output/repo/what%27s%20%231%3F.md").unwrap();
        assert_eq!(route.lesson_path.as_deref(), Some("what's #1?.md"));
    }

    #[test]
    fn test_parse_rejects_other_routes() {
        assert!(matches!(
            Route::parse("/examples"),
            Err(RouteError::NotOutputRoute(_))
        ));
        assert!(matches!(
            Route::parse("/output/"),
            Err(RouteError::MissingTutorial(_))
        ));
    }

    #[test]
    fn test_format_encodes_lesson_segments() {
        let route = Route::lesson("repo", "chapter 1/what's #1?.md");
        assert_eq!(
            route.to_address(),
            "/output/repo/chapter%201/what%27s%20%231%3F.md"
        );
        assert_eq!(Route::parse(&route.to_address()).unwrap(), route);
        assert_eq!(Route::root("repo").to_string(), "/output/repo");
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut bar = AddressBar::new(Route::root("repo"));
        bar.push(Route::lesson("repo", "01_welcome.md"));
        bar.push(Route::lesson("repo", "02_engine.md"));

        assert_eq!(
            bar.back().cloned(),
            Some(Route::lesson("repo", "01_welcome.md"))
        );
        assert!(bar.can_go_forward());
        assert_eq!(
            bar.forward().cloned(),
            Some(Route::lesson("repo", "02_engine.md"))
        );
        assert!(bar.forward().is_none());
    }

    #[test]
    fn test_push_drops_forward_history_and_ignores_duplicates() {
        let mut bar = AddressBar::new(Route::root("repo"));
        bar.push(Route::lesson("repo", "a.md"));
        bar.push(Route::lesson("repo", "a.md"));
        bar.back();
        bar.push(Route::lesson("repo", "b.md"));

        assert!(!bar.can_go_forward());
        assert_eq!(bar.back().cloned(), Some(Route::root("repo")));
        assert!(bar.back().is_none());
    }
}
