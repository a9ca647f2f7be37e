//! Tutorial data model
//!
//! The backend serves a tutorial as a tree of chapters, each holding an
//! ordered list of lessons. A lesson's `path` is its identity everywhere:
//! addressing, fetching, caching, and sidebar highlighting.
//!
//! # Duplicate paths
//!
//! Nothing upstream guarantees that `path` is unique within a structure.
//! If two lessons share a path, highlighting and caching treat them as the
//! same lesson. [`TutorialStructure::duplicate_paths`] exists so the loader
//! can warn about it; it does not try to disambiguate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Chapter/lesson tree for one tutorial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialStructure {
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// A titled, ordered group of lessons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A single lesson, addressed by its path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub path: String,
}

/// Markdown body of one lesson
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonContent {
    pub path: String,
    pub body: String,
}

impl TutorialStructure {
    /// Iterate all lessons in reading order
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.chapters.iter().flat_map(|c| c.lessons.iter())
    }

    /// Total number of lessons across all chapters
    pub fn lesson_count(&self) -> usize {
        self.chapters.iter().map(|c| c.lessons.len()).sum()
    }

    /// The default lesson: first lesson of the first chapter that has any
    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lessons().next()
    }

    /// Find the first lesson with the given path
    pub fn find_lesson(&self, path: &str) -> Option<&Lesson> {
        self.lessons().find(|lesson| lesson.path == path)
    }

    /// Lesson following `path` in reading order
    pub fn next_lesson(&self, path: &str) -> Option<&Lesson> {
        let mut iter = self.lessons();
        iter.find(|l| l.path == path)?;
        iter.next()
    }

    /// Lesson preceding `path` in reading order
    pub fn previous_lesson(&self, path: &str) -> Option<&Lesson> {
        let mut previous = None;
        for lesson in self.lessons() {
            if lesson.path == path {
                return previous;
            }
            previous = Some(lesson);
        }
        None
    }

    /// Paths that appear on more than one lesson, in first-seen order
    pub fn duplicate_paths(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for lesson in self.lessons() {
            let path = lesson.path.as_str();
            if !seen.insert(path) && reported.insert(path) {
                duplicates.push(path);
            }
        }
        duplicates
    }
}
