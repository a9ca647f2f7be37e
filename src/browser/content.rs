//! Content repository
//!
//! Fetches lesson bodies by path and keeps them in a session cache so going
//! back to a lesson does not hit the backend again. The cache belongs to one
//! tutorial at a time: asking for another tutorial's content empties it, and
//! results that arrive for a tutorial that is no longer current are not
//! stored. Entries are never evicted otherwise.
//!
//! Concurrent requests for the same path share one backend call; requests for
//! different paths run independently.

use super::inflight::InFlight;
use super::model::LessonContent;
use crate::api::{Backend, FetchError};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ContentCache {
    tutorial_id: Option<String>,
    entries: HashMap<String, LessonContent>,
}

impl ContentCache {
    /// Make `tutorial_id` the owner, dropping another tutorial's entries
    fn claim(&mut self, tutorial_id: &str) {
        if self.tutorial_id.as_deref() != Some(tutorial_id) {
            if !self.entries.is_empty() {
                tracing::debug!(
                    "Dropping {} cached lessons on switch to {}",
                    self.entries.len(),
                    tutorial_id
                );
            }
            self.entries.clear();
            self.tutorial_id = Some(tutorial_id.to_string());
        }
    }
}

pub struct ContentRepository {
    backend: Arc<dyn Backend>,
    cache: Mutex<ContentCache>,
    inflight: InFlight<(String, String), LessonContent>,
}

impl ContentRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            cache: Mutex::new(ContentCache::default()),
            inflight: InFlight::new(),
        }
    }

    /// Cached lesson, without suspending
    pub fn cached(&self, tutorial_id: &str, lesson_path: &str) -> Option<LessonContent> {
        let cache = self.cache.lock().unwrap();
        if cache.tutorial_id.as_deref() != Some(tutorial_id) {
            return None;
        }
        cache.entries.get(lesson_path).cloned()
    }

    /// Fetch a lesson, consulting the cache first
    pub async fn fetch_content(
        &self,
        tutorial_id: &str,
        lesson_path: &str,
    ) -> Result<LessonContent, FetchError> {
        {
            let mut cache = self.cache.lock().unwrap();
            cache.claim(tutorial_id);
            if let Some(hit) = cache.entries.get(lesson_path) {
                tracing::trace!("Cache hit for {}", lesson_path);
                return Ok(hit.clone());
            }
        }

        let backend = self.backend.clone();
        let id = tutorial_id.to_string();
        let path = lesson_path.to_string();

        let result = self
            .inflight
            .run(
                (tutorial_id.to_string(), lesson_path.to_string()),
                move || {
                    async move {
                        tracing::debug!("Fetching {} from {}", path, id);
                        let body = backend.fetch_content(&id, &path).await?;
                        Ok(LessonContent { path, body })
                    }
                    .boxed()
                },
            )
            .await;

        match &result {
            Ok(content) => {
                let mut cache = self.cache.lock().unwrap();
                if cache.tutorial_id.as_deref() == Some(tutorial_id) {
                    cache
                        .entries
                        .insert(lesson_path.to_string(), content.clone());
                } else {
                    tracing::debug!("Not caching {} for inactive tutorial", lesson_path);
                }
            }
            Err(e) => tracing::warn!("Content fetch for {} failed: {}", lesson_path, e),
        }

        result
    }

    /// Drop all cached lessons
    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.entries.clear();
        cache.tutorial_id = None;
    }

    /// Number of cached lessons
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
