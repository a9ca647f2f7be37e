//! Structure repository
//!
//! Fetches the chapter/lesson tree for a tutorial. Concurrent callers for the
//! same tutorial share one request. Failures are returned as-is: there is no
//! automatic retry, the caller decides whether to ask again.

use super::inflight::InFlight;
use super::model::TutorialStructure;
use crate::api::{Backend, FetchError};
use futures::FutureExt;
use std::sync::Arc;

pub struct StructureRepository {
    backend: Arc<dyn Backend>,
    inflight: InFlight<String, Arc<TutorialStructure>>,
}

impl StructureRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            inflight: InFlight::new(),
        }
    }

    /// Fetch the structure for `tutorial_id`
    pub async fn fetch_structure(
        &self,
        tutorial_id: &str,
    ) -> Result<Arc<TutorialStructure>, FetchError> {
        let backend = self.backend.clone();
        let id = tutorial_id.to_string();

        let result = self
            .inflight
            .run(tutorial_id.to_string(), move || {
                async move {
                    tracing::debug!("Fetching structure for {}", id);
                    backend.fetch_structure(&id).await.map(Arc::new)
                }
                .boxed()
            })
            .await;

        match &result {
            Ok(structure) => {
                let duplicates = structure.duplicate_paths();
                if !duplicates.is_empty() {
                    tracing::warn!(
                        "Tutorial {} has lessons sharing a path, highlighting is ambiguous: {:?}",
                        tutorial_id,
                        duplicates
                    );
                }
                tracing::info!(
                    "Loaded structure for {}: {} chapters, {} lessons",
                    tutorial_id,
                    structure.chapters.len(),
                    structure.lesson_count()
                );
            }
            Err(e) => tracing::warn!("Structure fetch for {} failed: {}", tutorial_id, e),
        }

        result
    }
}
