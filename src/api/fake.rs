//! In-memory backend for tests
//!
//! Counts calls per key and can hold a request until the test releases it,
//! which is how tests control the order in which fetches resolve.

use super::{Backend, FetchError};
use crate::browser::model::TutorialStructure;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeBackend {
    structures: Mutex<HashMap<String, Result<TutorialStructure, FetchError>>>,
    contents: Mutex<HashMap<String, Result<String, FetchError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    structure_calls: Mutex<HashMap<String, usize>>,
    content_calls: Mutex<HashMap<String, usize>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_structure(self, tutorial_id: &str, structure: TutorialStructure) -> Self {
        self.structures
            .lock()
            .unwrap()
            .insert(tutorial_id.to_string(), Ok(structure));
        self
    }

    pub fn with_structure_error(self, tutorial_id: &str, error: FetchError) -> Self {
        self.structures
            .lock()
            .unwrap()
            .insert(tutorial_id.to_string(), Err(error));
        self
    }

    pub fn with_content(self, path: &str, body: &str) -> Self {
        self.set_content(path, Ok(body.to_string()));
        self
    }

    pub fn set_content(&self, path: &str, result: Result<String, FetchError>) {
        self.contents
            .lock()
            .unwrap()
            .insert(path.to_string(), result);
    }

    /// Hold requests for `key` (tutorial id or lesson path) until released
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), notify.clone());
        notify
    }

    pub fn structure_calls(&self, tutorial_id: &str) -> usize {
        *self
            .structure_calls
            .lock()
            .unwrap()
            .get(tutorial_id)
            .unwrap_or(&0)
    }

    pub fn content_calls(&self, path: &str) -> usize {
        *self.content_calls.lock().unwrap().get(path).unwrap_or(&0)
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_structure(&self, tutorial_id: &str) -> Result<TutorialStructure, FetchError> {
        *self
            .structure_calls
            .lock()
            .unwrap()
            .entry(tutorial_id.to_string())
            .or_insert(0) += 1;
        self.wait_gate(tutorial_id).await;

        self.structures
            .lock()
            .unwrap()
            .get(tutorial_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound("Output not found".into())))
    }

    async fn fetch_content(
        &self,
        _tutorial_id: &str,
        lesson_path: &str,
    ) -> Result<String, FetchError> {
        *self
            .content_calls
            .lock()
            .unwrap()
            .entry(lesson_path.to_string())
            .or_insert(0) += 1;
        self.wait_gate(lesson_path).await;

        self.contents
            .lock()
            .unwrap()
            .get(lesson_path)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound("File not found".into())))
    }
}
