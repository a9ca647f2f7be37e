// HTTP backend client
//
// Talks to the tutorial backend:
//   GET {base}/output-structure/{tutorial_id}
//   GET {base}/output-content/{tutorial_id}/{lesson_path}
//
// lesson_path is percent-encoded here, segment by segment, and nowhere else.
// The URL is handed to reqwest as already-encoded text; the url parser keeps
// existing %XX escapes, so nothing is encoded twice.

use super::{Backend, FetchError};
use crate::browser::address::{encode_lesson_path, encode_segment};
use crate::browser::model::TutorialStructure;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Successful content response
#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
}

/// Error body shapes the backend produces (JSON `error`, or `description`
/// from an abort)
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    description: Option<String>,
}

/// reqwest-backed [`Backend`]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the given API base (e.g. `http://localhost:5001/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("HTTP backend at {} (timeout {:?})", base_url, timeout);

        Ok(Self { client, base_url })
    }

    pub fn structure_url(&self, tutorial_id: &str) -> String {
        format!(
            "{}/output-structure/{}",
            self.base_url,
            encode_segment(tutorial_id)
        )
    }

    pub fn content_url(&self, tutorial_id: &str, lesson_path: &str) -> String {
        format!(
            "{}/output-content/{}/{}",
            self.base_url,
            encode_segment(tutorial_id),
            encode_lesson_path(lesson_path)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::debug!("GET {} -> {} ({})", url, status, message);

            return Err(if status == StatusCode::NOT_FOUND {
                FetchError::NotFound(message)
            } else {
                FetchError::Network(format!("{} ({})", message, status.as_u16()))
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to parse response: {}", e)))
    }
}

/// Best human-readable message from an error response
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error
        .or(parsed.description)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_structure(&self, tutorial_id: &str) -> Result<TutorialStructure, FetchError> {
        let url = self.structure_url(tutorial_id);
        self.get_json(&url).await
    }

    async fn fetch_content(
        &self,
        tutorial_id: &str,
        lesson_path: &str,
    ) -> Result<String, FetchError> {
        let url = self.content_url(tutorial_id, lesson_path);
        let response: ContentResponse = self.get_json(&url).await?;
        Ok(response.content)
    }
}
