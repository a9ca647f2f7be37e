//! Diagram renderer: compiles diagram source text into terminal graphics
//!
//! Settings are process-wide and set once via [`initialize`] before the first
//! compile. Each mounted diagram gets a unique [`DiagramId`] so concurrent
//! compiles on one page never collide, and holds a [`ResizeSubscription`]
//! that keeps it registered for recompilation until the block is dropped.

mod layout;
mod parser;

use crate::config::{DiagramSettings, GlyphStyle};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use thiserror::Error;

pub use layout::{Graphic, Ink};

// ─────────────────────────────────────────────────────────────────────────────
// Process-wide settings
// ─────────────────────────────────────────────────────────────────────────────

/// Renderer settings fixed for the life of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramConfig {
    pub glyphs: GlyphStyle,
}

impl From<&DiagramSettings> for DiagramConfig {
    fn from(settings: &DiagramSettings) -> Self {
        Self {
            glyphs: settings.glyphs,
        }
    }
}

static SETTINGS: OnceLock<DiagramConfig> = OnceLock::new();
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Apply renderer settings once at startup
///
/// Returns false (and changes nothing) when settings were already applied.
pub fn initialize(config: DiagramConfig) -> bool {
    let applied = SETTINGS.set(config).is_ok();
    if applied {
        tracing::debug!("Diagram renderer initialized");
    } else {
        tracing::debug!("Diagram renderer already initialized, ignoring new settings");
    }
    applied
}

/// Settings in effect (defaults if nothing was initialized)
fn settings() -> &'static DiagramConfig {
    SETTINGS.get_or_init(DiagramConfig::default)
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors and identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Malformed diagram source, local to one block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", line_prefix(.line), .message)]
pub struct DiagramSyntaxError {
    /// 1-based source line, when the error points at one
    pub line: Option<usize>,
    pub message: String,
}

impl DiagramSyntaxError {
    pub fn new(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self::new(Some(line), message)
    }
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|n| format!("line {}: ", n)).unwrap_or_default()
}

/// Renderer-unique identifier of one mounted diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagramId(u64);

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram-{}", self.0)
    }
}

/// A compile request for one mounted diagram at one width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramJob {
    pub id: DiagramId,
    pub source: String,
    pub width: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to the process-wide diagram renderer
#[derive(Debug, Clone, Copy)]
pub struct DiagramRenderer {
    config: &'static DiagramConfig,
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramRenderer {
    pub fn new() -> Self {
        Self { config: settings() }
    }

    /// Allocate an identifier for a newly mounted diagram
    pub fn next_id() -> DiagramId {
        DiagramId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Compile diagram source laid out for `width` columns
    ///
    /// Pure with respect to renderer state: identical source and width give
    /// identical graphics.
    pub async fn compile(&self, source: &str, width: usize) -> Result<Graphic, DiagramSyntaxError> {
        // Let other UI work run between diagrams on a busy page
        tokio::task::yield_now().await;
        self.compile_now(source, width)
    }

    /// Synchronous core of [`compile`](Self::compile)
    pub fn compile_now(&self, source: &str, width: usize) -> Result<Graphic, DiagramSyntaxError> {
        let diagram = parser::parse(source)?;
        Ok(layout::render(&diagram, width, self.config.glyphs))
    }

    /// Run a job, tagging the result with the job's id and width
    pub async fn run(
        self,
        job: DiagramJob,
    ) -> (DiagramId, usize, Result<Graphic, DiagramSyntaxError>) {
        let result = self.compile(&job.source, job.width).await;
        if let Err(e) = &result {
            tracing::debug!(id = %job.id, "Diagram failed to compile: {}", e);
        }
        (job.id, job.width, result)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resize subscriptions
// ─────────────────────────────────────────────────────────────────────────────

type Mounted = Mutex<BTreeMap<DiagramId, String>>;

/// Diagrams currently mounted and interested in viewport changes
#[derive(Debug, Clone, Default)]
pub struct ResizeRegistry {
    mounted: Arc<Mounted>,
}

/// Registration guard; dropping it unmounts the diagram
#[derive(Debug)]
pub struct ResizeSubscription {
    id: DiagramId,
    registry: Weak<Mounted>,
}

impl ResizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mounted diagram for recompilation on resize
    pub fn subscribe(&self, id: DiagramId, source: String) -> ResizeSubscription {
        self.mounted.lock().unwrap().insert(id, source);
        ResizeSubscription {
            id,
            registry: Arc::downgrade(&self.mounted),
        }
    }

    /// Recompile jobs for every mounted diagram at the new width
    pub fn on_resize(&self, width: usize) -> Vec<DiagramJob> {
        self.mounted
            .lock()
            .unwrap()
            .iter()
            .map(|(id, source)| DiagramJob {
                id: *id,
                source: source.clone(),
                width,
            })
            .collect()
    }

    /// Number of mounted diagrams
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.mounted.lock().unwrap().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResizeSubscription {
    pub fn id(&self) -> DiagramId {
        self.id
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(mounted) = self.registry.upgrade() {
            if let Ok(mut mounted) = mounted.lock() {
                mounted.remove(&self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW: &str = "graph TD\n  A[Request] --> B{Cached?}\n  B -->|yes| C[Serve]\n  B -->|no| D[Fetch]";

    #[test]
    fn test_reinitialize_is_noop() {
        initialize(DiagramConfig::default());
        let changed = initialize(DiagramConfig {
            glyphs: GlyphStyle::Ascii,
        });

        assert!(!changed);
        assert_eq!(settings().glyphs, GlyphStyle::Unicode);
    }

    #[tokio::test]
    async fn test_compile_is_idempotent() {
        let renderer = DiagramRenderer::new();

        let first = renderer.compile(FLOW, 80).await.unwrap();
        let second = renderer.compile(FLOW, 80).await.unwrap();

        assert_eq!(first, second);
        assert!(first.to_text().contains("Request"));
    }

    #[tokio::test]
    async fn test_concurrent_compiles_do_not_interfere() {
        let renderer = DiagramRenderer::new();
        let other = "graph LR\n  X --> Y";

        let (a, b, c) = tokio::join!(
            renderer.compile(FLOW, 80),
            renderer.compile(other, 80),
            renderer.compile(FLOW, 80)
        );

        assert_eq!(a.unwrap(), c.unwrap());
        assert!(b.unwrap().to_text().contains('X'));
    }

    #[tokio::test]
    async fn test_syntax_error_carries_line() {
        let renderer = DiagramRenderer::new();
        let err = renderer
            .compile("graph TD\n  A --> B\n  C -->", 80)
            .await
            .unwrap_err();

        assert_eq!(err.line, Some(3));
        assert!(err.to_string().starts_with("line 3: "));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = DiagramRenderer::next_id();
        let b = DiagramRenderer::next_id();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("diagram-"));
    }

    #[test]
    fn test_subscription_drop_deregisters() {
        let registry = ResizeRegistry::new();
        let first = registry.subscribe(DiagramRenderer::next_id(), "graph TD\nA-->B".into());
        let second = registry.subscribe(DiagramRenderer::next_id(), "graph LR\nC-->D".into());
        assert_eq!(registry.len(), 2);

        drop(first);
        let jobs = registry.on_resize(40);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, second.id());
        assert_eq!(jobs[0].width, 40);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry = ResizeRegistry::new();
        let sub = registry.subscribe(DiagramRenderer::next_id(), "graph TD\nA".into());
        drop(registry);
        drop(sub);
    }

    #[tokio::test]
    async fn test_run_tags_result() {
        let id = DiagramRenderer::next_id();
        let job = DiagramJob {
            id,
            source: "sequenceDiagram\n  Alice->>Bob: hi".into(),
            width: 60,
        };

        let (got_id, width, result) = DiagramRenderer::new().run(job).await;

        assert_eq!(got_id, id);
        assert_eq!(width, 60);
        assert!(result.unwrap().to_text().contains("hi"));
    }
}
