// TUI application state
//
// App owns the navigation controller and turns its effects into IO: fetches
// and diagram compiles run as spawned tasks and report back over one mpsc
// channel, so every state change happens on the UI task in the order the
// event loop sees it.

use super::components::{AddressEditor, ContentPanel, LogsPanel, SidebarPanel, Toast};
use super::scroll::FocusablePanel;
use super::traits::{Handled, Interactive};
use crate::api::{Backend, FetchError};
use crate::browser::model::{LessonContent, TutorialStructure};
use crate::browser::{
    ContentRepository, Effect, FadeTiming, NavigationController, PaneView, Route,
    SelectionOrigin, StructureRepository,
};
use crate::config::Config;
use crate::logging::LogBuffer;
use crate::render::{
    BlockRenderer, DiagramId, DiagramJob, DiagramRenderer, DiagramSyntaxError, Graphic,
    RenderedDocument, ResizeRegistry,
};
use crate::theme::{Theme, ThemeConfig};
use crossterm::event::KeyEvent;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Results delivered back to the UI task
#[derive(Debug)]
pub enum AppMessage {
    Structure {
        generation: u64,
        result: Result<Arc<TutorialStructure>, FetchError>,
    },
    Content {
        generation: u64,
        result: Result<LessonContent, FetchError>,
    },
    Diagram {
        id: DiagramId,
        width: usize,
        result: Result<Graphic, DiagramSyntaxError>,
    },
}

const CHANNEL_CAPACITY: usize = 64;

/// Main application state for the TUI
pub struct App {
    pub nav: NavigationController,
    structures: Arc<StructureRepository>,
    contents: Arc<ContentRepository>,
    /// Tutorial whose lessons the content cache holds
    active_tutorial: String,
    blocks: BlockRenderer,
    diagrams: DiagramRenderer,
    registry: ResizeRegistry,

    /// Rendered form of the lesson the pane is showing
    pub(super) document: Option<RenderedDocument>,
    document_revision: Option<u64>,

    pub theme: Theme,
    pub log_buffer: LogBuffer,

    pub sidebar: SidebarPanel,
    pub content_panel: ContentPanel,
    pub logs_panel: LogsPanel,
    pub show_logs: bool,
    pub focused: FocusablePanel,

    /// Address being typed, when the address bar is in edit mode
    pub editor: Option<AddressEditor>,
    pub toast: Option<Toast>,
    pub should_quit: bool,

    tx: mpsc::Sender<AppMessage>,
}

impl App {
    pub fn new(
        config: &Config,
        route: Route,
        backend: Arc<dyn Backend>,
        log_buffer: LogBuffer,
    ) -> (Self, mpsc::Receiver<AppMessage>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let timing = FadeTiming {
            fade_out: config.transition.fade_out(),
            fade_in: config.transition.fade_in(),
        };
        let theme = Theme::by_name_with_config(
            &config.theme,
            &ThemeConfig {
                use_theme_background: config.use_theme_background,
            },
        );

        let active_tutorial = route.tutorial_id.clone();
        let app = Self {
            nav: NavigationController::new(route, timing),
            structures: Arc::new(StructureRepository::new(backend.clone())),
            contents: Arc::new(ContentRepository::new(backend)),
            active_tutorial,
            blocks: BlockRenderer::new(config.diagram.tag.clone()),
            diagrams: DiagramRenderer::new(),
            registry: ResizeRegistry::new(),
            document: None,
            document_revision: None,
            theme,
            log_buffer,
            sidebar: SidebarPanel::new(),
            content_panel: ContentPanel::new(),
            logs_panel: LogsPanel::new(),
            show_logs: false,
            focused: FocusablePanel::default(),
            editor: None,
            toast: None,
            should_quit: false,
            tx,
        };
        (app, rx)
    }

    /// Begin loading the tutorial from the initial route
    pub fn start(&mut self) {
        let effects = self.nav.mount();
        self.execute(effects, Instant::now());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Effects and results
    // ─────────────────────────────────────────────────────────────────────

    /// Carry out controller effects
    fn execute(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            match effect {
                Effect::FetchStructure {
                    generation,
                    tutorial_id,
                } => {
                    if tutorial_id != self.active_tutorial {
                        tracing::debug!("Switching to {}, clearing cached lessons", tutorial_id);
                        self.contents.clear();
                        self.active_tutorial = tutorial_id.clone();
                    }

                    let repo = self.structures.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = repo.fetch_structure(&tutorial_id).await;
                        let _ = tx.send(AppMessage::Structure { generation, result }).await;
                    });
                }
                Effect::FetchContent {
                    generation,
                    tutorial_id,
                    path,
                } => {
                    // Cache hits apply in this turn, with no task or channel hop
                    if let Some(hit) = self.contents.cached(&tutorial_id, &path) {
                        tracing::trace!("Serving {} from cache", path);
                        self.nav.content_loaded(generation, Ok(hit), now);
                        continue;
                    }

                    let repo = self.contents.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = repo.fetch_content(&tutorial_id, &path).await;
                        let _ = tx.send(AppMessage::Content { generation, result }).await;
                    });
                }
            }
        }
    }

    fn spawn_diagrams(&self, jobs: Vec<DiagramJob>) {
        for job in jobs {
            let renderer = self.diagrams;
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let (id, width, result) = renderer.run(job).await;
                let _ = tx.send(AppMessage::Diagram { id, width, result }).await;
            });
        }
    }

    pub fn handle_message(&mut self, message: AppMessage, now: Instant) {
        match message {
            AppMessage::Structure { generation, result } => {
                let effects = self.nav.structure_loaded(generation, result, now);
                self.execute(effects, now);
            }
            AppMessage::Content { generation, result } => {
                self.nav.content_loaded(generation, result, now);
            }
            AppMessage::Diagram { id, width, result } => {
                let applied = self
                    .document
                    .as_mut()
                    .is_some_and(|document| document.apply(id, width, result));
                if !applied {
                    tracing::debug!("Dropping stale result for {} at width {}", id, width);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Per-frame
    // ─────────────────────────────────────────────────────────────────────

    /// Advance animations and keep the rendered document in step (before each draw)
    pub fn prepare(&mut self, now: Instant, text_width: usize) {
        self.nav.tick(now);
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
        self.sync_document(now, text_width);
    }

    fn sync_document(&mut self, now: Instant, width: usize) {
        let (content, revision) = match self.nav.display(now) {
            PaneView::Content {
                content, revision, ..
            } => (content, revision),
            PaneView::Empty | PaneView::Loading => {
                // Dropping the document unmounts its diagrams
                self.document = None;
                self.document_revision = None;
                return;
            }
        };

        if self.document_revision == Some(revision) {
            let resized = match self.document.as_mut() {
                Some(document) if document.width() != width => {
                    document.relayout(width, &self.theme);
                    true
                }
                _ => false,
            };
            if resized {
                tracing::debug!("Content width now {}, recompiling diagrams", width);
                let jobs = self.registry.on_resize(width);
                self.spawn_diagrams(jobs);
            }
            return;
        }

        let (document, jobs) = self
            .blocks
            .render(content, width, &self.theme, &self.registry);
        self.document = Some(document);
        self.document_revision = Some(revision);
        self.spawn_diagrams(jobs);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation actions
    // ─────────────────────────────────────────────────────────────────────

    pub fn select_lesson(&mut self, path: &str) {
        let now = Instant::now();
        let effects = self.nav.select(path, SelectionOrigin::Sidebar, now);
        self.execute(effects, now);
    }

    pub fn next_lesson(&mut self) {
        let now = Instant::now();
        let effects = self.nav.select_next(now);
        self.execute(effects, now);
    }

    pub fn previous_lesson(&mut self) {
        let now = Instant::now();
        let effects = self.nav.select_previous(now);
        self.execute(effects, now);
    }

    pub fn back(&mut self) {
        let now = Instant::now();
        let effects = self.nav.back(now);
        self.execute(effects, now);
    }

    pub fn forward(&mut self) {
        let now = Instant::now();
        let effects = self.nav.forward(now);
        self.execute(effects, now);
    }

    pub fn reload(&mut self) {
        let now = Instant::now();
        let effects = self.nav.reload(now);
        if effects.is_empty() {
            self.toast = Some(Toast::info("Nothing to reload", now));
        }
        self.execute(effects, now);
    }

    /// Shareable address of the current lesson
    pub fn deep_link(&self) -> String {
        self.nav.address().current().to_address()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Address editing
    // ─────────────────────────────────────────────────────────────────────

    pub fn is_editing_address(&self) -> bool {
        self.editor.is_some()
    }

    pub fn open_address_editor(&mut self) {
        self.editor = Some(AddressEditor::new(&self.deep_link()));
    }

    /// Navigate to a typed address
    pub fn submit_address(&mut self, address: &str) {
        self.editor = None;
        let now = Instant::now();
        match self.nav.navigate_to(address, now) {
            Ok(effects) => self.execute(effects, now),
            Err(e) => {
                tracing::warn!("Ignoring address {}: {}", address, e);
                self.toast = Some(Toast::error(e.to_string(), now));
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Focus and panels
    // ─────────────────────────────────────────────────────────────────────

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if !self.show_logs && self.focused == FocusablePanel::Logs {
            self.focused = FocusablePanel::Content;
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next(self.show_logs);
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev(self.show_logs);
    }

    pub fn focus_hint(&self) -> Option<&'static str> {
        match self.focused {
            FocusablePanel::Sidebar => self.sidebar.focus_hint(),
            FocusablePanel::Content => self.content_panel.focus_hint(),
            FocusablePanel::Logs => self.logs_panel.focus_hint(),
        }
    }

    /// Route a key to the focused panel
    pub fn dispatch_to_focused(&mut self, key: KeyEvent) -> Handled {
        let handled = match self.focused {
            FocusablePanel::Sidebar => self.sidebar.handle_key(key),
            FocusablePanel::Content => self.content_panel.handle_key(key),
            FocusablePanel::Logs => self.logs_panel.handle_key(key),
        };
        if let Some(path) = self.sidebar.take_activated() {
            self.select_lesson(&path);
            self.focused = FocusablePanel::Content;
        }
        handled
    }
}
