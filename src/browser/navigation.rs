//! Navigation controller
//!
//! Owns the selected lesson and keeps it consistent with the address bar and
//! the content pane. It never performs IO: every input returns a list of
//! [`Effect`]s for the event loop to execute, and fetch results come back
//! through [`NavigationController::structure_loaded`] and
//! [`NavigationController::content_loaded`].
//!
//! # Ordering
//!
//! Every content fetch carries the generation that was current when it was
//! issued. A result is applied only if its generation is still the latest,
//! so with rapid navigation the last selection always wins and earlier
//! responses are dropped. Structure fetches use their own counter, bumped on
//! every tutorial load.
//!
//! # Address synchronization
//!
//! Sidebar selections push the lesson's deep link onto the address bar.
//! Selections that came from the address (typed, back/forward, deep link at
//! startup) and the default first-lesson selection leave the address alone.

use super::address::{AddressBar, Route, RouteError};
use super::model::{Lesson, LessonContent, TutorialStructure};
use super::transition::{FadeTiming, PaneView, TransitionCoordinator, TransitionPhase};
use crate::api::FetchError;
use std::sync::Arc;
use std::time::Instant;

/// Work the event loop must carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchStructure {
        generation: u64,
        tutorial_id: String,
    },
    FetchContent {
        generation: u64,
        tutorial_id: String,
        path: String,
    },
}

/// Where a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// The reader picked a lesson in the sidebar (or stepped next/previous)
    Sidebar,
    /// The address changed first
    Address,
    /// First lesson picked after the structure loaded
    Default,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StructureState {
    #[default]
    Uninitialized,
    Loading,
    Ready(Arc<TutorialStructure>),
    Failed(FetchError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentState {
    #[default]
    NoSelection,
    Loading {
        path: String,
    },
    Ready {
        path: String,
    },
    Failed {
        path: String,
        error: FetchError,
    },
}

pub struct NavigationController {
    tutorial_id: String,
    address: AddressBar,
    structure: StructureState,
    structure_generation: u64,
    selected_path: Option<String>,
    content: ContentState,
    generation: u64,
    transition: TransitionCoordinator,
}

impl NavigationController {
    /// Controller for the tutorial named by `route`; call [`Self::mount`] next
    pub fn new(route: Route, timing: FadeTiming) -> Self {
        Self {
            tutorial_id: route.tutorial_id.clone(),
            address: AddressBar::new(route),
            structure: StructureState::Uninitialized,
            structure_generation: 0,
            selected_path: None,
            content: ContentState::NoSelection,
            generation: 0,
            transition: TransitionCoordinator::new(timing),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn tutorial_id(&self) -> &str {
        &self.tutorial_id
    }

    pub fn address(&self) -> &AddressBar {
        &self.address
    }

    pub fn structure(&self) -> &StructureState {
        &self.structure
    }

    /// Loaded structure, if any
    pub fn tree(&self) -> Option<&TutorialStructure> {
        match &self.structure {
            StructureState::Ready(structure) => Some(structure.as_ref()),
            _ => None,
        }
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected_path.as_deref()
    }

    /// Selected lesson as listed in the structure
    pub fn selected_lesson(&self) -> Option<&Lesson> {
        let path = self.selected_path.as_deref()?;
        self.tree()?.find_lesson(path)
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> TransitionPhase {
        self.transition.phase()
    }

    pub fn display(&self, now: Instant) -> PaneView<'_> {
        self.transition.display(now)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Start loading the current tutorial
    pub fn mount(&mut self) -> Vec<Effect> {
        self.structure_generation += 1;
        self.structure = StructureState::Loading;
        tracing::info!("Loading tutorial {}", self.tutorial_id);

        vec![Effect::FetchStructure {
            generation: self.structure_generation,
            tutorial_id: self.tutorial_id.clone(),
        }]
    }

    /// Apply a structure fetch result
    pub fn structure_loaded(
        &mut self,
        generation: u64,
        result: Result<Arc<TutorialStructure>, FetchError>,
        now: Instant,
    ) -> Vec<Effect> {
        if generation != self.structure_generation {
            tracing::debug!(
                "Dropping stale structure result (generation {}, current {})",
                generation,
                self.structure_generation
            );
            return Vec::new();
        }

        let structure = match result {
            Ok(structure) => structure,
            Err(e) => {
                self.structure = StructureState::Failed(e);
                return Vec::new();
            }
        };

        self.structure = StructureState::Ready(structure.clone());

        if let Some(path) = self.address.current().lesson_path.clone() {
            if structure.find_lesson(&path).is_none() {
                tracing::warn!("Lesson {} from the address is not in the structure", path);
            }
            return self.select(&path, SelectionOrigin::Address, now);
        }

        match structure.first_lesson() {
            Some(first) => {
                let path = first.path.clone();
                self.select(&path, SelectionOrigin::Default, now)
            }
            None => {
                tracing::info!("Tutorial {} has no lessons", self.tutorial_id);
                Vec::new()
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a lesson
    ///
    /// Selecting the lesson that is already selected does nothing.
    pub fn select(&mut self, path: &str, origin: SelectionOrigin, now: Instant) -> Vec<Effect> {
        if self.selected_path.as_deref() == Some(path) {
            tracing::trace!("{} already selected", path);
            return Vec::new();
        }

        self.generation += 1;
        self.selected_path = Some(path.to_string());
        self.content = ContentState::Loading {
            path: path.to_string(),
        };
        self.transition.begin(now);

        if origin == SelectionOrigin::Sidebar {
            let route = Route::lesson(self.tutorial_id.clone(), path);
            self.address.push(route);
        }

        tracing::debug!(
            "Selected {} ({:?}, generation {})",
            path,
            origin,
            self.generation
        );

        vec![self.fetch_selected(path)]
    }

    /// Step to the lesson after the selected one
    pub fn select_next(&mut self, now: Instant) -> Vec<Effect> {
        let next = self
            .selected_path
            .as_deref()
            .and_then(|path| self.tree()?.next_lesson(path))
            .map(|lesson| lesson.path.clone());
        match next {
            Some(path) => self.select(&path, SelectionOrigin::Sidebar, now),
            None => Vec::new(),
        }
    }

    /// Step to the lesson before the selected one
    pub fn select_previous(&mut self, now: Instant) -> Vec<Effect> {
        let previous = self
            .selected_path
            .as_deref()
            .and_then(|path| self.tree()?.previous_lesson(path))
            .map(|lesson| lesson.path.clone());
        match previous {
            Some(path) => self.select(&path, SelectionOrigin::Sidebar, now),
            None => Vec::new(),
        }
    }

    /// Apply a content fetch result
    ///
    /// Returns false when the result was stale and dropped.
    pub fn content_loaded(
        &mut self,
        generation: u64,
        result: Result<LessonContent, FetchError>,
        now: Instant,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale content result (generation {}, current {})",
                generation,
                self.generation
            );
            return false;
        }

        let path = match &self.content {
            ContentState::Loading { path } => path.clone(),
            other => {
                tracing::debug!("Content result while not loading ({:?})", other);
                return false;
            }
        };

        match result {
            Ok(content) => {
                self.content = ContentState::Ready { path };
                self.transition.arrive(content, now);
            }
            Err(error) => {
                tracing::warn!("Failed to load {}: {}", path, error);
                self.content = ContentState::Failed { path, error };
                self.transition.abort();
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Address
    // ------------------------------------------------------------------

    /// Navigate to an address typed by the reader
    pub fn navigate_to(&mut self, address: &str, now: Instant) -> Result<Vec<Effect>, RouteError> {
        let route = Route::parse(address)?;
        self.address.push(route.clone());
        Ok(self.follow_address(route, now))
    }

    /// Go back in address history
    pub fn back(&mut self, now: Instant) -> Vec<Effect> {
        match self.address.back().cloned() {
            Some(route) => self.follow_address(route, now),
            None => Vec::new(),
        }
    }

    /// Go forward in address history
    pub fn forward(&mut self, now: Instant) -> Vec<Effect> {
        match self.address.forward().cloned() {
            Some(route) => self.follow_address(route, now),
            None => Vec::new(),
        }
    }

    /// Bring the selection in line with an address already on the bar
    fn follow_address(&mut self, route: Route, now: Instant) -> Vec<Effect> {
        if route.tutorial_id != self.tutorial_id {
            return self.switch_tutorial(route.tutorial_id);
        }

        match (&self.structure, route.lesson_path) {
            (StructureState::Ready(_), Some(path)) => {
                self.select(&path, SelectionOrigin::Address, now)
            }
            (StructureState::Ready(structure), None) => {
                // Root route means the default lesson
                match structure.first_lesson().map(|l| l.path.clone()) {
                    Some(path) => self.select(&path, SelectionOrigin::Default, now),
                    None => Vec::new(),
                }
            }
            // Picked up from the address once the structure arrives
            _ => Vec::new(),
        }
    }

    fn switch_tutorial(&mut self, tutorial_id: String) -> Vec<Effect> {
        tracing::info!("Switching tutorial {} -> {}", self.tutorial_id, tutorial_id);
        self.tutorial_id = tutorial_id;
        self.selected_path = None;
        self.content = ContentState::NoSelection;
        // Outstanding content results belong to the old tutorial
        self.generation += 1;
        self.transition.reset();
        self.mount()
    }

    // ------------------------------------------------------------------
    // Retry
    // ------------------------------------------------------------------

    /// User-initiated retry of whatever failed
    pub fn reload(&mut self, now: Instant) -> Vec<Effect> {
        match &self.structure {
            StructureState::Failed(_) | StructureState::Uninitialized => return self.mount(),
            StructureState::Loading => return Vec::new(),
            StructureState::Ready(_) => {}
        }

        let path = match &self.content {
            ContentState::Failed { path, .. } => path.clone(),
            _ => return Vec::new(),
        };

        tracing::info!("Retrying {}", path);
        self.generation += 1;
        self.content = ContentState::Loading { path: path.clone() };
        self.transition.begin(now);
        vec![self.fetch_selected(&path)]
    }

    /// Advance the fade animation
    pub fn tick(&mut self, now: Instant) -> bool {
        self.transition.tick(now)
    }

    fn fetch_selected(&self, path: &str) -> Effect {
        Effect::FetchContent {
            generation: self.generation,
            tutorial_id: self.tutorial_id.clone(),
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::model::fixtures::{lesson, two_chapters};
    use crate::browser::model::Chapter;
    use std::time::Duration;

    const TIMING: FadeTiming = FadeTiming {
        fade_out: Duration::from_millis(100),
        fade_in: Duration::from_millis(100),
    };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn body(path: &str) -> String {
        format!("# {}", path)
    }

    fn ok(path: &str) -> Result<LessonContent, FetchError> {
        Ok(LessonContent {
            path: path.to_string(),
            body: body(path),
        })
    }

    fn shown(nav: &NavigationController, now: Instant) -> Option<String> {
        match nav.display(now) {
            PaneView::Content { content, .. } => Some(content.body.clone()),
            _ => None,
        }
    }

    fn content_fetch(effects: &[Effect]) -> (u64, String) {
        match effects {
            [Effect::FetchContent {
                generation, path, ..
            }] => (*generation, path.clone()),
            other => panic!("expected one content fetch, got {:?}", other),
        }
    }

    /// Controller with the structure loaded from `route`
    fn loaded(
        route: Route,
        structure: TutorialStructure,
        now: Instant,
    ) -> (NavigationController, Vec<Effect>) {
        let mut nav = NavigationController::new(route, TIMING);
        let effects = nav.mount();
        let generation = match effects.as_slice() {
            [Effect::FetchStructure { generation, .. }] => *generation,
            other => panic!("expected structure fetch, got {:?}", other),
        };
        let effects = nav.structure_loaded(generation, Ok(Arc::new(structure)), now);
        (nav, effects)
    }

    /// Controller showing the Welcome lesson, fade finished
    fn showing_welcome(t0: Instant) -> NavigationController {
        let (mut nav, effects) = loaded(Route::root("repo"), two_chapters(), t0);
        let (generation, path) = content_fetch(&effects);
        assert!(nav.content_loaded(generation, ok(&path), t0));
        nav.tick(t0 + ms(100));
        assert_eq!(nav.phase(), TransitionPhase::Idle);
        nav
    }

    #[test]
    fn test_mount_enters_structure_loading() {
        let mut nav = NavigationController::new(Route::root("repo"), TIMING);
        assert_eq!(nav.structure(), &StructureState::Uninitialized);

        let effects = nav.mount();
        assert_eq!(nav.structure(), &StructureState::Loading);
        assert_eq!(
            effects,
            vec![Effect::FetchStructure {
                generation: 1,
                tutorial_id: "repo".into()
            }]
        );
    }

    #[test]
    fn test_root_route_auto_selects_first_lesson() {
        let t0 = Instant::now();
        let (mut nav, effects) = loaded(Route::root("repo"), two_chapters(), t0);

        let (generation, path) = content_fetch(&effects);
        assert_eq!(path, "01_welcome.md");
        assert_eq!(nav.selected_path(), Some("01_welcome.md"));

        // Default selection does not rewrite the address
        assert_eq!(nav.address().current(), &Route::root("repo"));
        assert!(!nav.address().can_go_back());

        assert!(nav.content_loaded(generation, ok(&path), t0));
        assert_eq!(shown(&nav, t0), Some(body("01_welcome.md")));
        assert_eq!(
            nav.content(),
            &ContentState::Ready {
                path: "01_welcome.md".into()
            }
        );
    }

    #[test]
    fn test_deep_link_selects_lesson_without_rewrite() {
        let t0 = Instant::now();
        let (nav, effects) = loaded(
            Route::lesson("repo", "02_engine.md"),
            two_chapters(),
            t0,
        );
        let (_, path) = content_fetch(&effects);
        assert_eq!(path, "02_engine.md");
        assert_eq!(nav.address().current(), &Route::lesson("repo", "02_engine.md"));
        assert!(!nav.address().can_go_back());
    }

    #[test]
    fn test_deep_link_to_unknown_lesson_still_fetches() {
        let t0 = Instant::now();
        let (nav, effects) = loaded(Route::lesson("repo", "99_gone.md"), two_chapters(), t0);
        let (_, path) = content_fetch(&effects);
        assert_eq!(path, "99_gone.md");
        assert!(nav.selected_lesson().is_none());
    }

    #[test]
    fn test_empty_structure_selects_nothing() {
        let t0 = Instant::now();
        let structure = TutorialStructure {
            chapters: vec![Chapter {
                title: "Empty".into(),
                lessons: vec![],
            }],
        };
        let (nav, effects) = loaded(Route::root("repo"), structure, t0);
        assert!(effects.is_empty());
        assert_eq!(nav.content(), &ContentState::NoSelection);
        assert_eq!(nav.display(t0), PaneView::Empty);
    }

    #[test]
    fn test_structure_failure_then_retry() {
        let t0 = Instant::now();
        let mut nav = NavigationController::new(Route::root("repo"), TIMING);
        nav.mount();

        let effects = nav.structure_loaded(
            1,
            Err(FetchError::NotFound("Output not found".into())),
            t0,
        );
        assert!(effects.is_empty());
        assert!(matches!(
            nav.structure(),
            StructureState::Failed(FetchError::NotFound(_))
        ));

        let effects = nav.reload(t0);
        assert_eq!(
            effects,
            vec![Effect::FetchStructure {
                generation: 2,
                tutorial_id: "repo".into()
            }]
        );

        // The first attempt's result is stale now
        assert!(nav
            .structure_loaded(1, Ok(Arc::new(two_chapters())), t0)
            .is_empty());
        assert_eq!(nav.structure(), &StructureState::Loading);

        let effects = nav.structure_loaded(2, Ok(Arc::new(two_chapters())), t0);
        assert_eq!(content_fetch(&effects).1, "01_welcome.md");
    }

    #[test]
    fn test_sidebar_selection_pushes_address_and_fades() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);

        let t1 = t0 + ms(1000);
        let effects = nav.select("02_engine.md", SelectionOrigin::Sidebar, t1);
        let (generation, path) = content_fetch(&effects);
        assert_eq!(path, "02_engine.md");
        assert_eq!(
            nav.address().current().to_address(),
            "/output/repo/02_engine.md"
        );

        // Welcome stays on screen while the fetch is outstanding
        assert_eq!(nav.phase(), TransitionPhase::FadingOut);
        assert_eq!(shown(&nav, t1 + ms(50)), Some(body("01_welcome.md")));

        assert!(nav.content_loaded(generation, ok(&path), t1 + ms(150)));
        assert_eq!(nav.phase(), TransitionPhase::FadingIn);
        assert_eq!(shown(&nav, t1 + ms(150)), Some(body("02_engine.md")));

        nav.tick(t1 + ms(300));
        assert_eq!(nav.phase(), TransitionPhase::Idle);
        assert_eq!(nav.selected_lesson().map(|l| l.title.as_str()), Some("Engine"));
    }

    #[test]
    fn test_reselecting_current_lesson_is_noop() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);
        let generation = nav.generation();

        let effects = nav.select("01_welcome.md", SelectionOrigin::Sidebar, t0 + ms(500));
        assert!(effects.is_empty());
        assert_eq!(nav.generation(), generation);
        assert_eq!(nav.phase(), TransitionPhase::Idle);
        assert!(!nav.address().can_go_back());
    }

    #[test]
    fn test_rapid_navigation_last_wins() {
        let t0 = Instant::now();
        let mut structure = two_chapters();
        structure.chapters[1].lessons.extend([
            lesson("Three", "03.md"),
            lesson("Four", "04.md"),
            lesson("Five", "05.md"),
        ]);
        let (mut nav, effects) = loaded(Route::root("repo"), structure, t0);
        let (g0, p0) = content_fetch(&effects);
        nav.content_loaded(g0, ok(&p0), t0);

        let paths = ["02_engine.md", "03.md", "04.md", "05.md"];
        let fetches: Vec<(u64, String)> = paths
            .iter()
            .map(|p| content_fetch(&nav.select(p, SelectionOrigin::Sidebar, t0 + ms(500))))
            .collect();

        // Resolve in reverse issue order: only the last one may apply
        let t1 = t0 + ms(700);
        for (generation, path) in fetches.iter().rev() {
            let applied = nav.content_loaded(*generation, ok(path), t1);
            assert_eq!(applied, path == "05.md");
        }
        nav.tick(t1 + ms(200));

        assert_eq!(shown(&nav, t1 + ms(200)), Some(body("05.md")));
        assert_eq!(nav.selected_path(), Some("05.md"));
    }

    #[test]
    fn test_content_failure_keeps_previous_body() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);

        let t1 = t0 + ms(1000);
        let effects = nav.select("02_engine.md", SelectionOrigin::Sidebar, t1);
        let (generation, _) = content_fetch(&effects);
        assert!(nav.content_loaded(
            generation,
            Err(FetchError::Network("connection reset".into())),
            t1 + ms(30)
        ));

        assert_eq!(shown(&nav, t1 + ms(30)), Some(body("01_welcome.md")));
        assert_eq!(nav.phase(), TransitionPhase::Idle);
        match nav.content() {
            ContentState::Failed { path, error } => {
                assert_eq!(path, "02_engine.md");
                assert!(!error.is_not_found());
            }
            other => panic!("expected failure, got {:?}", other),
        }

        // Retry is user-initiated and re-fetches the same path
        let (_, path) = content_fetch(&nav.reload(t1 + ms(40)));
        assert_eq!(path, "02_engine.md");
    }

    #[test]
    fn test_back_and_forward_follow_address_without_pushing() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);
        let (g, p) = content_fetch(&nav.select("02_engine.md", SelectionOrigin::Sidebar, t0));
        nav.content_loaded(g, ok(&p), t0);

        // Back to the root route selects the default lesson
        let effects = nav.back(t0 + ms(10));
        assert_eq!(content_fetch(&effects).1, "01_welcome.md");
        assert_eq!(nav.address().current(), &Route::root("repo"));
        assert!(nav.address().can_go_forward());

        let effects = nav.forward(t0 + ms(20));
        assert_eq!(content_fetch(&effects).1, "02_engine.md");
        assert!(!nav.address().can_go_forward());
        assert!(nav.forward(t0).is_empty());
    }

    #[test]
    fn test_typed_address_selects_lesson() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);

        let effects = nav
            .navigate_to("/output/repo/02_engine.md", t0 + ms(10))
            .unwrap();
        assert_eq!(content_fetch(&effects).1, "02_engine.md");
        assert!(nav.address().can_go_back());

        assert!(nav.navigate_to("/somewhere", t0).is_err());
    }

    #[test]
    fn test_typed_address_for_other_tutorial_switches() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);
        let stale_generation = nav.generation();

        let effects = nav.navigate_to("/output/other", t0).unwrap();
        assert_eq!(
            effects,
            vec![Effect::FetchStructure {
                generation: 2,
                tutorial_id: "other".into()
            }]
        );
        assert_eq!(nav.tutorial_id(), "other");
        assert_eq!(nav.selected_path(), None);
        assert_eq!(nav.display(t0), PaneView::Empty);

        // A late result from the old tutorial is ignored
        assert!(!nav.content_loaded(stale_generation, ok("01_welcome.md"), t0));
    }

    #[test]
    fn test_next_and_previous() {
        let t0 = Instant::now();
        let mut nav = showing_welcome(t0);

        assert_eq!(content_fetch(&nav.select_next(t0)).1, "02_engine.md");
        assert!(nav.select_next(t0).is_empty());
        assert_eq!(content_fetch(&nav.select_previous(t0)).1, "01_welcome.md");
        assert!(nav.address().can_go_back());
    }
}
