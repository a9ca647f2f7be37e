//! Fade transition between lessons
//!
//! When a navigation starts, whatever is on screen is kept as the previous
//! content and faded out. The new lesson may only replace it once the
//! fade-out delay has elapsed; it then fades in and the phase returns to
//! idle. While fading out the previous lesson stays visible. A loading
//! placeholder is shown only when nothing has been displayed yet.
//!
//! The coordinator is driven by the event loop's tick with explicit
//! `Instant`s, so it is deterministic under test.

use super::model::LessonContent;
use std::time::{Duration, Instant};

/// Animation phase of the content pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Idle,
    FadingOut,
    FadingIn,
}

/// Fade durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTiming {
    pub fade_out: Duration,
    pub fade_in: Duration,
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self {
            fade_out: Duration::from_millis(150),
            fade_in: Duration::from_millis(150),
        }
    }
}

/// What the content pane should show right now
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaneView<'a> {
    /// Nothing selected and nothing loading
    Empty,
    /// First load, no prior content to keep on screen
    Loading,
    /// A lesson, with visibility in `0.0..=1.0`
    Content {
        content: &'a LessonContent,
        /// Changes whenever a different lesson body is shown
        revision: u64,
        visibility: f32,
    },
}

#[derive(Debug, Default)]
pub struct TransitionCoordinator {
    timing: FadeTiming,
    phase: TransitionPhase,
    phase_started: Option<Instant>,
    rendered: Option<LessonContent>,
    previous: Option<LessonContent>,
    pending: Option<LessonContent>,
    revision: u64,
    loading: bool,
}

impl TransitionCoordinator {
    pub fn new(timing: FadeTiming) -> Self {
        Self {
            timing,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn rendered(&self) -> Option<&LessonContent> {
        self.rendered.as_ref()
    }

    #[cfg(test)]
    pub fn previous(&self) -> Option<&LessonContent> {
        self.previous.as_ref()
    }

    /// A navigation started: keep the current content and fade it out
    pub fn begin(&mut self, now: Instant) {
        self.pending = None;
        self.loading = true;

        if self.phase == TransitionPhase::FadingOut {
            // Superseded navigation: keep fading the same content
            return;
        }

        self.previous = self.rendered.clone();
        if self.previous.is_some() {
            self.enter(TransitionPhase::FadingOut, now);
        } else {
            self.enter(TransitionPhase::Idle, now);
        }
    }

    /// The next lesson arrived; it is shown once the fade-out allows
    pub fn arrive(&mut self, content: LessonContent, now: Instant) {
        self.pending = Some(content);
        self.tick(now);
    }

    /// The navigation failed: stop the fade and keep what was shown
    pub fn abort(&mut self) {
        self.pending = None;
        self.previous = None;
        self.loading = false;
        self.phase = TransitionPhase::Idle;
        self.phase_started = None;
    }

    /// Forget everything (tutorial switch)
    pub fn reset(&mut self) {
        let timing = self.timing;
        let revision = self.revision;
        *self = Self::new(timing);
        self.revision = revision + 1;
    }

    /// Advance the animation; returns true when the display changed phase
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            TransitionPhase::FadingOut => {
                if self.pending.is_some() && self.elapsed(now) >= self.timing.fade_out {
                    self.swap(now);
                    return true;
                }
                false
            }
            TransitionPhase::FadingIn => {
                if self.elapsed(now) >= self.timing.fade_in {
                    self.enter(TransitionPhase::Idle, now);
                    return true;
                }
                false
            }
            TransitionPhase::Idle => {
                // Nothing was on screen, so there is nothing to fade out
                if self.pending.is_some() {
                    self.swap(now);
                    return true;
                }
                false
            }
        }
    }

    /// Content to draw at `now`
    pub fn display(&self, now: Instant) -> PaneView<'_> {
        match self.phase {
            TransitionPhase::FadingOut => match &self.previous {
                Some(content) => PaneView::Content {
                    content,
                    revision: self.revision,
                    visibility: 1.0 - self.progress(now, self.timing.fade_out),
                },
                None => PaneView::Loading,
            },
            TransitionPhase::FadingIn => match &self.rendered {
                Some(content) => PaneView::Content {
                    content,
                    revision: self.revision,
                    visibility: self.progress(now, self.timing.fade_in),
                },
                None => PaneView::Empty,
            },
            TransitionPhase::Idle => match &self.rendered {
                Some(content) => PaneView::Content {
                    content,
                    revision: self.revision,
                    visibility: 1.0,
                },
                None if self.loading => PaneView::Loading,
                None => PaneView::Empty,
            },
        }
    }

    fn swap(&mut self, now: Instant) {
        self.rendered = self.pending.take();
        self.previous = None;
        self.loading = false;
        self.revision += 1;
        self.enter(TransitionPhase::FadingIn, now);
    }

    fn enter(&mut self, phase: TransitionPhase, now: Instant) {
        self.phase = phase;
        self.phase_started = Some(now);
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.phase_started
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    fn progress(&self, now: Instant, total: Duration) -> f32 {
        if total.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(path: &str, body: &str) -> LessonContent {
        LessonContent {
            path: path.to_string(),
            body: body.to_string(),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn shown_body<'a>(display: PaneView<'a>) -> Option<&'a str> {
        match display {
            PaneView::Content { content, .. } => Some(content.body.as_str()),
            _ => None,
        }
    }

    /// Coordinator already showing `body`
    fn showing(body: &str, t0: Instant) -> TransitionCoordinator {
        let mut t = TransitionCoordinator::new(FadeTiming {
            fade_out: ms(100),
            fade_in: ms(100),
        });
        t.begin(t0);
        t.arrive(content("a.md", body), t0);
        t.tick(t0 + ms(100));
        assert_eq!(t.phase(), TransitionPhase::Idle);
        t
    }

    #[test]
    fn test_first_load_shows_loading_then_content() {
        let t0 = Instant::now();
        let mut t = TransitionCoordinator::default();
        assert_eq!(t.display(t0), PaneView::Empty);

        t.begin(t0);
        assert_eq!(t.display(t0), PaneView::Loading);

        t.arrive(content("a.md", "A"), t0 + ms(5));
        assert_eq!(t.phase(), TransitionPhase::FadingIn);
        assert_eq!(shown_body(t.display(t0 + ms(5))), Some("A"));
    }

    #[test]
    fn test_previous_content_stays_visible_while_fading_out() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);

        let t1 = t0 + ms(500);
        t.begin(t1);
        assert_eq!(t.phase(), TransitionPhase::FadingOut);
        assert_eq!(t.previous().map(|c| c.body.as_str()), Some("Welcome"));
        assert_eq!(shown_body(t.display(t1 + ms(50))), Some("Welcome"));

        // Arrives early: still fading out, still showing the old body
        t.arrive(content("b.md", "Engine"), t1 + ms(20));
        assert_eq!(t.phase(), TransitionPhase::FadingOut);
        assert_eq!(shown_body(t.display(t1 + ms(20))), Some("Welcome"));

        assert!(t.tick(t1 + ms(100)));
        assert_eq!(t.phase(), TransitionPhase::FadingIn);
        assert_eq!(shown_body(t.display(t1 + ms(100))), Some("Engine"));

        assert!(t.tick(t1 + ms(200)));
        assert_eq!(t.phase(), TransitionPhase::Idle);
        assert!(t.previous().is_none());
    }

    #[test]
    fn test_late_arrival_swaps_immediately() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);

        let t1 = t0 + ms(500);
        t.begin(t1);
        assert!(!t.tick(t1 + ms(300)));
        assert_eq!(shown_body(t.display(t1 + ms(300))), Some("Welcome"));

        t.arrive(content("b.md", "Engine"), t1 + ms(400));
        assert_eq!(t.phase(), TransitionPhase::FadingIn);
        assert_eq!(t.rendered().map(|c| c.body.as_str()), Some("Engine"));
    }

    #[test]
    fn test_visibility_fades() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);
        let t1 = t0 + ms(500);
        t.begin(t1);

        match t.display(t1 + ms(50)) {
            PaneView::Content { visibility, .. } => assert!((visibility - 0.5).abs() < 0.01),
            other => panic!("unexpected display: {:?}", other),
        }
    }

    #[test]
    fn test_abort_keeps_rendered_content() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);
        let t1 = t0 + ms(500);

        t.begin(t1);
        t.abort();
        assert_eq!(t.phase(), TransitionPhase::Idle);
        assert_eq!(shown_body(t.display(t1 + ms(10))), Some("Welcome"));
    }

    #[test]
    fn test_superseded_begin_keeps_original_previous() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);
        let t1 = t0 + ms(500);

        t.begin(t1);
        t.arrive(content("b.md", "B"), t1 + ms(10));
        t.begin(t1 + ms(20));
        assert_eq!(t.previous().map(|c| c.body.as_str()), Some("Welcome"));

        // The dropped arrival never shows
        assert!(!t.tick(t1 + ms(150)));
        assert_eq!(shown_body(t.display(t1 + ms(150))), Some("Welcome"));
    }

    #[test]
    fn test_revision_changes_per_swap() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);
        let before = match t.display(t0) {
            PaneView::Content { revision, .. } => revision,
            other => panic!("unexpected display: {:?}", other),
        };

        t.begin(t0 + ms(200));
        t.arrive(content("b.md", "Engine"), t0 + ms(400));
        let after = match t.display(t0 + ms(400)) {
            PaneView::Content { revision, .. } => revision,
            other => panic!("unexpected display: {:?}", other),
        };
        assert_ne!(before, after);
    }

    #[test]
    fn test_reset_forgets_content() {
        let t0 = Instant::now();
        let mut t = showing("Welcome", t0);
        t.reset();
        assert_eq!(t.display(t0), PaneView::Empty);
        assert_eq!(t.phase(), TransitionPhase::Idle);
    }
}
