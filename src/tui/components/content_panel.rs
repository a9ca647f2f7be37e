//! Content panel component
//!
//! Shows the rendered lesson, faded according to the transition, with any
//! failure surfaced in place: a structure failure replaces the pane with an
//! advisory, a content failure adds an inline error above whatever was on
//! screen before.

use super::scrollbar::render_scrollbar;
use crate::api::FetchError;
use crate::browser::{ContentState, NavigationController, PaneView, StructureState};
use crate::render::RenderedDocument;
use crate::theme::Theme;
use crate::tui::scroll::{FocusablePanel, ScrollState};
use crate::tui::traits::{Handled, Interactive, ScrollKeys, Scrollable};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};
use std::time::Instant;

pub struct ContentPanel {
    scroll: ScrollState,
    /// Revision of the lesson body last shown, to reset scrolling
    shown_revision: Option<u64>,
}

impl ContentPanel {
    pub fn new() -> Self {
        Self {
            scroll: ScrollState::manual(),
            shown_revision: None,
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        nav: &NavigationController,
        document: Option<&RenderedDocument>,
        theme: &Theme,
        focused: bool,
    ) {
        let now = Instant::now();
        if let PaneView::Content { revision, .. } = nav.display(now) {
            if self.shown_revision != Some(revision) {
                self.shown_revision = Some(revision);
                self.scroll.reset();
            }
        }

        let lines = body_lines(nav, document, theme, now);
        let viewport = area.height.saturating_sub(2) as usize;
        self.scroll.update_dimensions(lines.len(), viewport);

        let (start, end) = self.scroll.visible_range();
        let visible: Vec<Line> = lines[start..end].to_vec();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(
                Style::default().fg(theme.panel_border(FocusablePanel::Content, focused)),
            )
            .padding(Padding::horizontal(1))
            .title(panel_title(nav, theme));

        f.render_widget(Paragraph::new(visible).block(block), area);
        render_scrollbar(f, area, &self.scroll, theme);
    }
}

impl Default for ContentPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn panel_title(nav: &NavigationController, theme: &Theme) -> Line<'static> {
    let name = match (nav.selected_lesson(), nav.selected_path()) {
        (Some(lesson), _) => lesson.title.clone(),
        (None, Some(path)) => path.to_string(),
        (None, None) => "Lesson".to_string(),
    };
    let mut spans = vec![Span::styled(
        format!(" {} ", name),
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];
    if matches!(nav.content(), ContentState::Loading { .. }) {
        spans.push(Span::styled(
            "loading… ",
            Style::default().fg(theme.muted),
        ));
    }
    Line::from(spans)
}

/// Everything the pane shows, before scrolling
fn body_lines(
    nav: &NavigationController,
    document: Option<&RenderedDocument>,
    theme: &Theme,
    now: Instant,
) -> Vec<Line<'static>> {
    if let StructureState::Failed(error) = nav.structure() {
        return structure_advisory(error, theme);
    }

    let mut lines = match &nav.content() {
        ContentState::Failed { path, error } => content_error(path, error, theme),
        _ => Vec::new(),
    };

    let muted = Style::default()
        .fg(theme.muted)
        .add_modifier(Modifier::ITALIC);
    match nav.display(now) {
        PaneView::Empty => {
            let message = match nav.structure() {
                StructureState::Uninitialized | StructureState::Loading => "Loading tutorial...",
                _ => "Select a lesson from the sidebar",
            };
            if lines.is_empty() {
                lines.push(Line::from(Span::styled(message, muted)));
            }
        }
        PaneView::Loading => lines.push(Line::from(Span::styled("Loading lesson...", muted))),
        PaneView::Content { visibility, .. } => {
            if let Some(document) = document {
                lines.extend(fade(document.lines(theme), visibility, theme));
            }
        }
    }
    lines
}

fn structure_advisory(error: &FetchError, theme: &Theme) -> Vec<Line<'static>> {
    let (headline, color) = match error {
        FetchError::NotFound(_) => (
            "This tutorial is still generating, check back soon.".to_string(),
            theme.warning,
        ),
        FetchError::Network(detail) => (format!("Could not load the tutorial: {}", detail), theme.error),
    };
    let mut lines = vec![
        Line::from(Span::styled(
            headline,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if error.is_not_found() {
        lines.push(Line::from(Span::styled(
            error.detail().to_string(),
            Style::default().fg(theme.muted),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("Press ", Style::default().fg(theme.muted)),
        Span::styled("r", Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)),
        Span::styled(" to try again.", Style::default().fg(theme.muted)),
    ]));
    lines
}

fn content_error(path: &str, error: &FetchError, theme: &Theme) -> Vec<Line<'static>> {
    let message = match error {
        FetchError::NotFound(_) => format!("✗ {} was not found", path),
        FetchError::Network(detail) => format!("✗ Failed to load {}: {}", path, detail),
    };
    vec![
        Line::from(vec![
            Span::styled(message, Style::default().fg(theme.error)),
            Span::styled("  (r to retry)", Style::default().fg(theme.muted)),
        ]),
        Line::from(""),
    ]
}

/// Dim lines while the pane fades
fn fade(lines: Vec<Line<'static>>, visibility: f32, theme: &Theme) -> Vec<Line<'static>> {
    if visibility >= 1.0 {
        return lines;
    }
    lines
        .into_iter()
        .map(|line| {
            let spans = line
                .spans
                .into_iter()
                .map(|span| {
                    let style = if visibility < 0.5 {
                        span.style.fg(theme.muted).add_modifier(Modifier::DIM)
                    } else {
                        span.style.add_modifier(Modifier::DIM)
                    };
                    Span::styled(span.content, style)
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

impl Scrollable for ContentPanel {
    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Interactive for ContentPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        self.handle_scroll_keys(key)
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓/PgUp/PgDn:scroll")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::model::fixtures::two_chapters;
    use crate::browser::model::LessonContent;
    use crate::browser::{FadeTiming, Route};
    use crate::render::{BlockRenderer, ResizeRegistry};
    use crate::tui::markdown::lines_to_text;
    use std::sync::Arc;
    use std::time::Duration;

    fn loaded(now: Instant) -> NavigationController {
        let mut nav = NavigationController::new(Route::root("demo"), FadeTiming::default());
        nav.mount();
        nav.structure_loaded(1, Ok(Arc::new(two_chapters())), now);
        nav
    }

    fn welcome() -> LessonContent {
        LessonContent {
            path: "01_welcome.md".into(),
            body: "# Welcome\n\nHello there.".into(),
        }
    }

    fn text(nav: &NavigationController, doc: Option<&RenderedDocument>, now: Instant) -> String {
        lines_to_text(&body_lines(nav, doc, &Theme::default(), now))
    }

    #[test]
    fn test_not_found_structure_shows_advisory() {
        let now = Instant::now();
        let mut nav = NavigationController::new(Route::root("demo"), FadeTiming::default());
        nav.mount();
        nav.structure_loaded(1, Err(FetchError::NotFound("Output not found".into())), now);

        let text = text(&nav, None, now);
        assert!(text.contains("still generating, check back soon"));
        assert!(text.contains("Press r to try again."));
    }

    #[test]
    fn test_network_structure_failure_shows_detail() {
        let now = Instant::now();
        let mut nav = NavigationController::new(Route::root("demo"), FadeTiming::default());
        nav.mount();
        nav.structure_loaded(1, Err(FetchError::Network("connection refused".into())), now);

        assert!(text(&nav, None, now).contains("Could not load the tutorial: connection refused"));
    }

    #[test]
    fn test_empty_structure_prompts_for_selection() {
        let now = Instant::now();
        let mut nav = NavigationController::new(Route::root("demo"), FadeTiming::default());
        nav.mount();
        nav.structure_loaded(1, Ok(Arc::new(Default::default())), now);

        assert_eq!(text(&nav, None, now), "Select a lesson from the sidebar\n");
    }

    #[test]
    fn test_failed_content_keeps_previous_body() {
        let start = Instant::now();
        let mut nav = loaded(start);
        nav.content_loaded(nav.generation(), Ok(welcome()), start);
        let settled = start + Duration::from_secs(1);
        nav.tick(settled);

        let theme = Theme::default();
        let (doc, _) = BlockRenderer::new("mermaid").render(
            &welcome(),
            60,
            &theme,
            &ResizeRegistry::new(),
        );

        nav.select("02_engine.md", crate::browser::SelectionOrigin::Sidebar, settled);
        nav.content_loaded(
            nav.generation(),
            Err(FetchError::Network("timeout".into())),
            settled,
        );

        let shown = text(&nav, Some(&doc), settled + Duration::from_secs(1));
        assert!(shown.contains("Failed to load 02_engine.md: timeout"));
        assert!(shown.contains("Hello there."));
    }

    #[test]
    fn test_fade_dims_spans() {
        let theme = Theme::default();
        let lines = vec![Line::from("body")];

        let faded = fade(lines.clone(), 0.2, &theme);
        assert!(faded[0].spans[0].style.add_modifier.contains(Modifier::DIM));
        assert_eq!(faded[0].spans[0].style.fg, Some(theme.muted));

        assert_eq!(fade(lines.clone(), 1.0, &theme), lines);
    }
}
