// Status bar component
//
// One line at the bottom: focused panel, its key hints, and the global keys.
// Narrow terminals get the short form.

use crate::browser::TransitionPhase;
use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const GLOBAL_HINTS: &str = "n/p:next/prev  [/]:back/fwd  r:reload  y:copy link  ::go  L:logs  q:quit";
const GLOBAL_HINTS_SHORT: &str = "n/p [/] r y : L q";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let bp = Breakpoint::from_width(area.width);

    let mut spans = vec![Span::styled(
        format!(" {} ", app.focused.name()),
        Style::default()
            .fg(theme.selection_fg)
            .bg(theme.selection)
            .add_modifier(Modifier::BOLD),
    )];

    if app.is_editing_address() {
        spans.push(Span::styled(
            "  Enter:go  Esc:cancel  Ctrl-U:clear",
            Style::default().fg(theme.status_bar),
        ));
    } else {
        if let Some(hint) = app.focus_hint() {
            spans.push(Span::styled(
                format!("  {}", hint),
                Style::default().fg(theme.status_bar),
            ));
        }
        let global = if bp.at_least(Breakpoint::Wide) {
            GLOBAL_HINTS
        } else {
            GLOBAL_HINTS_SHORT
        };
        spans.push(Span::styled(
            format!("  │ {}", global),
            Style::default().fg(theme.muted),
        ));
    }

    let phase = match app.nav.phase() {
        TransitionPhase::Idle => None,
        TransitionPhase::FadingOut => Some("◐"),
        TransitionPhase::FadingIn => Some("◑"),
    };
    if let Some(glyph) = phase {
        spans.push(Span::styled(
            format!("  {}", glyph),
            Style::default().fg(theme.highlight),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
