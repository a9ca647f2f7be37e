//! Scrollbar rendering for panels backed by `ScrollState`

use crate::theme::Theme;
use crate::tui::scroll::ScrollState;
use ratatui::{
    layout::{Margin, Rect},
    style::Style,
    widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Draw a vertical scrollbar on the right border of `area`
///
/// Nothing is drawn when the content fits.
pub fn render_scrollbar(f: &mut Frame, area: Rect, scroll: &ScrollState, theme: &Theme) {
    if !scroll.needs_scrollbar() {
        return;
    }

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None)
        .thumb_style(Style::default().fg(theme.highlight))
        .track_style(Style::default().fg(theme.border));

    // ScrollbarState wants how far the view can move, not the line count
    let scrollable = scroll.total().saturating_sub(scroll.viewport());
    let mut state = ScrollbarState::new(scrollable).position(scroll.offset());

    let track = area.inner(Margin {
        vertical: 1,
        horizontal: 0,
    });
    f.render_stateful_widget(scrollbar, track, &mut state);
}
