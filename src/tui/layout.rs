/// Responsive layout for the reader screen.
///
/// Single source of truth for width thresholds and panel placement, so the
/// event loop and the renderer agree on the content width diagrams are laid
/// out for.
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the logs panel when shown (including borders)
const LOGS_HEIGHT: u16 = 10;

/// Columns used by the content panel's borders and padding
const CONTENT_CHROME: u16 = 4;

/// Narrowest width lesson text is wrapped to
pub const MIN_TEXT_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// < 60 cols: split pane, minimal terminal
    Compact,
    /// 60-99 cols: half-screen
    Normal,
    /// 100-139 cols: full terminal
    Wide,
    /// 140+ cols: ultrawide monitor
    UltraWide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=59 => Breakpoint::Compact,
            60..=99 => Breakpoint::Normal,
            100..=139 => Breakpoint::Wide,
            _ => Breakpoint::UltraWide,
        }
    }

    /// Check if at least this breakpoint (inclusive)
    pub fn at_least(&self, min: Breakpoint) -> bool {
        self.ordinal() >= min.ordinal()
    }

    fn ordinal(&self) -> u8 {
        match self {
            Breakpoint::Compact => 0,
            Breakpoint::Normal => 1,
            Breakpoint::Wide => 2,
            Breakpoint::UltraWide => 3,
        }
    }

    /// Sidebar width for this terminal size
    fn sidebar_width(&self) -> u16 {
        match self {
            Breakpoint::Compact => 22,
            Breakpoint::Normal => 28,
            Breakpoint::Wide => 34,
            Breakpoint::UltraWide => 40,
        }
    }
}

/// Screen areas for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub address: Rect,
    pub sidebar: Rect,
    pub content: Rect,
    pub logs: Option<Rect>,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect, show_logs: bool) -> Self {
        let mut rows = vec![Constraint::Length(3), Constraint::Min(5)];
        if show_logs {
            rows.push(Constraint::Length(LOGS_HEIGHT));
        }
        rows.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(rows)
            .split(area);

        let body = chunks[1];
        let sidebar_width = Breakpoint::from_width(area.width)
            .sidebar_width()
            .min(body.width / 2);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
            .split(body);

        Self {
            address: chunks[0],
            sidebar: columns[0],
            content: columns[1],
            logs: show_logs.then(|| chunks[2]),
            status: chunks[chunks.len() - 1],
        }
    }

    /// Columns available to lesson text and diagrams
    pub fn text_width(&self) -> usize {
        (self.content.width.saturating_sub(CONTENT_CHROME) as usize).max(MIN_TEXT_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::from_width(40), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(59), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(60), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(99), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(100), Breakpoint::Wide);
        assert_eq!(Breakpoint::from_width(140), Breakpoint::UltraWide);
        assert!(Breakpoint::Wide.at_least(Breakpoint::Normal));
        assert!(!Breakpoint::Wide.at_least(Breakpoint::UltraWide));
    }

    #[test]
    fn layout_without_logs() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 100, 40), false);

        assert_eq!(layout.address.height, 3);
        assert_eq!(layout.status.y, 39);
        assert!(layout.logs.is_none());
        assert_eq!(layout.sidebar.width, 34);
        assert_eq!(layout.content.width, 66);
        assert_eq!(layout.text_width(), 62);
    }

    #[test]
    fn layout_with_logs() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 40), true);

        let logs = layout.logs.unwrap();
        assert_eq!(logs.height, LOGS_HEIGHT);
        assert_eq!(logs.y + logs.height, layout.status.y);
        // Logs span the full width below sidebar and content
        assert_eq!(logs.width, 80);
    }

    #[test]
    fn text_width_has_floor() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 30, 20), false);
        assert_eq!(layout.text_width(), MIN_TEXT_WIDTH);
    }
}
