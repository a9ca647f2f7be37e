//! Logs panel component
//!
//! Shows captured tracing events, color-coded by level. Follows new entries
//! until the reader moves the selection; Esc returns to following.

use super::scrollbar::render_scrollbar;
use crate::logging::{LogEntry, LogLevel};
use crate::theme::Theme;
use crate::tui::app::App;
use crate::tui::scroll::{FocusablePanel, ScrollState};
use crate::tui::traits::{Handled, Interactive, Scrollable, Selectable};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub struct LogsPanel {
    scroll: ScrollState,

    /// Selected entry (None = following)
    pub selected: Option<usize>,

    /// Entry count at the last sync, for bounds checks
    entry_count: usize,
}

impl LogsPanel {
    pub fn new() -> Self {
        Self {
            scroll: ScrollState::new(),
            selected: None,
            entry_count: 0,
        }
    }

    /// Sync with the shared log buffer (every frame)
    pub fn sync_entries(&mut self, entries: &[LogEntry], viewport: usize) {
        self.entry_count = entries.len();
        self.scroll.update_dimensions(entries.len(), viewport);

        if let Some(idx) = self.selected {
            if idx >= entries.len() {
                self.selected = entries.len().checked_sub(1);
            }
        }
    }

    pub fn render_with_entries(
        &self,
        f: &mut Frame,
        area: Rect,
        entries: &[LogEntry],
        theme: &Theme,
        focused: bool,
    ) {
        let (start, end) = self.scroll.visible_range();
        let items: Vec<ListItem> = entries[start..end]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let line = format_entry(entry, theme);
                if focused && self.selected == Some(start + i) {
                    ListItem::new(line).style(
                        Style::default()
                            .fg(theme.selection_fg)
                            .bg(theme.selection)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    ListItem::new(line)
                }
            })
            .collect();

        let title = if self.selected.is_some() && focused {
            " System Logs [select] "
        } else if self.scroll.auto_follow {
            " System Logs "
        } else {
            " System Logs [scroll] "
        };

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(
                    Style::default().fg(theme.panel_border(FocusablePanel::Logs, focused)),
                )
                .title(title),
        );

        f.render_widget(list, area);
        render_scrollbar(f, area, &self.scroll, theme);
    }
}

impl Default for LogsPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Scrollable for LogsPanel {
    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Selectable for LogsPanel {
    fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    fn select(&mut self, index: usize) {
        if self.entry_count > 0 {
            let index = index.min(self.entry_count - 1);
            self.selected = Some(index);
            self.scroll.auto_follow = false;
            self.scroll.ensure_visible(index);
        }
    }

    fn item_count(&self) -> usize {
        self.entry_count
    }

    /// First selection starts at the most recent entry
    fn select_previous(&mut self) {
        match self.selected {
            Some(idx) => self.select(idx.saturating_sub(1)),
            None if self.entry_count > 0 => self.select(self.entry_count - 1),
            None => {}
        }
    }
}

impl Interactive for LogsPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Home => self.select(0),
            KeyCode::End => self.select(usize::MAX),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::Esc if self.selected.is_some() => {
                self.selected = None;
                self.scroll.scroll_to_bottom();
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓:select  Esc:follow")
    }
}

fn format_entry(entry: &LogEntry, theme: &Theme) -> Line<'static> {
    let level_style = match entry.level {
        LogLevel::Error => Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        LogLevel::Warn => Style::default().fg(theme.warning),
        LogLevel::Info => Style::default().fg(theme.success),
        LogLevel::Debug | LogLevel::Trace => Style::default().fg(theme.muted),
    };
    Line::from(vec![
        Span::styled(
            format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
            Style::default().fg(theme.muted),
        ),
        Span::styled(format!("{:5} ", entry.level.as_str()), level_style),
        Span::styled(
            format!("{}: ", entry.short_target()),
            Style::default().fg(theme.muted),
        ),
        Span::styled(entry.message.clone(), Style::default().fg(theme.foreground)),
    ])
}

/// Render the logs panel owned by App
pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let viewport = area.height.saturating_sub(2) as usize;
    let entries = app.log_buffer.get_all();
    let focused = app.focused == FocusablePanel::Logs;

    app.logs_panel.sync_entries(&entries, viewport);
    app.logs_panel
        .render_with_entries(f, area, &entries, &app.theme, focused);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::KeyModifiers;

    fn entries(n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| LogEntry {
                timestamp: Utc::now(),
                level: LogLevel::Info,
                target: "tutorial_reader::browser::content".into(),
                message: format!("entry {}", i),
            })
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_first_selection_is_most_recent() {
        let mut panel = LogsPanel::new();
        panel.sync_entries(&entries(30), 8);

        panel.handle_key(key(KeyCode::Up));

        assert_eq!(panel.selected, Some(29));
        assert!(!panel.scroll.auto_follow);
    }

    #[test]
    fn test_esc_returns_to_following() {
        let mut panel = LogsPanel::new();
        panel.sync_entries(&entries(30), 8);
        panel.handle_key(key(KeyCode::Home));
        assert_eq!(panel.scroll.offset(), 0);

        assert_eq!(panel.handle_key(key(KeyCode::Esc)), Handled::Yes);
        assert_eq!(panel.handle_key(key(KeyCode::Esc)), Handled::No);

        panel.sync_entries(&entries(40), 8);
        assert_eq!(panel.scroll.offset(), 32);
    }

    #[test]
    fn test_selection_clamped_when_buffer_shrinks() {
        let mut panel = LogsPanel::new();
        panel.sync_entries(&entries(10), 8);
        panel.handle_key(key(KeyCode::End));

        panel.sync_entries(&entries(4), 8);

        assert_eq!(panel.selected, Some(3));
    }
}
