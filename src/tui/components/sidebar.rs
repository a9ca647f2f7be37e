//! Sidebar component
//!
//! Lists chapters and their lessons, numbered in reading order. The lesson
//! whose path equals the selected path is drawn as active; the cursor moves
//! over lessons only and Enter activates the lesson under it.

use super::scrollbar::render_scrollbar;
use crate::browser::model::TutorialStructure;
use crate::browser::{NavigationController, StructureState};
use crate::theme::Theme;
use crate::tui::scroll::{FocusablePanel, ScrollState};
use crate::tui::traits::{Handled, Interactive, Scrollable, Selectable};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Chapter { number: usize, title: String },
    Lesson { number: String, title: String, path: String },
}

pub struct SidebarPanel {
    scroll: ScrollState,
    structure: Option<Arc<TutorialStructure>>,
    rows: Vec<Row>,
    /// Row index of every lesson, in order
    lesson_rows: Vec<usize>,
    /// Index into `lesson_rows`
    cursor: Option<usize>,
    /// Selected path the cursor last jumped to
    followed: Option<String>,
    activated: Option<String>,
}

impl SidebarPanel {
    pub fn new() -> Self {
        Self {
            scroll: ScrollState::manual(),
            structure: None,
            rows: Vec::new(),
            lesson_rows: Vec::new(),
            cursor: None,
            followed: None,
            activated: None,
        }
    }

    /// Bring rows and cursor up to date (every frame)
    pub fn sync(&mut self, structure: &StructureState, selected: Option<&str>, viewport: usize) {
        let current = match structure {
            StructureState::Ready(structure) => Some(structure),
            _ => None,
        };
        let changed = match (&self.structure, current) {
            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.rebuild(current.cloned());
        }

        if selected != self.followed.as_deref() {
            self.followed = selected.map(str::to_string);
            if let Some(index) = selected.and_then(|path| self.lesson_index(path)) {
                self.cursor = Some(index);
            }
        }

        self.scroll.update_dimensions(self.rows.len(), viewport);
        if let Some(row) = self.cursor_row() {
            self.scroll.ensure_visible(row);
        }
    }

    fn rebuild(&mut self, structure: Option<Arc<TutorialStructure>>) {
        self.rows.clear();
        self.lesson_rows.clear();
        self.cursor = None;
        self.followed = None;
        self.scroll.scroll_to_top();

        if let Some(structure) = &structure {
            for (c, chapter) in structure.chapters.iter().enumerate() {
                self.rows.push(Row::Chapter {
                    number: c + 1,
                    title: chapter.title.clone(),
                });
                for (l, lesson) in chapter.lessons.iter().enumerate() {
                    self.lesson_rows.push(self.rows.len());
                    self.rows.push(Row::Lesson {
                        number: format!("{}.{}", c + 1, l + 1),
                        title: lesson.title.clone(),
                        path: lesson.path.clone(),
                    });
                }
            }
        }
        self.structure = structure;
    }

    fn lesson_index(&self, path: &str) -> Option<usize> {
        self.lesson_rows
            .iter()
            .position(|&row| matches!(&self.rows[row], Row::Lesson { path: p, .. } if p == path))
    }

    fn cursor_row(&self) -> Option<usize> {
        self.cursor.and_then(|i| self.lesson_rows.get(i).copied())
    }

    /// Path of the lesson under the cursor
    pub fn cursor_path(&self) -> Option<&str> {
        match &self.rows[self.cursor_row()?] {
            Row::Lesson { path, .. } => Some(path),
            Row::Chapter { .. } => None,
        }
    }

    /// Lesson activated with Enter since the last call
    pub fn take_activated(&mut self) -> Option<String> {
        self.activated.take()
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        nav: &NavigationController,
        theme: &Theme,
        focused: bool,
    ) {
        let structure = nav.structure();
        let selected = nav.selected_path();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(
                Style::default().fg(theme.panel_border(FocusablePanel::Sidebar, focused)),
            )
            .title(Span::styled(
                format!(" {} Tutorial ", nav.tutorial_id()),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ));

        let placeholder = match structure {
            StructureState::Uninitialized | StructureState::Loading => {
                Some(loading_skeleton(area.width.saturating_sub(4) as usize, theme))
            }
            StructureState::Failed(_) => Some(vec![Line::from(Span::styled(
                "Structure unavailable",
                Style::default().fg(theme.muted),
            ))]),
            StructureState::Ready(_) if self.rows.is_empty() => Some(vec![Line::from(Span::styled(
                "No tutorial structure found.",
                Style::default().fg(theme.muted),
            ))]),
            StructureState::Ready(_) => None,
        };
        if let Some(lines) = placeholder {
            let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
            f.render_widget(paragraph, area);
            return;
        }

        let cursor_row = self.cursor_row();
        let (start, end) = self.scroll.visible_range();
        let items: Vec<ListItem> = self.rows[start..end]
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let index = start + i;
                match row {
                    Row::Chapter { number, title } => ListItem::new(Line::from(Span::styled(
                        format!("{}. {}", number, title),
                        Style::default().fg(theme.heading2).add_modifier(Modifier::BOLD),
                    ))),
                    Row::Lesson {
                        number,
                        title,
                        path,
                    } => {
                        let active = selected == Some(path.as_str());
                        let mut style = if active {
                            Style::default()
                                .fg(theme.highlight)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(theme.foreground)
                        };
                        if focused && cursor_row == Some(index) {
                            style = style.fg(theme.selection_fg).bg(theme.selection);
                        }
                        let marker = if active { "▸ " } else { "  " };
                        ListItem::new(Line::from(vec![
                            Span::styled(marker, style),
                            Span::styled(format!("{} ", number), style.fg(theme.muted)),
                            Span::styled(title.clone(), style),
                        ]))
                    }
                }
            })
            .collect();

        f.render_widget(List::new(items).block(block), area);
        render_scrollbar(f, area, &self.scroll, theme);
    }
}

impl Default for SidebarPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn loading_skeleton(width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let muted = Style::default().fg(theme.muted);
    let mut lines = vec![Line::from(Span::styled("Loading structure...", muted)), Line::from("")];
    for (i, fraction) in [0.6, 0.8, 0.7, 0.5, 0.75].iter().enumerate() {
        let indent = if i % 3 == 0 { 0 } else { 2 };
        let bar = ((width as f64 * fraction) as usize).max(3);
        lines.push(Line::from(Span::styled(
            format!("{}{}", " ".repeat(indent), "░".repeat(bar)),
            muted,
        )));
    }
    lines
}

impl Scrollable for SidebarPanel {
    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Selectable for SidebarPanel {
    fn selected_index(&self) -> Option<usize> {
        self.cursor
    }

    fn select(&mut self, index: usize) {
        if !self.lesson_rows.is_empty() {
            self.cursor = Some(index.min(self.lesson_rows.len() - 1));
            if let Some(row) = self.cursor_row() {
                self.scroll.ensure_visible(row);
            }
        }
    }

    fn item_count(&self) -> usize {
        self.lesson_rows.len()
    }
}

impl Interactive for SidebarPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        let page = self.scroll.viewport().max(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Home | KeyCode::Char('g') => self.select(0),
            KeyCode::End | KeyCode::Char('G') => self.select(usize::MAX),
            KeyCode::PageUp => self.select(self.cursor.unwrap_or(0).saturating_sub(page)),
            KeyCode::PageDown => self.select(self.cursor.unwrap_or(0).saturating_add(page)),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                match self.cursor_path() {
                    Some(path) => self.activated = Some(path.to_string()),
                    None => return Handled::No,
                }
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓:move  Enter:open")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::model::fixtures::two_chapters;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready() -> StructureState {
        StructureState::Ready(Arc::new(two_chapters()))
    }

    #[test]
    fn test_rows_number_chapters_and_lessons() {
        let mut panel = SidebarPanel::new();
        panel.sync(&ready(), None, 20);

        assert_eq!(
            panel.rows[0],
            Row::Chapter {
                number: 1,
                title: "Intro".into()
            }
        );
        assert!(matches!(&panel.rows[1], Row::Lesson { number, .. } if number == "1.1"));
        assert_eq!(panel.item_count(), two_chapters().lesson_count());
    }

    #[test]
    fn test_cursor_follows_selection() {
        let mut panel = SidebarPanel::new();
        let structure = ready();

        panel.sync(&structure, Some("02_engine.md"), 20);
        assert_eq!(panel.cursor_path(), Some("02_engine.md"));

        // Reader moves the cursor; an unchanged selection leaves it alone
        panel.handle_key(key(KeyCode::Up));
        panel.sync(&structure, Some("02_engine.md"), 20);
        assert_ne!(panel.cursor_path(), Some("02_engine.md"));
    }

    #[test]
    fn test_enter_activates_lesson_under_cursor() {
        let mut panel = SidebarPanel::new();
        panel.sync(&ready(), Some("01_welcome.md"), 20);

        panel.handle_key(key(KeyCode::Down));
        let handled = panel.handle_key(key(KeyCode::Enter));

        assert_eq!(handled, Handled::Yes);
        let activated = panel.take_activated().unwrap();
        assert_ne!(activated, "01_welcome.md");
        assert!(panel.take_activated().is_none());
    }

    #[test]
    fn test_cursor_clamps_at_ends() {
        let mut panel = SidebarPanel::new();
        panel.sync(&ready(), None, 20);

        panel.handle_key(key(KeyCode::End));
        let last = panel.cursor;
        panel.handle_key(key(KeyCode::Down));
        assert_eq!(panel.cursor, last);

        panel.handle_key(key(KeyCode::Home));
        panel.handle_key(key(KeyCode::Up));
        assert_eq!(panel.cursor, Some(0));
    }

    #[test]
    fn test_new_structure_resets_rows() {
        let mut panel = SidebarPanel::new();
        panel.sync(&ready(), Some("02_engine.md"), 20);

        panel.sync(&StructureState::Loading, None, 20);

        assert!(panel.rows.is_empty());
        assert!(panel.cursor_path().is_none());
        assert_eq!(panel.handle_key(key(KeyCode::Enter)), Handled::No);
    }
}
