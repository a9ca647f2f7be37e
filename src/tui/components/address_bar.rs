//! Address bar component
//!
//! Shows the current deep link with back/forward availability. Pressing `:`
//! opens an editor prefilled with the address; Enter navigates to whatever
//! was typed.

use crate::browser::address::AddressBar;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Result of a key press while editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Editing,
    Cancelled,
    Submitted(String),
}

/// Text being typed into the address bar
#[derive(Debug, Clone, Default)]
pub struct AddressEditor {
    buffer: String,
}

impl AddressEditor {
    pub fn new(initial: &str) -> Self {
        Self {
            buffer: initial.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditOutcome {
        match key.code {
            KeyCode::Esc => return EditOutcome::Cancelled,
            KeyCode::Enter => return EditOutcome::Submitted(self.buffer.trim().to_string()),
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.push(c);
            }
            _ => {}
        }
        EditOutcome::Editing
    }
}

pub fn render(
    f: &mut Frame,
    area: Rect,
    address: &AddressBar,
    editor: Option<&AddressEditor>,
    theme: &Theme,
) {
    let arrow = |enabled: bool, glyph: &'static str| {
        let color = if enabled { theme.foreground } else { theme.muted };
        Span::styled(glyph, Style::default().fg(color))
    };

    let mut spans = vec![
        Span::raw(" "),
        arrow(address.can_go_back(), "◀"),
        Span::raw(" "),
        arrow(address.can_go_forward(), "▶"),
        Span::raw("  "),
    ];
    let border = match editor {
        Some(editor) => {
            spans.push(Span::styled(
                editor.text().to_string(),
                Style::default().fg(theme.foreground),
            ));
            spans.push(Span::styled(
                "█",
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
            theme.highlight
        }
        None => {
            spans.push(Span::styled(
                address.current().to_address(),
                Style::default().fg(theme.link),
            ));
            theme.border
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(border))
        .title(Span::styled(" Address ", Style::default().fg(theme.title)));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
