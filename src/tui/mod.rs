// TUI module - Terminal User Interface
//
// Manages the terminal with ratatui:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, animation ticks, fetch and diagram results)
// - Rendering the reader screen

pub mod app;
pub mod clipboard;
pub mod components;
pub mod layout;
pub mod markdown;
pub mod scroll;
pub mod traits;
pub mod ui;

use crate::api::Backend;
use crate::browser::Route;
use crate::config::Config;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, AppMessage};
use components::{EditOutcome, Toast};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use layout::ScreenLayout;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Frame interval; short enough for a smooth fade
const TICK: Duration = Duration::from_millis(50);

/// Run the TUI until the reader quits
pub async fn run_tui(
    config: Config,
    route: Route,
    backend: Arc<dyn Backend>,
    log_buffer: LogBuffer,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term).context("Failed to create terminal")?;

    let (mut app, mut rx) = App::new(&config, route, backend, log_buffer);
    app.start();

    let result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        event::DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on terminal input, the frame tick, and results from spawned fetch
/// and diagram tasks, whichever comes first.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppMessage>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(TICK);

    loop {
        let size = terminal.size().context("Failed to read terminal size")?;
        let layout = ScreenLayout::compute(Rect::new(0, 0, size.width, size.height), app.show_logs);
        app.prepare(Instant::now(), layout.text_width());

        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard or mouse input (resize just falls through to a redraw)
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        _ => {}
                    }
                }
            } => {}

            _ = tick_interval.tick() => {}

            Some(message) = rx.recv() => {
                app.handle_message(message, Instant::now());
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: address editor → global keys → focused panel → fallback
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    // Layer 1: the address editor captures everything while open
    if let Some(editor) = app.editor.as_mut() {
        match editor.handle_key(key_event) {
            EditOutcome::Editing => {}
            EditOutcome::Cancelled => app.editor = None,
            EditOutcome::Submitted(address) => app.submit_address(&address),
        }
        return;
    }

    // Layer 2: global keys
    if handle_global_keys(app, &key_event) {
        return;
    }

    // Layer 3: focused panel
    if app.dispatch_to_focused(key_event).was_handled() {
        return;
    }

    // Layer 4: fallbacks
    match key_event.code {
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        KeyCode::Backspace => app.back(),
        KeyCode::Esc => app.focused = Default::default(),
        _ => {}
    }
}

/// Global keys work the same whichever panel has focus
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        KeyCode::Char('n') => app.next_lesson(),
        KeyCode::Char('p') => app.previous_lesson(),
        KeyCode::Char('[') => app.back(),
        KeyCode::Char(']') => app.forward(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char(':') | KeyCode::Char('o') => app.open_address_editor(),
        KeyCode::Char('L') => app.toggle_logs(),
        KeyCode::Char('y') => {
            let link = app.deep_link();
            let now = Instant::now();
            app.toast = Some(match clipboard::copy_to_clipboard(&link) {
                Ok(()) => Toast::info("✓ Copied link to clipboard", now),
                Err(e) => {
                    tracing::warn!("Clipboard unavailable: {:#}", e);
                    Toast::error("✗ Failed to copy", now)
                }
            });
        }
        _ => return false,
    }
    true
}

/// Mouse wheel scrolls the focused panel
fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    let code = match mouse_event.kind {
        MouseEventKind::ScrollUp => KeyCode::Up,
        MouseEventKind::ScrollDown => KeyCode::Down,
        _ => return,
    };
    app.dispatch_to_focused(KeyEvent::new(code, KeyModifiers::NONE));
}
