// Screen rendering - called once per frame
//
// Layout comes from `ScreenLayout` so the event loop and the renderer agree
// on the content width.

use super::app::App;
use super::components::{address_bar, logs_panel, status_bar};
use super::layout::ScreenLayout;
use super::scroll::FocusablePanel;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

pub fn draw(f: &mut Frame, app: &mut App) {
    // Theme background for the whole frame (unless the terminal's is kept)
    let background = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(background, f.area());

    let layout = ScreenLayout::compute(f.area(), app.show_logs);

    address_bar::render(
        f,
        layout.address,
        app.nav.address(),
        app.editor.as_ref(),
        &app.theme,
    );

    let viewport = layout.sidebar.height.saturating_sub(2) as usize;
    app.sidebar
        .sync(app.nav.structure(), app.nav.selected_path(), viewport);
    app.sidebar.render(
        f,
        layout.sidebar,
        &app.nav,
        &app.theme,
        app.focused == FocusablePanel::Sidebar,
    );

    let focused = app.focused == FocusablePanel::Content;
    app.content_panel.render(
        f,
        layout.content,
        &app.nav,
        app.document.as_ref(),
        &app.theme,
        focused,
    );

    if let Some(area) = layout.logs {
        logs_panel::render(f, area, app);
    }

    status_bar::render(f, layout.status, app);

    if let Some(toast) = &app.toast {
        toast.render(f, layout.content, &app.theme);
    }
}
