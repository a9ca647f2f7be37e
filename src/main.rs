// Tutorial Reader - terminal browser for generated code tutorials
//
// Loads a tutorial's chapter/lesson structure from the backend, lets the
// reader move between lessons, and renders each lesson's markdown with its
// diagrams inline.
//
// Architecture:
// - api: Backend trait and the HTTP client for the tutorial service
// - browser: repositories, navigation state machine, address history, fades
// - render: splits lessons into markdown and diagram blocks, compiles diagrams
// - TUI (ratatui): sidebar, content pane, address bar, logs
// - Event loop: terminal input, frame ticks, and fetch results over mpsc

mod api;
mod browser;
mod cli;
mod config;
mod logging;
mod render;
mod theme;
mod tui;

use anyhow::Result;
use api::http::HttpBackend;
use api::Backend;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogSink};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands never touch the backend or logging
    if let Some(Commands::Config { show, path, reset }) = &cli.command {
        return cli::run_config(*show, *path, *reset);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // Diagram settings are fixed for the rest of the process
    render::diagram::initialize((&config.diagram).into());

    // In TUI mode logs go to the in-memory buffer so they don't garble the
    // screen; headless commands log to stderr.
    // The file guard must live until exit so file logs are flushed.
    let log_buffer = LogBuffer::new();
    let sink = if cli.command.is_none() {
        LogSink::Tui
    } else {
        LogSink::Stderr
    };
    let _file_guard = logging::init(&config.logging, sink, &log_buffer);

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(
        &config.api_base_url,
        config.request_timeout(),
    )?);
    tracing::debug!("Using tutorial backend at {}", config.api_base_url);

    match cli.command {
        Some(Commands::Toc { target }) => cli::run_toc(&config, backend, &target).await,
        Some(Commands::Show { target, width }) => {
            cli::run_show(&config, backend, &target, width).await
        }
        Some(Commands::Config { .. }) => Ok(()),
        None => {
            let Some(target) = cli.target else {
                Cli::command().print_help()?;
                return Ok(());
            };
            let route = cli::parse_target(&target)?;

            // Extract bundled themes on first run
            theme::ensure_themes_extracted();

            tracing::info!("Opening {}", route);
            let result = tui::run_tui(config, route, backend, log_buffer).await;
            if let Err(e) = &result {
                tracing::error!("TUI error: {:?}", e);
            }
            tracing::info!("Shutdown complete");
            result
        }
    }
}
