// CLI module - command-line argument parsing and handlers
//
// The bare form opens the reader; subcommands work without a terminal UI:
// - toc: print the chapter/lesson tree
// - show: print one lesson as plain text
// - config --show|--path|--reset: inspect or regenerate the config file

use crate::api::{normalize_tutorial_id, Backend};
use crate::browser::model::TutorialStructure;
use crate::browser::{ContentRepository, Route, StructureRepository};
use crate::config::{Config, VERSION};
use crate::render::{BlockRenderer, DiagramRenderer, ResizeRegistry};
use crate::theme::Theme;
use crate::tui::markdown::lines_to_text;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

/// Width used by `show` when none is given
const DEFAULT_SHOW_WIDTH: usize = 80;

/// Tutorial Reader - browse generated tutorials in the terminal
#[derive(Parser, Debug)]
#[command(name = "tutorial-reader")]
#[command(version = VERSION)]
#[command(about = "Browse generated code tutorials in the terminal", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Tutorial id, GitHub URL, or deep link (/output/{id}[/{lessonPath}]).
    /// Ids spelled like a subcommand (toc, show, config) must use /output/{id}
    pub target: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a tutorial's chapters and lessons
    Toc {
        /// Tutorial id, GitHub URL, or deep link
        target: String,
    },

    /// Print one lesson as plain text (the first lesson unless the link names one)
    Show {
        /// Tutorial id, GitHub URL, or deep link
        target: String,

        /// Wrap width in columns
        #[arg(long, default_value_t = DEFAULT_SHOW_WIDTH)]
        width: usize,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Turn a command-line target into a route
///
/// Deep links (with or without the leading slash) are parsed as addresses;
/// anything else is treated as a tutorial id or repository URL.
pub fn parse_target(target: &str) -> Result<Route> {
    let trimmed = target.trim();
    if trimmed.starts_with("/output") || trimmed.starts_with("output/") {
        return Ok(Route::parse(trimmed)?);
    }

    normalize_tutorial_id(trimmed)
        .map(Route::root)
        .ok_or_else(|| anyhow!("Not a tutorial id or link: {:?}", target))
}

// ─────────────────────────────────────────────────────────────────────────────
// toc
// ─────────────────────────────────────────────────────────────────────────────

pub async fn run_toc(config: &Config, backend: Arc<dyn Backend>, target: &str) -> Result<()> {
    let route = parse_target(target)?;
    let repository = StructureRepository::new(backend);
    let structure = repository
        .fetch_structure(&route.tutorial_id)
        .await
        .with_context(|| {
            format!(
                "Failed to load {} from {}",
                route.tutorial_id, config.api_base_url
            )
        })?;

    print!("{}", format_toc(&route.tutorial_id, &structure));
    Ok(())
}

/// Numbered outline, the same numbering the sidebar uses
pub fn format_toc(tutorial_id: &str, structure: &TutorialStructure) -> String {
    let mut out = format!("{} Tutorial\n", tutorial_id);
    if structure.chapters.is_empty() {
        out.push_str("No tutorial structure found.\n");
        return out;
    }

    for (c, chapter) in structure.chapters.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", c + 1, chapter.title));
        for (l, lesson) in chapter.lessons.iter().enumerate() {
            out.push_str(&format!(
                "   {}.{} {}  ({})\n",
                c + 1,
                l + 1,
                lesson.title,
                lesson.path
            ));
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// show
// ─────────────────────────────────────────────────────────────────────────────

pub async fn run_show(
    config: &Config,
    backend: Arc<dyn Backend>,
    target: &str,
    width: usize,
) -> Result<()> {
    let route = parse_target(target)?;
    let text = render_lesson(config, backend, &route, width).await?;
    println!("{}", text);
    Ok(())
}

/// Fetch and render one lesson to plain text, diagrams included
pub async fn render_lesson(
    config: &Config,
    backend: Arc<dyn Backend>,
    route: &Route,
    width: usize,
) -> Result<String> {
    let path = match &route.lesson_path {
        Some(path) => path.clone(),
        None => {
            let structure = StructureRepository::new(backend.clone())
                .fetch_structure(&route.tutorial_id)
                .await
                .with_context(|| format!("Failed to load {}", route.tutorial_id))?;
            structure
                .first_lesson()
                .map(|lesson| lesson.path.clone())
                .ok_or_else(|| anyhow!("{} has no lessons", route.tutorial_id))?
        }
    };

    let content = ContentRepository::new(backend)
        .fetch_content(&route.tutorial_id, &path)
        .await
        .with_context(|| format!("Failed to load {}", path))?;

    let theme = Theme::by_name(&config.theme);
    let registry = ResizeRegistry::new();
    let (mut document, jobs) = BlockRenderer::new(config.diagram.tag.clone()).render(
        &content,
        width,
        &theme,
        &registry,
    );

    let renderer = DiagramRenderer::new();
    for job in jobs {
        let (id, job_width, result) = renderer.run(job).await;
        document.apply(id, job_width, result);
    }

    Ok(lines_to_text(&document.lines(&theme)))
}

// ─────────────────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────────────────

pub fn run_config(show: bool, path: bool, reset: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show();
        Ok(())
    } else if reset {
        handle_config_reset()
    } else {
        // No flag provided, show help
        println!("Usage: tutorial-reader config [--show|--path|--reset]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --path    Show config file path");
        println!("  --reset   Reset config file to defaults");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("api_base_url = {:?}", config.api_base_url);
    println!("request_timeout_secs = {}", config.request_timeout_secs);
    println!("theme = {:?}", config.theme);
    println!("use_theme_background = {}", config.use_theme_background);
    println!();
    println!("[transition]");
    println!("fade_out_ms = {}", config.transition.fade_out_ms);
    println!("fade_in_ms = {}", config.transition.fade_in_ms);
    println!();
    println!("[diagram]");
    println!("tag = {:?}", config.diagram.tag);
    println!("glyphs = {:?}", config.diagram.glyphs.as_str());
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::default()
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::browser::model::fixtures::two_chapters;

    #[test]
    fn test_parse_target_plain_id() {
        assert_eq!(parse_target("demo").unwrap(), Route::root("demo"));
    }

    #[test]
    fn test_parse_target_github_url() {
        let route = parse_target("https://github.com/acme/engine.git").unwrap();
        assert_eq!(route, Route::root("engine"));
    }

    #[test]
    fn test_parse_target_deep_link() {
        let route = parse_target("/output/demo/02_engine.md").unwrap();
        assert_eq!(route, Route::lesson("demo", "02_engine.md"));

        let route = parse_target("output/demo").unwrap();
        assert_eq!(route, Route::root("demo"));
    }

    #[test]
    fn test_parse_target_rejects_empty() {
        assert!(parse_target("   ").is_err());
        assert!(parse_target("/output/").is_err());
    }

    #[test]
    fn test_cli_target_and_subcommands() {
        let cli = Cli::try_parse_from(["tutorial-reader", "demo"]).unwrap();
        assert_eq!(cli.target.as_deref(), Some("demo"));
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["tutorial-reader", "show", "demo", "--width", "60"]).unwrap();
        match cli.command {
            Some(Commands::Show { target, width }) => {
                assert_eq!(target, "demo");
                assert_eq!(width, 60);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["tutorial-reader", "config", "--path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config { path: true, .. })
        ));
    }

    #[test]
    fn test_subcommand_named_id_opens_as_deep_link() {
        let cli = Cli::try_parse_from(["tutorial-reader", "/output/toc"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.target.as_deref(), Some("/output/toc"));
        assert_eq!(parse_target("/output/toc").unwrap(), Route::root("toc"));

        // The bare word is taken as the subcommand
        let cli = Cli::try_parse_from(["tutorial-reader", "config"]).unwrap();
        assert!(cli.target.is_none());
        assert!(matches!(cli.command, Some(Commands::Config { .. })));
    }

    #[test]
    fn test_format_toc_numbers_chapters_and_lessons() {
        let toc = format_toc("demo", &two_chapters());

        assert!(toc.starts_with("demo Tutorial\n"));
        assert!(toc.contains("1. Intro\n"));
        assert!(toc.contains("   1.1 Welcome  (01_welcome.md)\n"));
        assert!(toc.contains("2. Core\n"));
        assert!(toc.contains("   2.1 Engine  (02_engine.md)\n"));
    }

    #[test]
    fn test_format_toc_empty_structure() {
        let toc = format_toc("demo", &TutorialStructure::default());
        assert!(toc.contains("No tutorial structure found."));
    }

    #[tokio::test]
    async fn test_render_lesson_defaults_to_first_lesson() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_structure("demo", two_chapters())
                .with_content("01_welcome.md", "# Welcome\n\nHello reader."),
        );

        let text = render_lesson(&Config::default(), backend.clone(), &Route::root("demo"), 60)
            .await
            .unwrap();

        assert!(text.contains("Welcome"));
        assert!(text.contains("Hello reader."));
        assert_eq!(backend.content_calls("02_engine.md"), 0);
    }

    #[tokio::test]
    async fn test_render_lesson_compiles_diagrams() {
        let body = "Intro\n\n```mermaid\ngraph LR\n  A[Parse] --> B[Emit]\n```\n";
        let backend = Arc::new(FakeBackend::new().with_content("02_engine.md", body));

        let text = render_lesson(
            &Config::default(),
            backend,
            &Route::lesson("demo", "02_engine.md"),
            60,
        )
        .await
        .unwrap();

        assert!(text.contains("Parse"));
        assert!(text.contains("Emit"));
        assert!(!text.contains("Rendering diagram"));
    }

    #[tokio::test]
    async fn test_render_lesson_missing_lesson_is_error() {
        let backend = Arc::new(FakeBackend::new());

        let result = render_lesson(
            &Config::default(),
            backend,
            &Route::lesson("demo", "nope.md"),
            60,
        )
        .await;

        assert!(result.is_err());
    }
}
