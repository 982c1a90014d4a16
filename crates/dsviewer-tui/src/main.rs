use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use dsviewer_core::config_file::{self, Settings};
use dsviewer_core::source::{SourceKind, build_source};
use dsviewer_core::{DatasetKind, Event};

mod action;
mod app;
mod input;
mod model;
mod theme;
mod view;

use app::App;

/// dsviewer: browse question-answering and multimodal datasets in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Dataset to open (defaults to the configured dataset for the kind)
    dataset: Option<String>,

    /// Dataset kind: qa or multimodal
    #[arg(long)]
    kind: Option<String>,

    /// Split to open (defaults to the first available)
    #[arg(long)]
    split: Option<String>,

    /// Dataset source: hub or local
    #[arg(long)]
    source: Option<String>,

    /// Root directory of local datasets (<root>/<name>/<split>.jsonl)
    #[arg(long)]
    local_root: Option<PathBuf>,

    /// Hub dataset config (subset) to use
    #[arg(long)]
    config_name: Option<String>,

    /// Maximum rows fetched per split from the hub
    #[arg(long)]
    max_rows: Option<usize>,

    /// Folder of images to browse for multimodal datasets
    #[arg(long)]
    image_folder: Option<String>,

    /// Read settings from this file instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,
}

/// Log to a daily file under the cache dir; the terminal belongs to the UI.
fn init_logging() -> Option<WorkerGuard> {
    let dir = dirs::cache_dir()?.join("dsviewer").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::daily(dir, "dsviewer-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_env("DSVIEWER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

/// Resolve settings: CLI flags > env vars > config file > defaults.
fn resolve_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let file = match &args.config {
        Some(path) => config_file::load_explicit(path)?,
        None => config_file::load_config(),
    };
    settings.apply_file(&file);
    settings.apply_env();

    if let Some(source) = &args.source {
        settings.source.kind = SourceKind::parse(source)
            .ok_or_else(|| anyhow::anyhow!("unknown source '{}': use hub or local", source))?;
    }
    if let Some(root) = &args.local_root {
        settings.source.local_root = Some(root.clone());
    }
    if let Some(name) = &args.config_name {
        settings.source.config_name = Some(name.clone());
    }
    if let Some(rows) = args.max_rows {
        settings.source.max_rows = rows.max(1);
    }
    if let Some(folder) = &args.image_folder {
        settings.image_folder = folder.clone();
    }
    if let Some(theme) = &args.theme {
        settings.theme = theme.clone();
    }
    Ok(settings)
}

/// Session events implied by the command line, applied before the first render.
fn startup_events(args: &Args) -> anyhow::Result<Vec<Event>> {
    let mut events = Vec::new();
    if let Some(kind) = &args.kind {
        let kind = DatasetKind::parse(kind)
            .ok_or_else(|| anyhow::anyhow!("unknown kind '{}': use qa or multimodal", kind))?;
        events.push(Event::SetKind(kind));
    }
    if let Some(name) = &args.dataset {
        events.push(Event::SetName(name.clone()));
    }
    if let Some(split) = &args.split {
        events.push(Event::SetSplit(split.clone()));
    }
    Ok(events)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging();

    let settings = resolve_settings(&args)?;
    let events = startup_events(&args)?;
    let source = build_source(&settings.source)?;
    tracing::info!(
        "starting with source {} (qa: {}, multimodal: {})",
        source.name(),
        settings.qa_dataset,
        settings.multimodal_dataset
    );

    let theme = theme::Theme::by_name(&settings.theme);
    let tick_rate = Duration::from_millis(1000 / u64::from(settings.fps.max(1)));

    let mut app = App::new(settings, theme, source.name());
    for event in events {
        app.push_event(event);
    }

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    if let Ok(size) = terminal.size() {
        app.update(action::Action::Resize(size.width, size.height));
    }

    loop {
        // Each interaction re-runs the render pass; draw a loading frame first
        if app.has_pending() {
            app.loading = true;
            terminal.draw(|f| app.view(f))?;
            app.dispatch(source.as_ref()).await;
        }

        terminal.draw(|f| app.view(f))?;

        if event::poll(tick_rate).unwrap_or(false)
            && let Ok(evt) = event::read()
        {
            let action = input::map_event(&evt, &app.input_mode);
            app.update(action);
        }
        app.update(action::Action::Tick);

        if app.should_quit {
            break;
        }
    }

    restore_terminal()?;
    terminal.show_cursor()?;
    Ok(())
}
