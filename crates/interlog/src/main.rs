//! interlog - log interruptions, see where the time went
//!
//! Usage:
//!   interlog                     Open the interactive UI
//!   interlog add [--start T]     Log an interruption
//!   interlog history             List logged interruptions
//!   interlog delete ID           Remove an interruption
//!   interlog stats               Show statistics
//!   interlog analyze             Ask the AI consultant

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use interlog_core::{Config, Paths};
use ratatui::prelude::*;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use interlog::app::App;
use interlog::display::{render_history, render_summary, Colors};
use interlog::form::TrackerForm;
use interlog::stats::aggregate;
use interlog::store::SessionStore;
use interlog::summarizer::Summarizer;
use interlog::ui;

/// interlog - log interruptions, see where the time went
#[derive(Parser)]
#[command(name = "interlog")]
#[command(about = "Log interruptions and see where the time went")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    Someone walked over "just for a minute". Log it afterwards with a start
    and end time and a topic, then look at the damage on the dashboard.

EXAMPLES:
    interlog                                   # Interactive UI
    interlog add                               # Last 15 minutes, random topic
    interlog add --start 2024-01-01T09:00 --end 2024-01-01T09:20 --note "Lunch"
    interlog history --limit 10                # Ten most recent
    interlog delete 3f2a9c1e                   # Delete by id prefix
    interlog stats --json                      # Statistics as JSON
    interlog analyze                           # AI commentary

CONFIGURATION:
    ~/.config/interlog/config.toml
    GEMINI_API_KEY (or API_KEY) enables the AI analysis.
    RUST_LOG controls log verbosity (default: warn).

ALIASES:
    interlog a      # add
    interlog ls     # history
    interlog rm     # delete
"#)]
struct Cli {
    /// Store data in this directory instead of the default
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive UI (default)
    Tui,

    /// Log an interruption
    #[command(alias = "a")]
    Add {
        /// Start time, YYYY-MM-DDTHH:MM (default: 15 minutes ago)
        #[arg(long)]
        start: Option<String>,

        /// End time, YYYY-MM-DDTHH:MM (default: now)
        #[arg(long)]
        end: Option<String>,

        /// What it was about (default: a random topic)
        #[arg(long)]
        note: Option<String>,
    },

    /// List logged interruptions, newest first
    #[command(alias = "ls")]
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete an interruption by id (or unique id prefix)
    #[command(alias = "rm")]
    Delete {
        /// Session id or prefix
        id: String,
    },

    /// Show statistics
    #[command(alias = "dashboard")]
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the AI consultant about recent interruptions
    Analyze,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_paths = Paths::new();
    let config = Config::load(&config_paths.config_file())?;

    let paths = match cli.data_dir.clone().or_else(|| config.data_dir.clone()) {
        Some(dir) => config_paths.with_data_dir(dir),
        None => config_paths,
    };

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(&paths, interactive)?;

    let mut store = SessionStore::open(&paths.sessions_file())?;

    match cli.command {
        None | Some(Commands::Tui) => cmd_tui(store, &config),
        Some(Commands::Add { start, end, note }) => cmd_add(&mut store, start, end, note),
        Some(Commands::History { json, limit }) => cmd_history(&store, json, limit),
        Some(Commands::Delete { id }) => cmd_delete(&mut store, &id),
        Some(Commands::Stats { json }) => cmd_stats(&store, json),
        Some(Commands::Analyze) => cmd_analyze(&store, &config),
    }
}

/// Log to stderr for commands, to a file for the TUI
fn init_logging(paths: &Paths, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if interactive {
        std::fs::create_dir_all(&paths.data).with_context(|| {
            format!("Failed to create data directory: {}", paths.data.display())
        })?;
        let log_path = paths.log_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

/// Run the interactive UI
fn cmd_tui(store: SessionStore, config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let summarizer = Summarizer::from_config(&config.summarizer);
    let mut app = App::new(store, summarizer, rt.handle().clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Local::now(), Instant::now());
                }
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Log an interruption without the UI
fn cmd_add(
    store: &mut SessionStore,
    start: Option<String>,
    end: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let colors = Colors::auto();
    let now = Local::now();

    let mut form = TrackerForm::new(now);
    if let Some(start) = start {
        form.start = start;
    }
    if let Some(end) = end {
        form.end = end;
    }
    if let Some(note) = note {
        form.note = note;
    }

    let session = form.submit(now)?;
    let summary = format!(
        "{} ({})",
        interlog_core::format::format_minutes_seconds(session.duration),
        session.note
    );
    let short_id = session.short_id();
    store.add(session)?;

    println!("{}[ok]{} Entry saved: {}", colors.green, colors.reset, summary);
    println!("  {}id:{} {}", colors.dim, colors.reset, short_id);

    Ok(())
}

/// List sessions newest first
fn cmd_history(store: &SessionStore, json: bool, limit: Option<usize>) -> Result<()> {
    if json {
        let mut sessions = store.sessions().to_vec();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions.truncate(limit.unwrap_or(usize::MAX));
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if store.sessions().is_empty() {
        println!("No history available.");
        return Ok(());
    }

    print!("{}", render_history(store.sessions(), limit, &Colors::auto()));
    Ok(())
}

/// Delete by id or unique prefix; an unknown id changes nothing
fn cmd_delete(store: &mut SessionStore, id: &str) -> Result<()> {
    let colors = Colors::auto();

    let matches: Vec<String> = store
        .find_by_prefix(id)
        .into_iter()
        .map(|s| s.id.clone())
        .collect();

    match matches.as_slice() {
        [] => {
            println!("{}[info]{} No session matches '{}'", colors.cyan, colors.reset, id);
            Ok(())
        }
        [full_id] => {
            store.remove(full_id)?;
            println!("{}[ok]{} Deleted {}", colors.green, colors.reset, full_id);
            Ok(())
        }
        _ => bail!(
            "'{}' matches {} sessions, use a longer prefix",
            id,
            matches.len()
        ),
    }
}

/// Show statistics
fn cmd_stats(store: &SessionStore, json: bool) -> Result<()> {
    let summary = aggregate(store.sessions());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary, &Colors::auto()));
    }

    Ok(())
}

/// Print AI commentary on recent sessions
fn cmd_analyze(store: &SessionStore, config: &Config) -> Result<()> {
    let colors = Colors::auto();
    let summarizer = Summarizer::from_config(&config.summarizer);

    let rt = tokio::runtime::Runtime::new()?;
    let text = rt.block_on(summarizer.summarize(store.sessions()));

    println!("{}AI Consultant Analysis{}", colors.bold, colors.reset);
    println!();
    println!("{}", text);

    Ok(())
}
