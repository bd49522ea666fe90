//! pocket - terminal calculator and task list
//!
//! `pocket calc` opens the calculator, `pocket todo` the task list. State is
//! kept in JSON files under the data directory and reloaded on the next run.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pocket::application::{CalculatorApp, TodoApp};
use pocket::infrastructure::{Config, DATA_DIR_ENV, FileStore, KeyValueStore, MemoryStore};
use pocket::presentation::{Control, Screen};

/// Environment variable holding a log filter directive.
const LOG_ENV: &str = "POCKET_LOG";

/// How long the event loop waits for input when no timer is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "pocket", version, about = "Terminal calculator and task list")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: <config dir>/pocket/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for saved history, tasks and the log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is loaded or saved
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    /// Calculator with operation history
    #[default]
    Calc,
    /// Task list
    Todo,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if config.log.enabled && !args.ephemeral {
        init_logging(&config, args.debug);
    }

    let command = args.command.unwrap_or_default();
    info!(?command, data_dir = %config.resolved_data_dir().display(), "Starting pocket");

    let store = open_store(&config, args.ephemeral);
    let mut screen: Box<dyn Screen> = match command {
        Command::Calc => Box::new(CalculatorApp::new(store, config.error_display())),
        Command::Todo => Box::new(TodoApp::new(
            store,
            config.resolved_data_dir().join("todos.csv"),
        )),
    };

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, screen.as_mut());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "Event loop failed");
        println!("{err:?}");
    }
    info!("Exiting pocket");

    Ok(())
}

/// Resolves the configuration: explicit file, else the default location,
/// then the environment and command-line overrides.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path, true)?,
        None => match Config::default_path() {
            Some(path) => Config::load(&path, false).unwrap_or_else(|e| {
                eprintln!("pocket: {e}; using defaults");
                Config::default()
            }),
            None => Config::default(),
        },
    };

    config.apply_env(std::env::var(DATA_DIR_ENV).ok());
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Sends tracing output to the log file in the data directory.
///
/// The terminal belongs to the UI, so nothing is logged to stdout. Logging
/// is skipped if the file cannot be opened.
fn init_logging(config: &Config, debug: bool) {
    let path = config.log_file_path();
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("pocket: logging disabled, cannot create {}: {e}", parent.display());
            return;
        }
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("pocket: logging disabled, cannot open {}: {e}", path.display());
            return;
        }
    };

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log.level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn open_store(config: &Config, ephemeral: bool) -> Box<dyn KeyValueStore> {
    if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(config.resolved_data_dir()))
    }
}

/// Main event loop.
///
/// Redraws after every event, and wakes up early when the screen has a
/// timer pending so that it fires on time.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, screen: &mut dyn Screen) -> io::Result<()> {
    loop {
        terminal.draw(|f| screen.draw(f))?;

        let timeout = screen
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| {
                deadline.saturating_duration_since(Instant::now()).min(IDLE_POLL)
            });

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && screen.handle_key(key.code, key.modifiers, Instant::now()) == Control::Quit
                {
                    return Ok(());
                }
            }
        }

        screen.tick(Instant::now());
    }
}
