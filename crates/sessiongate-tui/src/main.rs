//! sessiongate - terminal login and dashboard for a bearer-token backend.
//!
//! Without arguments this opens the TUI: a login form that exchanges
//! credentials for a token, and a dashboard that verifies the stored token.
//! `login`, `verify`, `logout` and `status` run one operation and exit.

mod app;
mod commands;
mod ui;
mod utils;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sessiongate_core::Config;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "sessiongate.log";

const USAGE: &str = "\
Usage: sessiongate [COMMAND]

Commands:
  (none)            Open the login/dashboard TUI
  login [USERNAME]  Log in and store the session token
  verify            Check the stored token against the backend
  logout            Remove the stored token
  status            Show whether a token is stored

Environment:
  SESSIONGATE_API_URL    Backend base URL
  SESSIONGATE_USERNAME   Prefill the username
  SESSIONGATE_PASSWORD   Use this password instead of prompting
  RUST_LOG               Log filter (default: warn)";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr (one-shot commands)
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file while the TUI owns the terminal
fn init_file_tracing(log_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

/// Load config with env overrides, handing back any load error so it can be
/// logged once a subscriber exists
fn read_config() -> (Config, Option<anyhow::Error>) {
    let (config, err) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    (config.with_env_overrides(), err)
}

fn warn_config_error(err: Option<anyhow::Error>) {
    if let Some(e) = err {
        warn!(error = %e, "Failed to load config, using defaults");
    }
}

fn load_config() -> Config {
    let (config, err) = read_config();
    warn_config_error(err);
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    if command.is_some() {
        init_stderr_tracing();
    }

    let result = match command {
        None => run_tui().await,
        Some("login") => commands::login(load_config(), args.get(1).cloned()).await,
        Some("verify") => commands::verify(&load_config()).await,
        Some("logout") => commands::logout(&load_config()).await,
        Some("status") => commands::status(&load_config()),
        Some("-h") | Some("--help") | Some("help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        if command.is_some() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return Err(e);
    }
    Ok(())
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Restore the terminal before printing a panic, and log it
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        error!(panic = %panic_info, "Unhandled panic");
        default_hook(panic_info);
    }));
}

async fn run_tui() -> Result<()> {
    let (config, config_err) = read_config();

    let _log_guard = match config.cache_dir() {
        Ok(dir) if std::fs::create_dir_all(&dir).is_ok() => Some(init_file_tracing(&dir)),
        _ => None,
    };
    warn_config_error(config_err);
    info!(api = %config.api_base_url, "sessiongate starting");

    let mut app = App::new(config)?;
    app.start();

    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    restore_terminal();
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "TUI exited with error");
    }
    info!("sessiongate shutting down");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Run a queued request after drawing, so the loading state is visible
        if app.has_pending_action() {
            app.run_pending().await;
            continue;
        }

        // Poll for events with timeout so timers keep firing
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Delayed navigation and banner dismissal
        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
