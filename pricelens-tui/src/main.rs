//! PriceLens TUI: interactive stock price dashboard.
//!
//! Sidebar widgets drive a pure render function on a worker thread; the main
//! thread only draws and dispatches keys.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::event::{self, Event};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pricelens_core::config::DashboardConfig;
use pricelens_core::data::{CircuitBreaker, DataProvider, SyntheticProvider, YahooProvider};
use pricelens_tui::app::AppState;
use pricelens_tui::terminal::{self, Tui};
use pricelens_tui::worker::{self, WorkerCommand};
use pricelens_tui::{input, ui};

const APP_DIR: &str = "pricelens";

#[derive(Parser, Debug)]
#[command(
    name = "pricelens-tui",
    about = "PriceLens: interactive stock price dashboard"
)]
struct Args {
    /// Use the synthetic provider: no network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Path to a TOML config file. Defaults to the user config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    terminal::install_panic_hook();

    init_logging(dirs::data_local_dir().map(|d| d.join(APP_DIR)).as_deref());

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!(path = %config_path.display(), "config loaded");

    let provider = build_provider(&config, args.offline)?;

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(provider, config.name_table(), cmd_rx, resp_tx)
        .context("spawning worker thread")?;

    let mut app = AppState::new(&config, Local::now().date_naive(), cmd_tx.clone(), resp_rx);
    app.request_render();

    let mut tui = terminal::enter()?;
    let result = run_app(&mut tui, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    terminal::restore()?;
    result
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

fn run_app(tui: &mut Tui, app: &mut AppState) -> Result<()> {
    loop {
        // 1. Render
        tui.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn build_provider(config: &DashboardConfig, offline: bool) -> Result<Box<dyn DataProvider>> {
    if offline {
        info!("using synthetic provider");
        return Ok(Box::new(SyntheticProvider::new()));
    }
    let breaker = Arc::new(CircuitBreaker::new(config.provider.breaker_cooldown()));
    let yahoo = YahooProvider::new(&config.provider, breaker).context("building Yahoo provider")?;
    Ok(Box::new(yahoo))
}

/// Log to `<dir>/pricelens.log`; the terminal belongs to the UI. Without a
/// writable directory the session runs unlogged.
fn init_logging(dir: Option<&Path>) {
    let Some(dir) = dir else {
        return;
    };
    let file = fs::create_dir_all(dir).and_then(|_| File::create(dir.join("pricelens.log")));
    let Ok(file) = file else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
