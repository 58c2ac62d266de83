mod config;
mod lifecycle;
mod logging;
mod models;
mod report;
mod storage;
mod tracker;
mod tui;
mod utils;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fd_lock::RwLock;
use models::LifecycleState;
use report::Reporter;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use storage::{FileStore, KeyValueStore};
use tracing::info;
use tracker::{Tracker, Transition};
use utils::format_elapsed;

#[derive(Parser)]
#[command(name = "scrtime")]
#[command(about = "Counts how long this app has been in the foreground today", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the timer screen; time counts while the terminal has focus
    Run {
        /// Redraw interval (e.g. 250ms, 1s)
        #[arg(short, long)]
        refresh: Option<String>,
    },
    /// Print today's total without modifying anything
    Show,
    /// Read lifecycle states (active, inactive, background) from stdin, one per line
    Pipe {
        /// Lifecycle state the process starts in
        #[arg(long, default_value = "background")]
        initial: LifecycleState,
    },
    /// Reset today's total to zero
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_dir = FileStore::get_base_dir()?;
    let _log_guard = logging::init(&base_dir);
    let config = config::load_config(&base_dir)?;
    let store = FileStore::new()?;

    // Everything except `show` writes to the store.
    let mut lock = RwLock::new(open_lock_file(&base_dir)?);
    let _guard = match cli.command {
        Commands::Show => None,
        _ => Some(lock.try_write().map_err(|_| {
            anyhow::anyhow!("Another instance of scrtime is already running. Please close it before starting a new one.")
        })?),
    };

    match cli.command {
        Commands::Run { refresh } => {
            let refresh = match refresh {
                Some(raw) => config::parse_interval(&raw)?,
                None => config.refresh_interval()?,
            };
            let stop = lifecycle::install_stop_handler()?;

            // Launched from the terminal the user is looking at.
            let mut tracker = Tracker::new(store, config.date_basis, LifecycleState::Active);
            let outcome = tracker.initialize(Utc::now());
            info!(?outcome, total_ms = tracker.daily_total_ms, "Timer started");

            tui::run_tui(&mut tracker, refresh, &stop)?;

            tracker.shutdown(Utc::now());
            println!("Screen time today: {}", format_elapsed(tracker.daily_total_ms));
        }
        Commands::Show => {
            let reporter = Reporter::new(store, config.date_basis);
            reporter.report(Utc::now())?;
        }
        Commands::Pipe { initial } => {
            let stop = lifecycle::install_stop_handler()?;

            let mut tracker = Tracker::new(store, config.date_basis, initial);
            let outcome = tracker.initialize(Utc::now());
            info!(?outcome, %initial, "Reading lifecycle states from stdin");

            run_pipe(&mut tracker, &stop);

            tracker.shutdown(Utc::now());
            println!("Screen time today: {}", format_elapsed(tracker.daily_total_ms));
        }
        Commands::Reset => {
            let mut tracker =
                Tracker::new(store, config.date_basis, LifecycleState::Background);
            tracker.reset(Utc::now());
            println!("Screen time today: {}", format_elapsed(tracker.daily_total_ms));
        }
    }

    Ok(())
}

fn run_pipe<S: KeyValueStore>(tracker: &mut Tracker<S>, stop: &AtomicBool) {
    let states = lifecycle::spawn_stdin_reader();

    while !stop.load(Ordering::SeqCst) {
        match states.recv_timeout(Duration::from_millis(200)) {
            Ok(state) => {
                if let Transition::SessionEnded { elapsed_ms } =
                    tracker.on_lifecycle_change(state, Utc::now())
                {
                    info!(elapsed_ms, total_ms = tracker.daily_total_ms, "Session ended");
                    println!("{}", format_elapsed(tracker.daily_total_ms));
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn open_lock_file(base_dir: &Path) -> Result<File> {
    let lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(base_dir.join("scrtime.lock"))?;
    Ok(lock_file)
}
