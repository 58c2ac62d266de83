use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log files live under the data directory, since the UI owns the terminal.
pub fn log_dir(base_dir: &Path) -> PathBuf {
    base_dir.join("logs")
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
///
/// Filter comes from `SCRTIME_LOG`, then `RUST_LOG`, default `info`.
pub fn init(base_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env("SCRTIME_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir(base_dir);
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!(
            "warning: failed to create log directory {:?}: {}",
            log_path, e
        );
        return None;
    }

    let appender = rolling::daily(&log_path, "scrtime.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("warning: logging was already initialized");
    }

    Some(guard)
}
