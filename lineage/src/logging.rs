//! File-backed tracing setup.
//!
//! The terminal belongs to the UI while it runs, so log output goes to
//! `<log_dir>/lineage.log` through a non-blocking writer. Verbosity follows
//! `RUST_LOG` (for example `RUST_LOG=lineage=debug,lineage_core=debug`) and
//! defaults to `info`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber.
///
/// Returns the log file path and the appender guard; dropping the guard
/// flushes pending lines, so keep it alive until shutdown.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created.
pub fn init(log_dir: &Path) -> anyhow::Result<(PathBuf, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("lineage.log");
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter)
        .init();

    Ok((log_path, guard))
}
