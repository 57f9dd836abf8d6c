//! Logging and tracing configuration
//!
//! Suite runs log to stderr and to a per-run log file. The file writer is
//! non-blocking, so the returned [`RunLogging`] must be held until the run
//! ends; dropping it flushes and closes the file.
//!
//! The executor and suite runner emit through the `tracing` macros and
//! never receive the context directly: the installed subscriber routes
//! their events, and [`RunLogging`] only owns the file's lifetime.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "api_harness=info,warn";

/// Logging context for one suite run
pub struct RunLogging {
    /// Path of the run's log file, if file logging is active
    pub log_file: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl RunLogging {
    /// Flush and close the log file
    pub fn finish(self) {
        if let Some(path) = &self.log_file {
            tracing::debug!("Closing run log {}", path.display());
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
}

/// Initialize tracing for short commands (stderr logging only)
pub fn init_cli() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer())
        .try_init();
}

/// Initialize tracing for a suite run (stderr + log file)
///
/// The log file is `<log_dir>/harness_<YYYYMMDD_HHMMSS>.log`. When the
/// directory or file cannot be created, logging falls back to stderr only.
pub fn init_run(log_dir: &Path) -> RunLogging {
    let file_name = format!("harness_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));

    let file = paths::ensure_dir(log_dir).and_then(|dir| {
        let path = dir.join(&file_name);
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map(|file| (path, file))
    });

    match file {
        Ok((path, file)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(file_layer)
                .with(stderr_layer())
                .try_init();

            RunLogging {
                log_file: Some(path),
                _guard: Some(guard),
            }
        }
        Err(e) => {
            eprintln!("Warning: Could not open log file in '{}': {}", log_dir.display(), e);
            init_cli();
            RunLogging {
                log_file: None,
                _guard: None,
            }
        }
    }
}
