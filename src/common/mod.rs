//! Common utilities shared by the automation core and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Format a duration the way reports show it, e.g. `3.14 s`
pub fn format_duration(duration: std::time::Duration) -> String {
    format!("{:.2} s", duration.as_secs_f64())
}
