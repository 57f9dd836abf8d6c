//! Error types for the API automation harness
//!
//! Process-execution faults never show up here: the command runner folds
//! them into a failing `CommandOutput`. These errors cover configuration,
//! plan/fixture loading, per-case path problems and report writing.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Plan / Fixture Errors ===
    #[error("Invalid test plan: {0}")]
    Plan(String),

    #[error("Invalid test case {field} '{value}': must be a non-empty relative path without '..'")]
    InvalidCasePath { field: &'static str, value: String },

    #[error("Invalid fixture: {0}")]
    Fixture(String),

    // === Report Errors ===
    #[error("Report generation failed: {0}")]
    Report(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an invalid case path error
    pub fn invalid_case_path(field: &'static str, value: &str) -> Self {
        Self::InvalidCasePath {
            field,
            value: value.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
