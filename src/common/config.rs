//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{self, config_path};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Command prefix used to invoke a test-suite script
    #[serde(default = "default_base_command")]
    pub base_command: String,

    /// Root directory of the JSON fixtures
    #[serde(default = "default_input_base")]
    pub input_base: PathBuf,

    /// Fixture set below `input_base` shared by all suites
    #[serde(default = "default_input_set")]
    pub input_set: String,

    /// Root directory of the test-suite scripts
    #[serde(default = "default_test_suite_base")]
    pub test_suite_base: PathBuf,

    /// Hard timeout for one test-suite process
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Directory receiving the HTML reports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Directory receiving the per-run log files
    #[serde(default = "paths::default_log_dir")]
    pub log_dir: PathBuf,

    /// File name prefix of the HTML reports
    #[serde(default = "default_report_prefix")]
    pub report_prefix: String,

    /// Classification special cases
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_command: default_base_command(),
            input_base: default_input_base(),
            input_set: default_input_set(),
            test_suite_base: default_test_suite_base(),
            timeout_secs: default_timeout(),
            reports_dir: default_reports_dir(),
            log_dir: paths::default_log_dir(),
            report_prefix: default_report_prefix(),
            policy: PolicyConfig::default(),
        }
    }
}

fn default_base_command() -> String {
    "python3 -m pytest -s".to_string()
}
fn default_input_base() -> PathBuf {
    PathBuf::from("inputs")
}
fn default_input_set() -> String {
    "full_api_test".to_string()
}
fn default_test_suite_base() -> PathBuf {
    PathBuf::from("test_suite")
}
fn default_timeout() -> u64 {
    20
}
fn default_reports_dir() -> PathBuf {
    PathBuf::from("outputs").join("reports")
}
fn default_report_prefix() -> String {
    "test_report_".to_string()
}

/// Fixture and suite names that bend the normal pass/fail rules
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    /// Fixtures whose scenario passes when the test process fails
    #[serde(default = "default_inverted_fixtures")]
    pub inverted_fixtures: Vec<String>,

    /// Section holding expected-error tests; failures there never abort
    #[serde(default = "default_negative_section")]
    pub negative_section: String,

    /// Suite files that never abort the run
    #[serde(default = "default_critical_exempt_suites")]
    pub critical_exempt_suites: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            inverted_fixtures: default_inverted_fixtures(),
            negative_section: default_negative_section(),
            critical_exempt_suites: default_critical_exempt_suites(),
        }
    }
}

fn default_inverted_fixtures() -> Vec<String> {
    vec![
        "test_instantiateDeploymentBeforeApprove.json".to_string(),
        "test_terminateDeploymentBeforeInstantiate.json".to_string(),
    ]
}
fn default_negative_section() -> String {
    "negative_error_codes".to_string()
}
fn default_critical_exempt_suites() -> Vec<String> {
    vec!["test_postClusterProviderNeg422.py".to_string()]
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default config file is
    /// used when present, otherwise defaults. Environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply environment overrides through the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BASE_COMMAND") {
            self.base_command = value;
        }
        if let Some(value) = lookup("INPUT_BASE") {
            self.input_base = PathBuf::from(value);
        }
        if let Some(value) = lookup("TEST_SUITE_BASE") {
            self.test_suite_base = PathBuf::from(value);
        }
        if let Some(value) = lookup("COMMAND_EXEC_TIMEOUT") {
            self.timeout_secs = value.trim().parse().map_err(|e| {
                Error::Config(format!(
                    "COMMAND_EXEC_TIMEOUT '{}' is not a number: {}",
                    value, e
                ))
            })?;
        }
        if let Some(value) = lookup("REPORTS_DIR") {
            self.reports_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("LOG_PATH") {
            self.log_dir = PathBuf::from(value);
        }
        Ok(())
    }

    /// Directory holding the fixtures of the configured input set
    pub fn input_path(&self) -> PathBuf {
        self.input_base.join(&self.input_set)
    }

    /// Process timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Program named by the base command, resolved on PATH
    pub fn resolve_base_program(&self) -> Result<PathBuf> {
        let program = self
            .base_command
            .split_whitespace()
            .next()
            .ok_or_else(|| Error::Config("base_command is empty".to_string()))?;
        which::which(program)
            .map_err(|e| {
                Error::Config(format!("base command '{}' not found: {}", program, e))
            })
    }
}
