//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Test plan listing the ordered cases of each suite
    #[arg(long, global = true, default_value = "test_plan.yaml")]
    pub plan: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the complete API suite and write a report
    Full,

    /// Run the cleanup suite and write a report
    Cleanup,

    /// Run a single test case and print its result
    Case {
        /// API section (sub-directory of scripts and fixtures)
        section: String,

        /// Test-suite script file name
        suite: String,

        /// Fixture file name
        data: String,
    },

    /// Validate configuration, plan, scripts and fixtures without running
    Check,
}
