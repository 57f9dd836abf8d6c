//! API automation harness
//!
//! Runs ordered integration test cases (external scripts against JSON
//! fixtures), classifies each outcome, stops on critical failures and
//! writes an HTML report per run.

pub mod automation;
pub mod cli;
pub mod commands;
pub mod common;
pub mod fixture;
pub mod report;

// Re-export commonly used types for tests
pub use automation::{TestCaseResult, TestCaseSpec, Verdict};
pub use common::{Error, Result};
