//! Test automation core
//!
//! Each test case is an external script run against one JSON fixture.
//! The executor classifies every run as PASS/FAIL and flags critical
//! failures; the suite runner sequences cases in declaration order and
//! stops when a critical failure is flagged.

pub mod executor;
pub mod plan;
pub mod policy;
pub mod runner;
pub mod suite;
pub mod types;

pub use executor::{extract_reason, TestExecutor};
pub use plan::TestPlan;
pub use policy::{ClassificationPolicy, FixtureKind, RestMethod};
pub use runner::{CommandRunner, ShellRunner};
pub use suite::{SuiteRun, SuiteRunner};
pub use types::*;
