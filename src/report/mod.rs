//! Report generation
//!
//! Aggregates per-case results into summary counts and renders them into a
//! self-contained HTML document, one fresh file per suite run.

mod html;

use std::path::PathBuf;

use crate::automation::types::{AutomationType, TestCaseResult, Verdict};
use crate::common::Result;

pub use html::{render, HtmlReporter};

/// Summary counts of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    /// Planned cases of the automation type
    pub total: usize,
    /// Cases that produced a result
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
}

impl ReportSummary {
    pub fn from_results(results: &[TestCaseResult], automation: &AutomationType) -> Self {
        let passed = results.iter().filter(|r| r.result == Verdict::Pass).count();
        let failed = results.iter().filter(|r| r.result == Verdict::Fail).count();
        Self {
            total: automation.total_test_cases,
            executed: results.len(),
            passed,
            failed,
        }
    }

    /// Whether fewer cases ran than were planned
    pub fn is_partial(&self) -> bool {
        self.executed < self.total
    }
}

/// Run metadata shown in the report header
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub automation: AutomationType,
    pub total_duration: String,
    pub start_date: String,
}

/// Sink for a finished run's results
pub trait Reporter {
    /// Write the report and return where it went
    fn generate(&self, results: &[TestCaseResult], run: &RunInfo) -> Result<PathBuf>;
}
