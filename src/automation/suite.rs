//! Suite runner
//!
//! Walks an ordered case list through the executor, stops early on a
//! critical failure, and hands the collected results to the reporter.
//! Per-case errors are logged and skipped; only a critical failure stops
//! the run.

use std::path::PathBuf;
use std::time::Instant;

use crate::common::format_duration;
use crate::report::{ReportSummary, Reporter, RunInfo};

use super::executor::TestExecutor;
use super::runner::CommandRunner;
use super::types::{AutomationType, CaseFlow, TestCaseResult, TestCaseSpec};

/// Everything a finished suite run produced
#[derive(Debug)]
pub struct SuiteRun {
    pub automation: AutomationType,
    /// Results in execution order
    pub results: Vec<TestCaseResult>,
    /// Why the run stopped early, if it did
    pub aborted: Option<String>,
    /// Cases that raised an error instead of producing a result
    pub errors: usize,
    pub start_date: String,
    pub total_duration: String,
    /// Report location; `None` when report generation failed
    pub report: Option<PathBuf>,
}

impl SuiteRun {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_results(&self.results, &self.automation)
    }
}

/// Runs suites of test cases and reports them
pub struct SuiteRunner<R, P> {
    executor: TestExecutor<R>,
    reporter: P,
}

impl<R: CommandRunner, P: Reporter> SuiteRunner<R, P> {
    pub fn new(executor: TestExecutor<R>, reporter: P) -> Self {
        Self { executor, reporter }
    }

    /// Run the complete API suite
    pub async fn run_full(&self, specs: &[TestCaseSpec]) -> SuiteRun {
        self.run(AutomationType::full(specs.len()), specs).await
    }

    /// Run the cleanup suite
    pub async fn run_cleanup(&self, specs: &[TestCaseSpec]) -> SuiteRun {
        self.run(AutomationType::cleanup(specs.len()), specs).await
    }

    /// Run cases in declaration order, then generate the report
    pub async fn run(&self, automation: AutomationType, specs: &[TestCaseSpec]) -> SuiteRun {
        tracing::info!(
            "{} started with {} planned test cases",
            automation.kind,
            specs.len()
        );

        let start_date = chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string();
        let started = Instant::now();

        let mut results = Vec::with_capacity(specs.len());
        let mut aborted = None;
        let mut errors = 0;

        for spec in specs {
            tracing::info!("Test case: {}", spec);
            match self.executor.execute(spec).await {
                Ok((result, flow)) => {
                    results.push(result);
                    if let CaseFlow::Abort(reason) = flow {
                        tracing::error!(
                            "Critical failure in {}: {}. Stopping automation.",
                            spec.data_file,
                            reason
                        );
                        aborted = Some(reason);
                        break;
                    }
                }
                Err(e) => {
                    errors += 1;
                    tracing::error!("Exception in test case {}: {}", spec, e);
                }
            }
        }

        let total_duration = format_duration(started.elapsed());
        tracing::info!(
            "Executed {} of {} test cases in {}",
            results.len(),
            specs.len(),
            total_duration
        );

        let run = RunInfo {
            automation: automation.clone(),
            total_duration: total_duration.clone(),
            start_date: start_date.clone(),
        };

        tracing::info!("Report generation started.");
        let report = match self.reporter.generate(&results, &run) {
            Ok(path) => {
                tracing::info!(
                    "Report generation completed. Report saved at: {}",
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                tracing::error!("Report generation failed: {}", e);
                None
            }
        };

        SuiteRun {
            automation,
            results,
            aborted,
            errors,
            start_date,
            total_duration,
            report,
        }
    }
}
