//! CLI command handling
//!
//! Wires configuration into the automation core and formats output.

use std::collections::HashSet;
use std::path::Path;

use colored::Colorize;

use crate::automation::{
    CaseFlow, ClassificationPolicy, ShellRunner, SuiteRun, SuiteRunner, TestCaseResult,
    TestCaseSpec, TestExecutor, TestPlan, Verdict,
};
use crate::commands::{Commands, GlobalOptions};
use crate::common::config::Config;
use crate::common::{logging, Result};
use crate::fixture::Fixture;
use crate::report::HtmlReporter;

/// How a command ended, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything planned ran and passed
    Success,
    /// Something failed, but nothing was cut short
    Failures,
    /// A critical failure stopped the run
    Aborted,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failures => 1,
            Outcome::Aborted => 2,
        }
    }

    /// Outcome of a finished suite run
    pub fn of_run(run: &SuiteRun) -> Self {
        let summary = run.summary();
        if run.aborted.is_some() {
            Outcome::Aborted
        } else if summary.failed > 0 || run.errors > 0 || run.report.is_none() {
            Outcome::Failures
        } else {
            Outcome::Success
        }
    }
}

/// Which suite variant to run
#[derive(Debug, Clone, Copy)]
enum Suite {
    Full,
    Cleanup,
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, options: &GlobalOptions) -> Result<Outcome> {
    let config = Config::load(options.config.as_deref())?;

    match command {
        Commands::Full => run_suite(&config, &options.plan, Suite::Full).await,
        Commands::Cleanup => run_suite(&config, &options.plan, Suite::Cleanup).await,
        Commands::Case {
            section,
            suite,
            data,
        } => {
            logging::init_cli();
            let executor = build_executor(&config);
            let spec = TestCaseSpec::new(&section, &suite, &data);

            let (result, flow) = executor.execute(&spec).await?;
            print_result(&result);
            if let CaseFlow::Abort(reason) = &flow {
                println!("  {} {}", "critical:".red().bold(), reason);
            }

            Ok(match (result.result, flow) {
                (_, CaseFlow::Abort(_)) => Outcome::Aborted,
                (Verdict::Fail, _) => Outcome::Failures,
                (Verdict::Pass, _) => Outcome::Success,
            })
        }
        Commands::Check => {
            logging::init_cli();
            check(&config, &options.plan)
        }
    }
}

fn build_executor(config: &Config) -> TestExecutor<ShellRunner> {
    TestExecutor::new(
        ShellRunner::new(config.timeout()),
        config.base_command.clone(),
        &config.test_suite_base,
        config.input_path(),
        ClassificationPolicy::new(&config.policy),
    )
}

async fn run_suite(config: &Config, plan_path: &Path, suite: Suite) -> Result<Outcome> {
    let logs = logging::init_run(&config.log_dir);
    if let Some(path) = &logs.log_file {
        tracing::info!("Logging to {}", path.display());
    }

    let plan = TestPlan::load(plan_path)?;
    let runner = SuiteRunner::new(
        build_executor(config),
        HtmlReporter::new(&config.reports_dir, config.report_prefix.clone()),
    );

    let run = match suite {
        Suite::Full => runner.run_full(&plan.full).await,
        Suite::Cleanup => runner.run_cleanup(&plan.cleanup).await,
    };

    print_summary(&run);
    logs.finish();
    Ok(Outcome::of_run(&run))
}

fn print_result(result: &TestCaseResult) {
    let mark = match result.result {
        Verdict::Pass => "✓".green(),
        Verdict::Fail => "✗".red(),
    };
    println!(
        "  {} {}/{} {}",
        mark,
        result.section,
        result.test_case,
        format!("({})", result.duration).dimmed()
    );
    if !result.reason.is_empty() {
        for line in result.reason.lines() {
            println!("      {}", line.trim().dimmed());
        }
    }
}

fn print_summary(run: &SuiteRun) {
    let summary = run.summary();

    println!("\n{}", run.automation.kind.blue().bold());
    for result in &run.results {
        print_result(result);
    }

    println!();
    println!("  Planned:   {}", summary.total);
    if summary.is_partial() {
        println!("  Executed:  {}", summary.executed.to_string().yellow());
    } else {
        println!("  Executed:  {}", summary.executed);
    }
    println!("  Passed:    {}", summary.passed.to_string().green());
    println!("  Failed:    {}", summary.failed.to_string().red());
    if run.errors > 0 {
        println!("  Errors:    {}", run.errors.to_string().yellow());
    }
    println!("  Duration:  {}", run.total_duration);

    if let Some(reason) = &run.aborted {
        println!(
            "\n{} {} ({} of {} planned cases ran)",
            "Aborted:".red().bold(),
            reason,
            summary.executed,
            summary.total
        );
    }

    match &run.report {
        Some(path) => println!("\n{} {}", "Report:".cyan(), path.display()),
        None => println!("\n{}", "Report was not generated; see the log".red()),
    }
}

/// Validate everything a run needs and print one line per problem
fn check(config: &Config, plan_path: &Path) -> Result<Outcome> {
    let mut problems = 0usize;

    match config.resolve_base_program() {
        Ok(path) => println!("  {} base command: {}", "✓".green(), path.display()),
        Err(e) => {
            problems += 1;
            println!("  {} {}", "✗".red(), e);
        }
    }

    let plan = TestPlan::load(plan_path)?;
    println!(
        "  {} plan: {} full, {} cleanup cases",
        "✓".green(),
        plan.full.len(),
        plan.cleanup.len()
    );

    let executor = build_executor(config);
    let mut seen = HashSet::new();
    for spec in plan.full.iter().chain(plan.cleanup.iter()) {
        if !seen.insert(spec) {
            continue;
        }

        if let Err(e) = executor.build_command(spec) {
            problems += 1;
            println!("  {} {}: {}", "✗".red(), spec, e);
            continue;
        }

        let script = executor.script_path(spec);
        if !script.is_file() {
            problems += 1;
            println!("  {} {}: missing script {}", "✗".red(), spec, script.display());
        }

        let fixture_path = executor.fixture_path(spec);
        match Fixture::load(&fixture_path) {
            Ok(fixture) => {
                let found = fixture.problems();
                for problem in &found {
                    println!("  {} {}: {}", "✗".red(), fixture_path.display(), problem);
                }
                problems += found.len();

                if found.is_empty() {
                    let stats = fixture.stats();
                    println!(
                        "  {} {} {}",
                        "✓".green(),
                        spec,
                        format!(
                            "({} entries, {} calls, {} with body, {} uploads)",
                            stats.entries, stats.calls, stats.with_body, stats.with_upload
                        )
                        .dimmed()
                    );
                }
            }
            Err(e) => {
                problems += 1;
                println!("  {} {}", "✗".red(), e);
            }
        }
    }

    if problems == 0 {
        println!("\n{} {} test cases ready", "✓".green().bold(), seen.len());
        Ok(Outcome::Success)
    } else {
        println!("\n{} {} problem(s) found", "✗".red().bold(), problems);
        Ok(Outcome::Failures)
    }
}
