//! Test case executor
//!
//! Builds the command for one (section, suite file, data file) triple,
//! runs it, classifies the outcome and decides whether the failure is
//! critical enough to stop the suite.

use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use crate::common::{format_duration, Error, Result};

use super::policy::{ClassificationPolicy, FixtureKind, RestMethod};
use super::runner::CommandRunner;
use super::types::{CaseFlow, TestCaseResult, TestCaseSpec, Verdict};

/// Output line offsets carrying the failure detail of a test process
const REASON_LINES: [usize; 4] = [6, 8, 9, 11];

/// Separator placed between the extracted reason lines
const REASON_SEPARATOR: &str = " \n ";

/// Runs single test cases against a command runner
pub struct TestExecutor<R> {
    runner: R,
    base_command: String,
    test_suite_path: PathBuf,
    input_path: PathBuf,
    policy: ClassificationPolicy,
}

impl<R: CommandRunner> TestExecutor<R> {
    pub fn new(
        runner: R,
        base_command: impl Into<String>,
        test_suite_path: impl Into<PathBuf>,
        input_path: impl Into<PathBuf>,
        policy: ClassificationPolicy,
    ) -> Self {
        Self {
            runner,
            base_command: base_command.into(),
            test_suite_path: test_suite_path.into(),
            input_path: input_path.into(),
            policy,
        }
    }

    #[cfg(test)]
    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    /// Location of the script a case runs
    pub fn script_path(&self, spec: &TestCaseSpec) -> PathBuf {
        self.test_suite_path
            .join(&spec.section)
            .join(&spec.test_suite_file)
    }

    /// Location of the fixture a case reads
    pub fn fixture_path(&self, spec: &TestCaseSpec) -> PathBuf {
        self.input_path.join(&spec.section).join(&spec.data_file)
    }

    /// Full shell command for a case
    pub fn build_command(&self, spec: &TestCaseSpec) -> Result<String> {
        validate_component("section", &spec.section)?;
        validate_component("test suite file", &spec.test_suite_file)?;
        validate_component("data file", &spec.data_file)?;

        let script = self.script_path(spec);
        let input = self.fixture_path(spec);
        Ok(format!(
            "{} {} --input-path-api={}",
            self.base_command,
            shell_quote(&script.to_string_lossy()),
            shell_quote(&input.to_string_lossy())
        ))
    }

    /// Execute one test case
    ///
    /// Process faults never surface as errors; an `Err` means the case
    /// itself could not be composed.
    pub async fn execute(&self, spec: &TestCaseSpec) -> Result<(TestCaseResult, CaseFlow)> {
        let start = Instant::now();

        let command = self.build_command(spec)?;
        let method = RestMethod::from_suite_file(&spec.test_suite_file);
        let kind = self.policy.fixture_kind(&spec.data_file);
        let test_case = spec.test_case_name();

        tracing::info!("Command: {}", command);
        let output = self.runner.run(&command).await;
        tracing::info!("Command executed with return code {}", output.return_code);

        let verdict = kind.verdict(output.return_code);
        let mut flow = CaseFlow::Continue;
        let reason = match verdict {
            Verdict::Pass => {
                tracing::info!("Test case: {} passed.", test_case);
                String::new()
            }
            Verdict::Fail => {
                tracing::info!("Test case: {} failed.", test_case);
                let reason = extract_reason(&output.output);
                tracing::info!("Reason: {}", reason);

                if self.policy.escalates(spec, kind, method) {
                    flow = CaseFlow::Abort(format!(
                        "POST test case '{}' in section '{}' failed",
                        test_case, spec.section
                    ));
                }
                reason
            }
        };

        if kind == FixtureKind::Inverted {
            tracing::debug!("{} uses an inverted expectation", spec.data_file);
        }

        let result = TestCaseResult {
            section: spec.section.clone(),
            test_case,
            result: verdict,
            reason,
            duration: format_duration(start.elapsed()),
        };

        Ok((result, flow))
    }
}

/// Pull the failure reason out of a test process's output
///
/// The process prints its failure report in a fixed layout; lines 6, 8,
/// 9 and 11 (zero-indexed) carry the detail. Shorter output keeps the
/// offsets that exist. When none exist or all of them are blank, the last
/// non-empty line is used, and blank output gives an empty reason.
pub fn extract_reason(output: &str) -> String {
    let lines: Vec<&str> = output.split('\n').collect();

    let picked: Vec<&str> = REASON_LINES
        .iter()
        .filter_map(|&index| lines.get(index).copied())
        .collect();

    if picked.iter().any(|line| !line.trim().is_empty()) {
        return picked.join(REASON_SEPARATOR);
    }

    lines
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Reject empty, absolute or parent-escaping case path parts
fn validate_component(field: &'static str, value: &str) -> Result<()> {
    let path = Path::new(value);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });

    if value.trim().is_empty() || path.is_absolute() || escapes {
        return Err(Error::invalid_case_path(field, value));
    }
    Ok(())
}

/// Single-quote a shell word when it contains anything unusual
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::automation::types::CommandOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Runner returning canned outputs and recording commands
    pub(crate) struct StubRunner {
        pub outputs: Mutex<Vec<CommandOutput>>,
        pub commands: Mutex<Vec<String>>,
    }

    impl StubRunner {
        pub fn returning(outputs: Vec<CommandOutput>) -> Self {
            Self {
                outputs: Mutex::new(outputs.into_iter().rev().collect()),
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for StubRunner {
        async fn run(&self, command: &str) -> CommandOutput {
            self.commands.lock().unwrap().push(command.to_string());
            self.outputs
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| CommandOutput::failure("no stubbed output"))
        }
    }

    /// Output in the test process's failure-report layout
    pub(crate) fn failure_report() -> String {
        (0..14)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn output(code: i32) -> CommandOutput {
        CommandOutput {
            return_code: code,
            output: failure_report(),
        }
    }

    fn executor(outputs: Vec<CommandOutput>) -> TestExecutor<StubRunner> {
        TestExecutor::new(
            StubRunner::returning(outputs),
            "python3 -m pytest -s",
            "suites",
            "inputs/full_api_test",
            ClassificationPolicy::default(),
        )
    }

    #[test]
    fn test_extract_reason_fixed_offsets() {
        assert_eq!(
            extract_reason(&failure_report()),
            "line 6 \n line 8 \n line 9 \n line 11"
        );
    }

    #[test]
    fn test_extract_reason_short_output() {
        let eight_lines = (0..8)
            .map(|i| format!("l{}", i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_reason(&eight_lines), "l6");

        assert_eq!(
            extract_reason("Command 'x' timed out after 20s"),
            "Command 'x' timed out after 20s"
        );
        assert_eq!(extract_reason("first\nlast\n\n"), "last");
        assert_eq!(extract_reason(""), "");
    }

    #[test]
    fn test_extract_reason_blank_offsets_fall_back() {
        // Six lines plus a trailing newline leave only an empty line 6
        assert_eq!(extract_reason("a\nb\nc\nd\ne\nfinal error\n"), "final error");

        let mut lines: Vec<String> = (0..6).map(|i| format!("l{}", i)).collect();
        lines.extend(["", "l7", "", "", "l10", " ", "l12"].map(String::from));
        assert_eq!(extract_reason(&lines.join("\n")), "l12");
    }

    #[test]
    fn test_build_command() {
        let exec = executor(vec![]);
        let spec = TestCaseSpec::new(
            "clusters",
            "test_postClusterProvider.py",
            "test_postClusterProvider.json",
        );
        assert_eq!(
            exec.build_command(&spec).unwrap(),
            "python3 -m pytest -s suites/clusters/test_postClusterProvider.py \
             --input-path-api=inputs/full_api_test/clusters/test_postClusterProvider.json"
        );
    }

    #[test]
    fn test_build_command_quotes_spaces() {
        let exec = executor(vec![]);
        let spec = TestCaseSpec::new("my section", "test_getX.py", "x.json");
        let command = exec.build_command(&spec).unwrap();
        assert!(command.contains("'suites/my section/test_getX.py'"));
    }

    #[test]
    fn test_build_command_rejects_bad_paths() {
        let exec = executor(vec![]);
        for spec in [
            TestCaseSpec::new("", "test_getX.py", "x.json"),
            TestCaseSpec::new("clusters", "/etc/passwd", "x.json"),
            TestCaseSpec::new("clusters", "test_getX.py", "../../secret.json"),
        ] {
            assert!(matches!(
                exec.build_command(&spec),
                Err(Error::InvalidCasePath { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_normal_fixture_pass() {
        let exec = executor(vec![output(0)]);
        let spec =
            TestCaseSpec::new("project", "test_postProjects.py", "test_postProjects.json");
        let (result, flow) = exec.execute(&spec).await.unwrap();
        assert_eq!(result.result, Verdict::Pass);
        assert_eq!(result.reason, "");
        assert_eq!(result.test_case, "test_postProjects");
        assert_eq!(result.section, "project");
        assert!(result.duration.ends_with(" s"));
        assert_eq!(flow, CaseFlow::Continue);
    }

    #[tokio::test]
    async fn test_inverted_fixture_failing_process_passes() {
        let exec = executor(vec![output(1)]);
        let spec = TestCaseSpec::new(
            "deployment_lifecycle",
            "test_postInstantiateDeployment.py",
            "test_instantiateDeploymentBeforeApprove.json",
        );
        let (result, flow) = exec.execute(&spec).await.unwrap();
        assert_eq!(result.result, Verdict::Pass);
        assert_eq!(result.reason, "");
        assert_eq!(flow, CaseFlow::Continue);
    }

    #[tokio::test]
    async fn test_inverted_fixture_succeeding_process_fails_without_abort() {
        let exec = executor(vec![output(0)]);
        let spec = TestCaseSpec::new(
            "deployment_lifecycle",
            "test_postTerminateDeployment.py",
            "test_terminateDeploymentBeforeInstantiate.json",
        );
        let (result, flow) = exec.execute(&spec).await.unwrap();
        assert_eq!(result.result, Verdict::Fail);
        assert_eq!(result.reason, "line 6 \n line 8 \n line 9 \n line 11");
        assert_eq!(flow, CaseFlow::Continue);
    }

    #[tokio::test]
    async fn test_post_failure_aborts_outside_negative_section() {
        let exec = executor(vec![output(1), output(1)]);

        let spec = TestCaseSpec::new(
            "clusters",
            "test_postClusterProvider.py",
            "test_postClusterProvider.json",
        );
        let (result, flow) = exec.execute(&spec).await.unwrap();
        assert_eq!(result.result, Verdict::Fail);
        assert!(flow.is_abort());

        let negative = TestCaseSpec {
            section: "negative_error_codes".to_string(),
            ..spec
        };
        let (result, flow) = exec.execute(&negative).await.unwrap();
        assert_eq!(result.result, Verdict::Fail);
        assert_eq!(flow, CaseFlow::Continue);
    }

    #[tokio::test]
    async fn test_exempt_suite_never_aborts() {
        let exec = executor(vec![output(2)]);
        let spec = TestCaseSpec::new(
            "clusters",
            "test_postClusterProviderNeg422.py",
            "test_postClusterProviderNeg422.json",
        );
        let (result, flow) = exec.execute(&spec).await.unwrap();
        assert_eq!(result.result, Verdict::Fail);
        assert_eq!(flow, CaseFlow::Continue);
    }

    #[tokio::test]
    async fn test_non_post_failure_does_not_abort() {
        let exec = executor(vec![output(1)]);
        let spec =
            TestCaseSpec::new("networks", "test_deleteNetwork.py", "test_deleteNetwork.json");
        let (result, flow) = exec.execute(&spec).await.unwrap();
        assert_eq!(result.result, Verdict::Fail);
        assert_eq!(flow, CaseFlow::Continue);
    }

    #[tokio::test]
    async fn test_invalid_case_never_runs() {
        let exec = executor(vec![output(0)]);
        let spec = TestCaseSpec::new("clusters", "test_postX.py", "");
        assert!(exec.execute(&spec).await.is_err());
        assert!(exec.runner.commands.lock().unwrap().is_empty());
    }
}
