//! End-to-end tests for the harness CLI
//!
//! Each test builds a throwaway workspace with:
//! 1. shell scripts standing in for the per-endpoint test suites
//! 2. JSON fixtures the scripts are pointed at
//! 3. a config file and a test plan
//!
//! and runs the real binary against it with `sh` as the base command.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Script that passes
const PASS: &str = "exit 0\n";

/// Script that fails with the multi-line failure layout
const FAIL: &str = r#"i=0
while [ $i -lt 14 ]; do
  echo "report line $i"
  i=$((i + 1))
done
exit 1
"#;

const FIXTURE: &str = r#"[{"anchor": "projects", "type-metadata": [{"ResponseCode": 201}]}]"#;

/// Temporary workspace with scripts, fixtures, config and plan
struct TestContext {
    dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let ctx = Self { dir };
        ctx.write(
            "config.toml",
            r#"
base_command = "sh"
input_base = "inputs"
test_suite_base = "suites"
timeout_secs = 10
reports_dir = "reports"
log_dir = "logs"
"#,
        );
        ctx
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
        fs::write(&path, content).expect("Failed to write file");
    }

    /// Add a case's script and fixture
    fn case(&self, section: &str, suite: &str, data: &str, script: &str) {
        self.write(&format!("suites/{}/{}", section, suite), script);
        self.write(&format!("inputs/full_api_test/{}/{}", section, data), FIXTURE);
    }

    fn plan(&self, yaml: &str) {
        self.write("test_plan.yaml", yaml);
    }

    /// Run the harness inside the workspace
    fn run(&self, args: &[&str]) -> HarnessOutput {
        let output = Command::new(env!("CARGO_BIN_EXE_api-harness"))
            .arg("--config")
            .arg(self.root().join("config.toml"))
            .args(args)
            .current_dir(self.root())
            .env_remove("BASE_COMMAND")
            .env_remove("INPUT_BASE")
            .env_remove("TEST_SUITE_BASE")
            .env_remove("COMMAND_EXEC_TIMEOUT")
            .env_remove("REPORTS_DIR")
            .env_remove("LOG_PATH")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run harness");

        HarnessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }

    fn reports(&self) -> Vec<PathBuf> {
        let dir = self.root().join("reports");
        let mut reports: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        };
        reports.sort();
        reports
    }
}

/// Output from a harness invocation
#[derive(Debug)]
struct HarnessOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

fn summary_cell(html: &str, id: &str) -> String {
    let open = format!("<td id=\"{}\">", id);
    let start = html.find(&open).expect("summary cell missing") + open.len();
    let end = start + html[start..].find("</td>").unwrap();
    html[start..end].to_string()
}

// ============== Tests ==============

#[test]
fn test_full_run_aborts_on_critical_failure() {
    let ctx = TestContext::new();
    ctx.case("project", "test_postProjects.sh", "test_postProjects.json", PASS);
    ctx.case("project", "test_getProjects.sh", "test_getProjects.json", FAIL);
    for (suite, script) in [
        ("test_postClusterProvider", FAIL),
        ("test_getClusterProvider", PASS),
        ("test_deleteClusterProvider", PASS),
    ] {
        ctx.case(
            "clusters",
            &format!("{}.sh", suite),
            &format!("{}.json", suite),
            script,
        );
    }
    ctx.plan(
        r#"
full:
  - { section: project, suite: test_postProjects.sh, data: test_postProjects.json }
  - { section: project, suite: test_getProjects.sh, data: test_getProjects.json }
  - { section: clusters, suite: test_postClusterProvider.sh, data: test_postClusterProvider.json }
  - { section: clusters, suite: test_getClusterProvider.sh, data: test_getClusterProvider.json }
  - { section: clusters, suite: test_deleteClusterProvider.sh, data: test_deleteClusterProvider.json }
"#,
    );

    let output = ctx.run(&["full"]);
    assert_eq!(output.code, Some(2), "{:?}", output);
    assert!(output.stdout.contains("Aborted:"), "stdout: {}", output.stdout);

    let reports = ctx.reports();
    assert_eq!(reports.len(), 1);
    let html = fs::read_to_string(&reports[0]).unwrap();
    assert_eq!(summary_cell(&html, "total"), "5");
    assert_eq!(summary_cell(&html, "executed"), "3");
    assert_eq!(summary_cell(&html, "passed"), "1");
    assert_eq!(summary_cell(&html, "failed"), "2");
    assert_eq!(html.matches("<tr class=\"result\">").count(), 3);
    assert!(html.contains(
        "report line 6 <br/> report line 8 <br/> report line 9 <br/> report line 11"
    ));
    assert!(!html.contains("test_getClusterProvider"));

    let logs: Vec<_> = fs::read_dir(ctx.root().join("logs")).unwrap().collect();
    assert_eq!(logs.len(), 1);
}

#[test]
fn test_cleanup_run_with_inverted_fixture() {
    let ctx = TestContext::new();
    ctx.case(
        "deployment_lifecycle",
        "test_postInstantiateDeployment.sh",
        "test_instantiateDeploymentBeforeApprove.json",
        FAIL,
    );
    ctx.case("project", "test_deleteProjects.sh", "test_deleteProjects.json", PASS);
    ctx.plan(
        r#"
cleanup:
  - { section: deployment_lifecycle, suite: test_postInstantiateDeployment.sh, data: test_instantiateDeploymentBeforeApprove.json }
  - { section: project, suite: test_deleteProjects.sh, data: test_deleteProjects.json }
"#,
    );

    let output = ctx.run(&["cleanup"]);
    assert_eq!(output.code, Some(0), "{:?}", output);
    assert!(output.stdout.contains("Cleanup API Automation"));

    let html = fs::read_to_string(&ctx.reports()[0]).unwrap();
    assert_eq!(summary_cell(&html, "executed"), "2");
    assert_eq!(summary_cell(&html, "passed"), "2");
    assert_eq!(summary_cell(&html, "failed"), "0");
}

#[test]
fn test_invalid_case_is_skipped() {
    let ctx = TestContext::new();
    ctx.case("project", "test_getProjects.sh", "test_getProjects.json", PASS);
    ctx.plan(
        r#"
full:
  - { section: project, suite: test_getProjects.sh, data: ../outside.json }
  - { section: project, suite: test_getProjects.sh, data: test_getProjects.json }
"#,
    );

    let output = ctx.run(&["full"]);
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Errors:"), "stdout: {}", output.stdout);

    let html = fs::read_to_string(&ctx.reports()[0]).unwrap();
    assert_eq!(summary_cell(&html, "total"), "2");
    assert_eq!(summary_cell(&html, "executed"), "1");
}

#[test]
fn test_single_case_command() {
    let ctx = TestContext::new();
    ctx.case("networks", "test_deleteNetwork.sh", "test_deleteNetwork.json", FAIL);

    let output = ctx.run(&[
        "case",
        "networks",
        "test_deleteNetwork.sh",
        "test_deleteNetwork.json",
    ]);
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("networks/test_deleteNetwork"));
    assert!(output.stdout.contains("report line 11"));
    assert!(ctx.reports().is_empty());
}

#[test]
fn test_check_reports_missing_pieces() {
    let ctx = TestContext::new();
    ctx.case("project", "test_postProjects.sh", "test_postProjects.json", PASS);
    ctx.write("inputs/full_api_test/project/test_broken.json", "{\"anchor\": 1}");
    ctx.write("suites/project/test_postBroken.sh", PASS);
    ctx.plan(
        r#"
full:
  - { section: project, suite: test_postProjects.sh, data: test_postProjects.json }
  - { section: project, suite: test_postMissing.sh, data: test_postProjects.json }
  - { section: project, suite: test_postBroken.sh, data: test_broken.json }
"#,
    );

    let output = ctx.run(&["check"]);
    assert_eq!(output.code, Some(1), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("missing script"));
    assert!(output.stdout.contains("test_broken.json"));
    assert!(output
        .stdout
        .contains("(1 entries, 1 calls, 0 with body, 0 uploads)"));
    assert!(ctx.reports().is_empty());
}

#[test]
fn test_missing_plan_is_an_error() {
    let ctx = TestContext::new();
    let output = ctx.run(&["full"]);
    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("test_plan.yaml"), "stderr: {}", output.stderr);
}
