//! Data model shared by the executor, the suite runner and the reporter

use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// One executable test unit: a script run against one fixture
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct TestCaseSpec {
    /// API section, also the sub-directory of scripts and fixtures
    pub section: String,
    /// Test-suite script file name
    #[serde(rename = "suite")]
    pub test_suite_file: String,
    /// Fixture file name
    #[serde(rename = "data")]
    pub data_file: String,
}

impl TestCaseSpec {
    pub fn new(section: &str, test_suite_file: &str, data_file: &str) -> Self {
        Self {
            section: section.to_string(),
            test_suite_file: test_suite_file.to_string(),
            data_file: data_file.to_string(),
        }
    }

    /// Test case identifier: the data file name without its final extension
    pub fn test_case_name(&self) -> String {
        test_case_name(&self.data_file)
    }
}

impl fmt::Display for TestCaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.section, self.test_suite_file, self.data_file)
    }
}

/// Strip directories and the final extension from a data file name
pub fn test_case_name(data_file: &str) -> String {
    Path::new(data_file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| data_file.to_string())
}

/// Raw result of invoking an external test process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub return_code: i32,
    pub output: String,
}

impl CommandOutput {
    /// Synthetic failing output for a process that could not be run
    pub fn failure(error: impl fmt::Display) -> Self {
        Self {
            return_code: 1,
            output: error.to_string(),
        }
    }
}

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of executing one [`TestCaseSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseResult {
    pub section: String,
    pub test_case: String,
    pub result: Verdict,
    pub reason: String,
    pub duration: String,
}

/// Static descriptor of a suite variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationType {
    pub kind: String,
    pub description: String,
    /// Planned number of cases, independent of how many ran
    pub total_test_cases: usize,
}

impl AutomationType {
    pub fn full(total_test_cases: usize) -> Self {
        Self {
            kind: "Complete API Automation".to_string(),
            description: "In this type of Automation all the available APIs are tested."
                .to_string(),
            total_test_cases,
        }
    }

    pub fn cleanup(total_test_cases: usize) -> Self {
        Self {
            kind: "Cleanup API Automation".to_string(),
            description: "In this type of Automation all the data is removed and terminated"
                .to_string(),
            total_test_cases,
        }
    }

    /// Label shown in the report summary
    pub fn label(&self) -> String {
        format!("{} ({})", self.kind, self.description)
    }
}

/// What the suite runner should do after a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseFlow {
    Continue,
    /// Critical failure: stop the remaining cases
    Abort(String),
}

impl CaseFlow {
    pub fn is_abort(&self) -> bool {
        matches!(self, CaseFlow::Abort(_))
    }
}
