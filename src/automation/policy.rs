//! Classification policy
//!
//! Which fixtures have inverted expectations, which section holds
//! expected-error tests, and which suites may never abort a run. All the
//! special cases live in one table so they can be audited and extended
//! from the config file.

use std::collections::HashMap;
use std::path::{Component, Path};

use crate::common::config::PolicyConfig;

use super::types::{TestCaseSpec, Verdict};

/// How a fixture's exit code maps to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// Exit code 0 passes
    Normal,
    /// The scenario must be rejected: a failing process passes
    Inverted,
}

impl FixtureKind {
    pub fn verdict(&self, return_code: i32) -> Verdict {
        match (self, return_code == 0) {
            (FixtureKind::Normal, true) | (FixtureKind::Inverted, false) => Verdict::Pass,
            (FixtureKind::Normal, false) | (FixtureKind::Inverted, true) => Verdict::Fail,
        }
    }
}

/// REST method hinted by a suite file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Post,
    Get,
    Put,
    Delete,
    Other,
}

impl RestMethod {
    /// Read the method from a name like `test_postClusterProvider.py`
    ///
    /// The second `_`-delimited token of the stem is matched by prefix.
    pub fn from_suite_file(test_suite_file: &str) -> Self {
        let stem = test_suite_file.split('.').next().unwrap_or_default();
        let token = match stem.split('_').nth(1) {
            Some(token) => token.to_ascii_lowercase(),
            None => return RestMethod::Other,
        };

        if token.starts_with("post") {
            RestMethod::Post
        } else if token.starts_with("get") {
            RestMethod::Get
        } else if token.starts_with("put") {
            RestMethod::Put
        } else if token.starts_with("dele") {
            RestMethod::Delete
        } else {
            RestMethod::Other
        }
    }
}

/// Table-driven pass/fail and escalation rules
#[derive(Debug, Clone)]
pub struct ClassificationPolicy {
    fixtures: HashMap<String, FixtureKind>,
    negative_section: String,
    critical_exempt_suites: Vec<String>,
}

impl ClassificationPolicy {
    pub fn new(config: &PolicyConfig) -> Self {
        let fixtures = config
            .inverted_fixtures
            .iter()
            .map(|name| (name.clone(), FixtureKind::Inverted))
            .collect();

        Self {
            fixtures,
            negative_section: config.negative_section.clone(),
            critical_exempt_suites: config.critical_exempt_suites.clone(),
        }
    }

    /// Kind of the given fixture; unknown fixtures are normal
    pub fn fixture_kind(&self, data_file: &str) -> FixtureKind {
        self.fixtures
            .get(data_file)
            .copied()
            .unwrap_or(FixtureKind::Normal)
    }

    /// Whether the case belongs to the expected-error section
    ///
    /// Either the section itself or the first path component of the data
    /// file may name it.
    pub fn is_negative_section(&self, spec: &TestCaseSpec) -> bool {
        if spec.section == self.negative_section {
            return true;
        }
        matches!(
            Path::new(&spec.data_file).components().next(),
            Some(Component::Normal(first))
                if first == self.negative_section.as_str() && spec.data_file.contains('/')
        )
    }

    pub fn is_exempt(&self, test_suite_file: &str) -> bool {
        self.critical_exempt_suites
            .iter()
            .any(|suite| suite == test_suite_file)
    }

    /// Whether a failed case must abort the suite
    ///
    /// Only failures of normal fixtures from POST suites outside the
    /// negative section escalate; exempt suites never do.
    pub fn escalates(
        &self,
        spec: &TestCaseSpec,
        kind: FixtureKind,
        method: RestMethod,
    ) -> bool {
        kind == FixtureKind::Normal
            && method == RestMethod::Post
            && !self.is_negative_section(spec)
            && !self.is_exempt(&spec.test_suite_file)
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}
