//! Test plan loading
//!
//! A plan is a YAML file with two ordered case lists:
//!
//! ```yaml
//! full:
//!   - { section: project, suite: test_postProjects.py, data: test_postProjects.json }
//! cleanup:
//!   - { section: project, suite: test_deleteProjects.py, data: test_deleteProjects.json }
//! ```
//!
//! Order is execution order and duplicates are kept: later cases depend on
//! the side effects of earlier ones.

use serde::Deserialize;
use std::path::Path;

use crate::common::{Error, Result};

use super::types::TestCaseSpec;

/// Ordered case lists of both suite variants
#[derive(Debug, Default, Deserialize)]
pub struct TestPlan {
    /// Cases of the complete API run
    #[serde(default)]
    pub full: Vec<TestCaseSpec>,
    /// Cases of the cleanup run
    #[serde(default)]
    pub cleanup: Vec<TestCaseSpec>,
}

impl TestPlan {
    /// Load a plan from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Plan(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document is an empty plan
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
