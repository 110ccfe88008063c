//! Suite results as text and JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::helpers::HarnessError;

pub const SUITE_NAME: &str = "DrtBasic3D";

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    /// Number of individual comparisons made.
    pub checks: usize,
    /// One message per failed comparison.
    pub failures: Vec<String>,
    /// Set when the case aborted with an error or a panic.
    pub error: Option<String>,
    pub elapsed_ms: f64,
}

impl CaseResult {
    pub fn aborted(name: &str, error: &HarnessError, elapsed_ms: f64) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            checks: 0,
            failures: Vec::new(),
            error: Some(error.to_string()),
            elapsed_ms,
        }
    }
}

/// Results of one pass over the selected cases, in run order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub cases: Vec<CaseResult>,
}

impl Default for SuiteReport {
    fn default() -> Self {
        Self {
            suite: SUITE_NAME.to_string(),
            cases: Vec::new(),
        }
    }
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.cases
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn summary_line(&self) -> String {
        let total = self.cases.len();
        let failed = self.failed_names();
        if failed.is_empty() {
            format!("{} successfully completed {total} of {total} tests.", self.suite)
        } else {
            format!(
                "{} failed {} of {total} tests. FAILED TESTS: {}",
                self.suite,
                failed.len(),
                failed.join(", ")
            )
        }
    }

    /// `0` when every case passed, otherwise the negative failed count.
    pub fn exit_code(&self) -> i32 {
        -(self.failed_names().len() as i32)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== {} ===\n\n", self.suite));
        for case in &self.cases {
            let status = if case.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "[{status}] {} ({} checks, {:.1} ms)\n",
                case.name, case.checks, case.elapsed_ms
            ));
            if let Some(error) = &case.error {
                out.push_str(&format!("       error: {error}\n"));
            }
            for failure in &case.failures {
                out.push_str(&format!("       {failure}\n"));
            }
        }
        out.push('\n');
        out.push_str(&self.summary_line());
        out.push('\n');
        out
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
