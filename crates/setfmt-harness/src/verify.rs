//! Output comparison and verification.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case under one convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Name of the test case.
    pub case_name: String,
    /// `terminated` or `sized`.
    pub convention: String,
    /// Whether the case passed.
    pub passed: bool,
    /// Expected observation, rendered canonically.
    pub expected: String,
    /// Actual observation, rendered canonically.
    pub actual: String,
    /// Diff if the case failed.
    pub diff: Option<String>,
    /// Integer result the call produced.
    pub result: i32,
    /// Allocation attempts made.
    pub attempts: usize,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Total cases run.
    pub total: usize,
    /// Cases passed.
    pub passed: usize,
    /// Cases failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
