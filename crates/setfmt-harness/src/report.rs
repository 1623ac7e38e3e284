//! Report generation for conformance results.

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one or more fixture sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Conventions exercised (`terminated`, `sized`, or both joined by `+`).
    pub conventions: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Conventions: {}\n", self.conventions));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Result | Attempts | Status |\n");
        out.push_str("|------|--------|----------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                r.case_name, r.result, r.attempts, status
            ));
        }

        let failures: Vec<_> = self.summary.results.iter().filter(|r| !r.passed).collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n```diff\n", r.case_name));
                out.push_str(r.diff.as_deref().unwrap_or_default());
                out.push_str("```\n");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn result(name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: name.into(),
            convention: "sized".into(),
            passed,
            expected: "result=3\n".into(),
            actual: if passed { "result=3\n" } else { "result=0\n" }.into(),
            diff: (!passed).then(|| "-result=3\n+result=0\n".to_string()),
            result: if passed { 3 } else { 0 },
            attempts: 1,
        }
    }

    #[test]
    fn markdown_lists_cases_and_failures() {
        let report = ConformanceReport {
            title: "setfmt conformance".into(),
            conventions: "terminated+sized".into(),
            timestamp: "2026-10-18T00:00:00Z".into(),
            summary: VerificationSummary::from_results(vec![
                result("ok [sized]", true),
                result("bad [sized]", false),
            ]),
        };
        let md = report.to_markdown();
        assert!(md.contains("- Failed: 1"));
        assert!(md.contains("| ok [sized] | 3 | 1 | PASS |"));
        assert!(md.contains("### bad [sized]"));
        assert!(md.contains("+result=0"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["summary"]["total"], 2);
    }
}
