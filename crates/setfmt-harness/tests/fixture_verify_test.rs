//! Integration test: replay the checked-in fixture sets under both conventions.
//!
//! Run: cargo test -p setfmt-harness --test fixture_verify_test

use std::path::PathBuf;

use setfmt_core::Convention;
use setfmt_harness::fixtures::fixture_paths;
use setfmt_harness::structured_log::{LogEmitter, LogEntry, validate_log_line};
use setfmt_harness::{FixtureSet, TestRunner, VerificationSummary};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

fn load_all() -> Vec<FixtureSet> {
    fixture_paths(&fixture_dir())
        .expect("fixture directory")
        .iter()
        .map(|p| FixtureSet::from_file(p).expect("valid fixture set"))
        .collect()
}

#[test]
fn checked_in_fixtures_pass_under_both_conventions() {
    let sets = load_all();
    assert!(!sets.is_empty());

    for convention in [Convention::Terminated, Convention::Sized] {
        let runner = TestRunner::new("fixture-verify", convention);
        let results: Vec<_> = sets.iter().flat_map(|set| runner.run(set)).collect();
        assert!(!results.is_empty());
        let summary = VerificationSummary::from_results(results);
        let failures: Vec<_> = summary
            .results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| format!("{}\n{}", r.case_name, r.diff.as_deref().unwrap_or("")))
            .collect();
        assert!(summary.all_passed(), "failures:\n{}", failures.join("\n"));
    }
}

#[test]
fn long_literal_cases_pin_retry_capacities() {
    let sets = load_all();
    let case = sets
        .iter()
        .flat_map(|s| s.cases.iter())
        .find(|c| c.name == "literal_2000_terminated")
        .expect("case present");
    assert_eq!(case.expected_requests.as_deref(), Some([1024, 2001].as_slice()));
}

#[test]
fn verification_log_lines_validate() {
    let sets = load_all();
    let runner = TestRunner::new("fixture-verify", Convention::Sized);
    let mut emitter = LogEmitter::new(Vec::new(), "itest");
    for result in sets.iter().flat_map(|set| runner.run(set)) {
        emitter.emit_entry(LogEntry::for_result(&result)).unwrap();
    }
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    let mut count = 0;
    for (i, line) in text.lines().enumerate() {
        let entry = validate_log_line(line, i + 1).unwrap_or_else(|errs| {
            panic!("line {} invalid: {:?}", i + 1, errs);
        });
        assert_eq!(entry.convention.as_deref(), Some("sized"));
        count += 1;
    }
    assert!(count > 0);
}
