//! Conformance harness for setfmt.
//!
//! This crate provides:
//! - Fixture sets: JSON cases pinning rendered text, results and allocation sequences
//! - A runner that replays cases under each delivery convention with fault injection
//! - Diffs and markdown/JSON reports of the outcome
//! - Structured JSONL logging of every verified case

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{CaseConvention, FixtureArg, FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
