//! Test execution engine.

use setfmt_core::{
    Convention, EmitConfig, Emitter, OutputCollector, RecordingAlloc, status_code,
};

use crate::diff;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::verify::VerificationResult;

/// What one call did, as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRun {
    pub result: i32,
    /// One entry per sink invocation.
    pub outputs: Vec<String>,
    /// Buffer capacities requested, in order.
    pub requests: Vec<usize>,
}

/// Runs a fixture set under one delivery convention.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    pub convention: Convention,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, convention: Convention) -> Self {
        Self {
            campaign: campaign.into(),
            convention,
        }
    }

    /// Run every case that applies to this runner's convention.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| case.convention.includes(self.convention))
            .map(|case| self.verify_case(case))
            .collect()
    }

    fn verify_case(&self, case: &FixtureCase) -> VerificationResult {
        let run = execute_case(case, self.convention);
        let expected = describe_expected(case, self.convention);
        let actual = describe_run(&run, case.expected_requests.is_some());
        let passed = expected == actual;
        VerificationResult {
            case_name: format!("{} [{}]", case.name, self.convention.as_str()),
            convention: self.convention.as_str().to_string(),
            passed,
            diff: (!passed).then(|| diff::render_diff(&expected, &actual)),
            expected,
            actual,
            result: run.result,
            attempts: run.requests.len(),
        }
    }
}

/// Execute one case with a recording allocator and a collecting sink.
#[must_use]
pub fn execute_case(case: &FixtureCase, convention: Convention) -> CaseRun {
    let config = case
        .initial_capacity
        .map_or_else(EmitConfig::default, EmitConfig::new);
    let alloc = match case.fail_on_attempt {
        Some(n) => RecordingAlloc::failing_on(n),
        None => RecordingAlloc::new(),
    };
    let args: Vec<_> = case.args.iter().map(|a| a.as_format_arg()).collect();

    let mut emitter = Emitter::with_alloc(config, alloc);
    let mut sink = OutputCollector::new();
    let template = case.template.as_bytes();
    let outcome = match convention {
        Convention::Terminated => emitter.emit_terminated(&mut sink, template, &args),
        Convention::Sized => emitter.emit_sized(&mut sink, template, &args),
    };

    CaseRun {
        result: status_code(&outcome, convention),
        outputs: sink.take(),
        requests: emitter.into_alloc().requests().to_vec(),
    }
}

fn describe_expected(case: &FixtureCase, convention: Convention) -> String {
    let result = match convention {
        Convention::Terminated => case.expected_result.max(0),
        Convention::Sized => case.expected_result,
    };
    let outputs: Vec<String> = case.expected_output.iter().cloned().collect();
    describe(result, &outputs, case.expected_requests.as_deref())
}

fn describe_run(run: &CaseRun, with_requests: bool) -> String {
    describe(
        run.result,
        &run.outputs,
        with_requests.then_some(run.requests.as_slice()),
    )
}

fn describe(result: i32, outputs: &[String], requests: Option<&[usize]>) -> String {
    let mut out = format!("result={result}\ncalls={}\n", outputs.len());
    for text in outputs {
        out.push_str(&format!("output=\"{}\"\n", text.escape_debug()));
    }
    if let Some(requests) = requests {
        out.push_str(&format!("requests={requests:?}\n"));
    }
    out
}
