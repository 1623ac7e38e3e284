//! CLI entrypoint for the setfmt conformance harness.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use setfmt_core::{Convention, EmitConfig, Emitter, OutputCollector, status_code};
use setfmt_harness::fixtures::fixture_paths;
use setfmt_harness::structured_log::{LogEmitter, LogEntry, LogLevel, validate_log_line};
use setfmt_harness::{
    CaseConvention, ConformanceReport, FixtureArg, FixtureSet, TestRunner, VerificationSummary,
};

/// Conformance tooling for setfmt.
#[derive(Debug, Parser)]
#[command(name = "setfmt-harness")]
#[command(about = "Fixture-driven conformance harness for setfmt")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay fixture sets and compare against recorded expectations.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Conventions to exercise: terminated, sized, or both.
        #[arg(long, default_value = "both")]
        convention: String,
        /// Output report path (markdown).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Render one template and print what the sink received.
    Render {
        /// printf template.
        #[arg(long)]
        template: String,
        /// Arguments as TYPE:VALUE (i, u, f, c, s, p) or `null`.
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Use the sized convention instead of NUL-terminated delivery.
        #[arg(long)]
        sized: bool,
        /// First-attempt buffer capacity (default: environment or 1024).
        #[arg(long)]
        initial_capacity: Option<usize>,
    },
    /// Validate a structured JSONL log produced by `verify --log`.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn conventions(selected: CaseConvention) -> Vec<Convention> {
    [Convention::Terminated, Convention::Sized]
        .into_iter()
        .filter(|c| selected.includes(*c))
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            convention,
            report,
            log,
            timestamp,
        } => {
            let selected: CaseConvention = convention.parse()?;
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let started = Instant::now();

            let mut fixture_sets = Vec::new();
            for path in fixture_paths(&fixture)? {
                match FixtureSet::from_file(&path) {
                    Ok(set) => fixture_sets.push(set),
                    Err(err) => eprintln!("Skipping {err}"),
                }
            }
            if fixture_sets.is_empty() {
                return Err(format!("No usable fixture sets in {}", fixture.display()).into());
            }

            let active = conventions(selected);
            let mut results = Vec::new();
            for convention in &active {
                let runner = TestRunner::new("fixture-verify", *convention);
                for set in &fixture_sets {
                    results.extend(runner.run(set));
                }
            }
            results.sort_by(|a, b| {
                a.case_name
                    .cmp(&b.case_name)
                    .then_with(|| a.convention.cmp(&b.convention))
            });

            if let Some(log_path) = &log {
                let mut emitter = LogEmitter::to_file(log_path, "fixture-verify")?;
                emitter.emit(LogLevel::Info, "verify_start")?;
                for result in &results {
                    emitter.emit_entry(LogEntry::for_result(result))?;
                }
                let elapsed = started.elapsed().as_millis() as u64;
                emitter.emit_entry(
                    LogEntry::new("", LogLevel::Info, "verify_complete")
                        .with_duration_ms(elapsed)
                        .with_details(serde_json::json!({
                            "fixture_sets": fixture_sets.len(),
                            "cases": results.len(),
                        })),
                )?;
                emitter.flush()?;
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("setfmt Conformance Report"),
                conventions: active
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join("+"),
                timestamp: timestamp
                    .unwrap_or_else(|| format!("{:?}", std::time::SystemTime::now())),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );
            for r in report_doc.summary.results.iter().filter(|r| !r.passed) {
                eprintln!("FAIL {}", r.case_name);
                if let Some(diff) = &r.diff {
                    eprintln!("{diff}");
                }
            }

            if let Some(report_path) = report {
                std::fs::write(&report_path, report_doc.to_markdown())?;
                eprintln!("Report written to {}", report_path.display());
            }

            if !report_doc.summary.all_passed() {
                return Err(format!("{} case(s) failed", report_doc.summary.failed).into());
            }
        }
        Command::Render {
            template,
            args,
            sized,
            initial_capacity,
        } => {
            let parsed = args
                .iter()
                .map(|a| a.parse::<FixtureArg>())
                .collect::<Result<Vec<_>, _>>()?;
            let format_args: Vec<_> = parsed.iter().map(FixtureArg::as_format_arg).collect();
            let config = initial_capacity.map_or_else(EmitConfig::from_env, EmitConfig::new);
            let convention = if sized {
                Convention::Sized
            } else {
                Convention::Terminated
            };

            let mut emitter = Emitter::with_config(config);
            let mut sink = OutputCollector::new();
            let outcome = match convention {
                Convention::Terminated => {
                    emitter.emit_terminated(&mut sink, template.as_bytes(), &format_args)
                }
                Convention::Sized => emitter.emit_sized(&mut sink, template.as_bytes(), &format_args),
            };

            for chunk in sink.chunks() {
                println!("{chunk}");
            }
            match &outcome {
                Ok(emitted) => eprintln!(
                    "result={} capacity={} attempts={}",
                    emitted.length, emitted.capacity, emitted.attempts
                ),
                Err(err) => eprintln!(
                    "result={} error: {err}",
                    status_code(&outcome, convention)
                ),
            }
        }
        Command::ValidateLog { log } => {
            let content = std::fs::read_to_string(&log)?;
            let mut failures = 0usize;
            for (i, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(errors) = validate_log_line(line, i + 1) {
                    failures += errors.len();
                    for err in errors {
                        eprintln!("{err}");
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} validation error(s) in {}", log.display()).into());
            }
            eprintln!("{}: OK", log.display());
        }
    }

    Ok(())
}
