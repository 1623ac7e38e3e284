//! Integration test: format-and-emit contract
//!
//! Exercises both delivery conventions through the public API: single sink
//! invocation, grow-to-fit retry capacities, allocation failure, encoding
//! errors, and repeatability.
//!
//! Run: cargo test -p setfmt-core --test emit_contract_test

use std::ffi::{CStr, CString};

use setfmt_core::{
    Convention, EmitConfig, EmitError, Emitter, FormatArg, OutputCollector, RecordingAlloc,
    Rendered, fmt_args, measure, render_to_vec, status_code,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn recording() -> Emitter<RecordingAlloc> {
    Emitter::with_alloc(EmitConfig::default(), RecordingAlloc::new())
}

fn sized_once(template: &[u8], args: &[FormatArg<'_>]) -> (Vec<(Vec<u8>, u32, u32)>, i32) {
    let mut calls = Vec::new();
    let mut sink = |r: Rendered<'_>| calls.push((r.as_bytes().to_vec(), r.len(), r.capacity()));
    let result = recording().emit_sized(&mut sink, template, args);
    (calls, status_code(&result, Convention::Sized))
}

// ---------------------------------------------------------------------------
// 1. Sink sees exactly the rendered text, once
// ---------------------------------------------------------------------------

#[test]
fn sink_receives_render_exactly_once() {
    let cases: &[(&[u8], &[FormatArg<'_>])] = &[
        (b"%s has %d items", &fmt_args!["cart", 3]),
        (b"%-10s|%08.3f|%#o", &fmt_args!["left", -3.25, 8u32]),
        (b"%c%c%c", &fmt_args!['a', 'b', 'c']),
        (b"plain text", &[]),
        (b"", &[]),
    ];
    for (template, args) in cases {
        let expected = render_to_vec(template, args).unwrap();
        let (calls, code) = sized_once(template, args);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, expected);
        assert_eq!(calls[0].1 as usize, expected.len());
        assert!(calls[0].2 >= calls[0].1);
        assert_eq!(code as usize, expected.len());
    }
}

// ---------------------------------------------------------------------------
// 2. Retry capacities
// ---------------------------------------------------------------------------

#[test]
fn retry_capacity_matches_measured_length() {
    for len in [1024usize, 1500, 4096, 70_000] {
        let name = "x".repeat(len - 4);
        let args = fmt_args![name.as_str()];
        let needed = measure(b"[%s]!", &args).unwrap();
        assert_eq!(needed, len - 1);

        let mut terminated = recording();
        let mut sink = |_: &CStr| {};
        let emitted = terminated
            .emit_terminated(&mut sink, b"[%s]!", &args)
            .unwrap();
        if needed < 1024 {
            assert_eq!(terminated.alloc().requests(), &[1024]);
        } else {
            assert_eq!(terminated.alloc().requests(), &[1024, needed + 1]);
            assert_eq!(emitted.capacity as usize, needed + 1);
        }

        let mut sized = recording();
        let mut sink = |_: Rendered<'_>| {};
        let emitted = sized.emit_sized(&mut sink, b"[%s]!", &args).unwrap();
        if needed <= 1024 {
            assert_eq!(sized.alloc().requests(), &[1024]);
        } else {
            assert_eq!(sized.alloc().requests(), &[1024, needed]);
            assert_eq!(emitted.capacity as usize, needed);
        }
    }
}

#[test]
fn long_output_is_delivered_whole() {
    let template = "a".repeat(2000);
    let mut out = OutputCollector::new();
    let emitted = recording()
        .emit_terminated(&mut out, template.as_bytes(), &[])
        .unwrap();
    assert_eq!(emitted.attempts, 2);
    assert_eq!(out.chunks(), &[template.clone()]);
}

// ---------------------------------------------------------------------------
// 3. Failure paths never reach the sink
// ---------------------------------------------------------------------------

#[test]
fn exhausted_allocation_returns_zero() {
    for attempt in [1u32, 2] {
        let mut emitter = Emitter::with_alloc(
            EmitConfig::default(),
            RecordingAlloc::failing_on(attempt),
        );
        let mut called = 0;
        let mut sink = |_: Rendered<'_>| called += 1;
        let result = emitter.emit_sized(&mut sink, "q".repeat(5000).as_bytes(), &[]);
        assert!(matches!(result, Err(EmitError::AllocationExhausted { .. })));
        assert_eq!(status_code(&result, Convention::Sized), 0);
        assert_eq!(called, 0);
        assert_eq!(emitter.alloc().requests().len(), attempt as usize);
    }
}

#[test]
fn encoding_errors_are_negative_for_sized_and_zero_for_terminated() {
    let bad: &[(&[u8], &[FormatArg<'_>])] = &[
        (b"%d %d", &fmt_args![1]),
        (b"%s", &fmt_args![2.5]),
        (b"%n", &fmt_args![0]),
        (b"%lc", &[FormatArg::Char(0x11_0000)]),
    ];
    for (template, args) in bad {
        let (calls, code) = sized_once(template, args);
        assert!(calls.is_empty());
        assert!(code < 0, "{:?} -> {code}", String::from_utf8_lossy(template));

        let mut called = false;
        let mut sink = |_: &CStr| called = true;
        let result = recording().emit_terminated(&mut sink, template, args);
        assert!(!called);
        assert_eq!(status_code(&result, Convention::Terminated), 0);
    }
}

// ---------------------------------------------------------------------------
// 4. Repeatability
// ---------------------------------------------------------------------------

#[test]
fn identical_calls_deliver_identical_text() {
    let mut emitter = recording();
    let mut seen: Vec<CString> = Vec::new();
    let mut sink = |text: &CStr| seen.push(text.to_owned());
    let args = fmt_args!["eth0", 1500u32, 0.25];
    for _ in 0..3 {
        emitter
            .emit_terminated(&mut sink, b"%s mtu %u loss %.2f%%", &args)
            .unwrap();
    }
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|s| s.as_bytes() == b"eth0 mtu 1500 loss 0.25%"));
}
