#![no_main]
use libfuzzer_sys::fuzz_target;
use setfmt_core::printf::{FormatSegment, parse_format_string};
use setfmt_core::{FormatArg, measure, render_bounded, render_to_vec};

const ARGS: [FormatArg<'static>; 6] = [
    FormatArg::SignedInt(-42),
    FormatArg::Str(Some(b"fuzz")),
    FormatArg::Float(1.5),
    FormatArg::UnsignedInt(7),
    FormatArg::Char(0x41),
    FormatArg::Str(None),
];

/// Huge field widths are valid but only exhaust memory.
const MAX_RENDER: usize = 1 << 20;

fuzz_target!(|data: &[u8]| {
    // Literal segments are slices of the template.
    let literal: usize = parse_format_string(data)
        .iter()
        .map(|s| match s {
            FormatSegment::Literal(l) => l.len(),
            _ => 0,
        })
        .sum();
    assert!(literal <= data.len());

    // Bounded, measured, and unbounded renders agree on length and prefix.
    let Ok(needed) = measure(data, &ARGS) else {
        return;
    };
    if needed > MAX_RENDER {
        return;
    }
    let full = render_to_vec(data, &ARGS).expect("measured template renders");
    assert_eq!(full.len(), needed);

    let window_len = data.first().copied().unwrap_or(0) as usize;
    let mut window = vec![0u8; window_len];
    let n = render_bounded(&mut window, data, &ARGS).expect("same template renders twice");
    assert_eq!(n, full.len());
    let stored = n.min(window_len);
    assert_eq!(&window[..stored], &full[..stored]);
});
