#![no_main]
use std::ffi::CStr;

use libfuzzer_sys::fuzz_target;
use setfmt_core::{
    EmitConfig, Emitter, FormatArg, RecordingAlloc, Rendered, measure, render_to_vec,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First two bytes pick the first-attempt capacity; the rest is the template.
    let initial = usize::from(u16::from_le_bytes([data[0], data[1]]));
    let template = &data[2..];
    let args = [
        FormatArg::SignedInt(3),
        FormatArg::Str(Some(b"cart")),
        FormatArg::Float(0.1),
        FormatArg::SignedInt(70_000),
        FormatArg::Float(-2.5e-300),
    ];
    let config = EmitConfig::new(initial);

    if measure(template, &args).is_ok_and(|n| n > 1 << 20) {
        return;
    }
    let expected = render_to_vec(template, &args);

    let mut sized = Vec::new();
    let mut sink = |r: Rendered<'_>| sized.push(r.as_bytes().to_vec());
    let mut emitter = Emitter::with_alloc(config, RecordingAlloc::new());
    let result = emitter.emit_sized(&mut sink, template, &args);
    match (&expected, &result) {
        (Ok(text), Ok(emitted)) => {
            assert_eq!(sized, vec![text.clone()]);
            assert_eq!(emitted.length as usize, text.len());
            assert!(emitted.attempts <= 2);
        }
        (Err(_), Err(_)) => assert!(sized.is_empty()),
        _ => panic!("emit and render disagree"),
    }

    let mut terminated = 0usize;
    let mut sink = |_: &CStr| terminated += 1;
    let mut emitter = Emitter::with_alloc(config, RecordingAlloc::new());
    let result = emitter.emit_terminated(&mut sink, template, &args);
    assert_eq!(terminated, usize::from(result.is_ok()));
    if let Ok(emitted) = result {
        assert!(emitted.capacity > emitted.length);
    }
});
