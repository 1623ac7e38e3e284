//! Format-and-emit benchmarks: first-attempt fits, grow-to-fit retries, and
//! the C entry point.

use std::ffi::{CStr, c_char, c_void};
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use setfmt_abi::FfiArg;
use setfmt_abi::print_out_abi::setfmt_print_out_sized;
use setfmt_core::{EmitConfig, Emitter, Rendered, fmt_args};

unsafe extern "C" fn discard_sized(_ctx: *mut c_void, text: *const c_char, len: u32, _cap: u32) {
    black_box((text, len));
}

fn bench_emit_short(c: &mut Criterion) {
    let mut emitter = Emitter::with_config(EmitConfig::default());
    let args = fmt_args!["cart", 3];

    c.bench_function("emit_terminated_short", |b| {
        let mut sink = |text: &CStr| {
            black_box(text);
        };
        b.iter(|| emitter.emit_terminated(&mut sink, black_box(&b"%s has %d items"[..]), &args))
    });
}

fn bench_emit_retry(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_sized_by_length");
    for len in [512usize, 1024, 2000, 16_384] {
        let body = "x".repeat(len);
        let args = fmt_args![body.as_str()];
        let mut emitter = Emitter::with_config(EmitConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            let mut sink = |r: Rendered<'_>| {
                black_box(r.len());
            };
            b.iter(|| emitter.emit_sized(&mut sink, b"%s", &args))
        });
    }
    group.finish();
}

fn bench_emit_abi(c: &mut Criterion) {
    let args = [FfiArg::cstr(c"blocklist".as_ptr()), FfiArg::unsigned(600)];
    c.bench_function("setfmt_print_out_sized", |b| {
        b.iter(|| unsafe {
            setfmt_print_out_sized(
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                Some(discard_sized),
                c"add %s timeout %u".as_ptr(),
                args.as_ptr(),
                args.len(),
            )
        })
    });
}

criterion_group!(benches, bench_emit_short, bench_emit_retry, bench_emit_abi);
criterion_main!(benches);
