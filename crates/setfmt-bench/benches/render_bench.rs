//! Formatting primitive benchmarks: parse, measure, and bounded render.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use setfmt_core::printf::parse_format_string;
use setfmt_core::{fmt_args, measure, render_bounded};

const MIXED: &[u8] = b"%-12s|%08.3f|%#x|%+d|%c|%e|%p";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_format_string_mixed", |b| {
        b.iter(|| parse_format_string(black_box(MIXED)).len())
    });
}

fn bench_measure(c: &mut Criterion) {
    let args = fmt_args!["name", 3.25, 255u32, 42, 'z', 1.0e10, 0x1000usize];
    c.bench_function("measure_mixed", |b| {
        b.iter(|| measure(black_box(MIXED), &args))
    });
}

fn bench_bounded(c: &mut Criterion) {
    let args = fmt_args!["name", 3.25, 255u32, 42, 'z', 1.0e10, 0x1000usize];
    let mut window = vec![0u8; 1024];
    c.bench_function("render_bounded_mixed", |b| {
        b.iter(|| render_bounded(&mut window, black_box(MIXED), &args))
    });
}

criterion_group!(benches, bench_parse, bench_measure, bench_bounded);
criterion_main!(benches);
