//! # setfmt-core
//!
//! Render a printf-style template into a buffer sized to fit, then hand the
//! result to a sink exactly once.
//!
//! The first attempt renders into [`DEFAULT_INITIAL_CAPACITY`] bytes. If the
//! output does not fit, the buffer is released and one sized to the measured
//! length is allocated instead. Two delivery conventions exist:
//!
//! | convention | fits when | retry capacity | sink receives |
//! |---|---|---|---|
//! | [`Convention::Terminated`] | `n <= cap - 1` | `n + 1` | `&CStr` |
//! | [`Convention::Sized`] | `n <= cap` | `n` | bytes, `len`, `cap` |
//!
//! ```
//! use setfmt_core::{Emitter, EmitConfig, Rendered, fmt_args};
//!
//! let mut seen = Vec::new();
//! let mut sink = |r: Rendered<'_>| seen.push(r.as_bytes().to_vec());
//! let emitted = Emitter::with_config(EmitConfig::default())
//!     .emit_sized(&mut sink, b"%s has %d items", &fmt_args!["cart", 3])
//!     .unwrap();
//! assert_eq!(emitted.length, 16);
//! assert_eq!(seen, vec![b"cart has 3 items".to_vec()]);
//! ```
//!
//! No `unsafe` code is permitted in this crate; the C entry points live in
//! `setfmt-abi`.

#![deny(unsafe_code)]

pub mod buffer;
pub mod collector;
pub mod config;
pub mod emit;
pub mod error;
pub mod printf;
pub mod render;

pub use buffer::{AllocError, BufferAlloc, RecordingAlloc, RenderBuffer, SystemAlloc};
pub use collector::OutputCollector;
pub use config::{DEFAULT_INITIAL_CAPACITY, EmitConfig, INITIAL_CAPACITY_ENV};
pub use emit::{
    Convention, Emitted, Emitter, Rendered, SizedSink, TerminatedSink, format_and_emit,
    format_and_emit_sized, status_code,
};
pub use error::{EmitError, EncodingError};
pub use printf::FormatArg;
pub use render::{measure, render_bounded, render_to, render_to_vec};
