// All extern "C" exports accept raw pointers from C callers; the contract for
// each is stated once on the function rather than in a `# Safety` section.
#![allow(clippy::missing_safety_doc)]
//! # setfmt-abi
//!
//! `extern "C"` boundary for setfmt.
//!
//! ```text
//! C caller -> setfmt_print_out{,_sized} -> FfiArg decode -> setfmt-core Emitter -> C sink
//! ```
//!
//! C varargs are replaced by an array of tagged [`FfiArg`] values so the
//! crate builds on stable Rust. Results follow the C convention: the rendered
//! length on success, 0 when no buffer could be allocated, and a negative
//! errno for encoding errors (sized entry point only).

pub mod args;
pub mod collector_abi;
pub mod print_out_abi;

pub use args::{FfiArg, FfiArgValue};
