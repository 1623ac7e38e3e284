//! `setfmt_print_out` / `setfmt_print_out_sized`: render a template and hand
//! the result to a C callback.
//!
//! The text passed to a sink is borrowed for the duration of the callback
//! only; the buffer is released as soon as the sink returns. A sink that
//! needs the text afterwards must copy it.

use std::ffi::{CStr, c_void};

use libc::{c_char, c_int};
use setfmt_core::{
    Convention, Emitter, Rendered, SizedSink, TerminatedSink, error::EINVAL, status_code,
};

use crate::args::{FfiArg, decode_args};

/// Receives NUL-terminated text.
pub type TerminatedSinkFn = unsafe extern "C" fn(ctx: *mut c_void, text: *const c_char);

/// Receives text with its length and the capacity of the buffer holding it.
/// `text` is not NUL-terminated.
pub type SizedSinkFn =
    unsafe extern "C" fn(ctx: *mut c_void, text: *const c_char, len: u32, cap: u32);

struct CTerminated {
    ctx: *mut c_void,
    sink: TerminatedSinkFn,
}

impl TerminatedSink for CTerminated {
    fn emit(&mut self, text: &CStr) {
        // SAFETY: the caller of the entry point supplied a callable sink for `ctx`.
        unsafe { (self.sink)(self.ctx, text.as_ptr()) }
    }
}

struct CSized {
    ctx: *mut c_void,
    sink: SizedSinkFn,
}

impl SizedSink for CSized {
    fn emit(&mut self, rendered: Rendered<'_>) {
        let text = rendered.as_bytes().as_ptr().cast::<c_char>();
        // SAFETY: as above; `text` is valid for `len` bytes during the call.
        unsafe { (self.sink)(self.ctx, text, rendered.len(), rendered.capacity()) }
    }
}

/// Render `fmt` with `args[..nargs]` and deliver it NUL-terminated to `sink`.
///
/// Returns the rendered length, or 0 if a buffer could not be allocated, the
/// template could not be rendered, or a required pointer was null.
/// `session` is accepted for call-site compatibility and ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_print_out(
    session: *mut c_void,
    ctx: *mut c_void,
    sink: Option<TerminatedSinkFn>,
    fmt: *const c_char,
    args: *const FfiArg,
    nargs: usize,
) -> c_int {
    let _ = session;
    let Some(sink) = sink else {
        return 0;
    };
    if fmt.is_null() {
        return 0;
    }
    // SAFETY: fmt is non-null and NUL-terminated per the C contract.
    let template = unsafe { CStr::from_ptr(fmt) }.to_bytes();
    // SAFETY: args/nargs describe the caller's argument array.
    let Ok(args) = (unsafe { decode_args(args, nargs) }) else {
        return 0;
    };

    let mut sink = CTerminated { ctx, sink };
    let result = Emitter::new().emit_terminated(&mut sink, template, &args);
    status_code(&result, Convention::Terminated)
}

/// Render `fmt` with `args[..nargs]` and deliver text, length and capacity.
///
/// Returns the rendered length, 0 if a buffer could not be allocated, or a
/// negative errno when the template could not be rendered. A null `fmt` or
/// `sink`, or an unknown argument tag, yields `-EINVAL`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_print_out_sized(
    session: *mut c_void,
    ctx: *mut c_void,
    sink: Option<SizedSinkFn>,
    fmt: *const c_char,
    args: *const FfiArg,
    nargs: usize,
) -> c_int {
    let _ = session;
    let Some(sink) = sink else {
        return -EINVAL;
    };
    if fmt.is_null() {
        return -EINVAL;
    }
    // SAFETY: as in `setfmt_print_out`.
    let template = unsafe { CStr::from_ptr(fmt) }.to_bytes();
    let Ok(args) = (unsafe { decode_args(args, nargs) }) else {
        return -EINVAL;
    };

    let mut sink = CSized { ctx, sink };
    let result = Emitter::new().emit_sized(&mut sink, template, &args);
    status_code(&result, Convention::Sized)
}
