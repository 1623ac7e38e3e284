//! Ready-made sinks that capture output into an [`OutputCollector`].
//!
//! The collector is an opaque handle on the C side. Pass it as the `ctx` of
//! `setfmt_print_out*` together with `setfmt_collect` / `setfmt_collect_sized`
//! as the sink.

use std::ffi::{CStr, c_void};

use libc::c_char;
use setfmt_core::OutputCollector;

unsafe fn collector<'a>(handle: *mut c_void) -> Option<&'a mut OutputCollector> {
    // SAFETY: non-null handles come from `setfmt_collector_new`.
    unsafe { handle.cast::<OutputCollector>().as_mut() }
}

/// Allocate an empty collector. Release it with `setfmt_collector_free`.
#[unsafe(no_mangle)]
pub extern "C" fn setfmt_collector_new() -> *mut c_void {
    Box::into_raw(Box::new(OutputCollector::new())).cast()
}

/// Release a collector. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_collector_free(handle: *mut c_void) {
    if handle.is_null() {
        return;
    }
    // SAFETY: handle was produced by `Box::into_raw` in `setfmt_collector_new`.
    drop(unsafe { Box::from_raw(handle.cast::<OutputCollector>()) });
}

/// Drop every collected chunk.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_collector_clear(handle: *mut c_void) {
    if let Some(c) = unsafe { collector(handle) } {
        c.clear();
    }
}

/// Number of chunks collected (one per successful print-out). 0 for null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_collector_len(handle: *mut c_void) -> usize {
    unsafe { collector(handle) }.map_or(0, |c| c.len())
}

/// Copy the concatenated text into `dst`, snprintf style.
///
/// At most `size - 1` bytes are copied and `dst` is always NUL-terminated
/// when `size > 0`. Returns the full text length so callers can size a
/// second call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_collector_text(
    handle: *mut c_void,
    dst: *mut c_char,
    size: usize,
) -> usize {
    let Some(c) = (unsafe { collector(handle) }) else {
        return 0;
    };
    let text = c.text();
    if !dst.is_null() && size > 0 {
        let copy_len = text.len().min(size - 1);
        // SAFETY: dst has room for `size` bytes.
        unsafe {
            std::ptr::copy_nonoverlapping(text.as_ptr(), dst.cast::<u8>(), copy_len);
            *dst.add(copy_len) = 0;
        }
    }
    text.len()
}

/// Terminated sink: append `text` to the collector in `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_collect(ctx: *mut c_void, text: *const c_char) {
    if text.is_null() {
        return;
    }
    if let Some(c) = unsafe { collector(ctx) } {
        // SAFETY: terminated sinks receive NUL-terminated text.
        c.push_bytes(unsafe { CStr::from_ptr(text) }.to_bytes());
    }
}

/// Sized sink: append `len` bytes of `text` to the collector in `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn setfmt_collect_sized(
    ctx: *mut c_void,
    text: *const c_char,
    len: u32,
    cap: u32,
) {
    debug_assert!(len <= cap);
    let Some(c) = (unsafe { collector(ctx) }) else {
        return;
    };
    if text.is_null() || len == 0 {
        c.push_bytes(&[]);
        return;
    }
    // SAFETY: sized sinks receive `len` readable bytes.
    let bytes = unsafe { std::slice::from_raw_parts(text.cast::<u8>(), len as usize) };
    c.push_bytes(bytes);
}
