//! Tagged argument records passed in place of a C `va_list`.

use std::ffi::{CStr, c_void};

use libc::c_char;
use setfmt_core::FormatArg;

/// `long long` / `int` and narrower: read from `value.signed`.
pub const SETFMT_ARG_SIGNED: u32 = 0;
/// Unsigned integers: `value.unsigned`.
pub const SETFMT_ARG_UNSIGNED: u32 = 1;
/// `double`: `value.double`.
pub const SETFMT_ARG_DOUBLE: u32 = 2;
/// `%c` byte or `%lc` code point: `value.unsigned`.
pub const SETFMT_ARG_CHAR: u32 = 3;
/// NUL-terminated `char *` (may be null): `value.ptr`.
pub const SETFMT_ARG_CSTR: u32 = 4;
/// NUL-terminated `wchar_t *` (may be null): `value.ptr`.
pub const SETFMT_ARG_WSTR: u32 = 5;
/// `void *` for `%p`: `value.ptr`.
pub const SETFMT_ARG_POINTER: u32 = 6;

#[repr(C)]
#[derive(Clone, Copy)]
pub union FfiArgValue {
    pub signed: i64,
    pub unsigned: u64,
    pub double: f64,
    pub ptr: *const c_void,
}

/// One argument: a `SETFMT_ARG_*` tag and the matching union member.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiArg {
    pub tag: u32,
    pub value: FfiArgValue,
}

impl FfiArg {
    pub fn signed(v: i64) -> Self {
        Self {
            tag: SETFMT_ARG_SIGNED,
            value: FfiArgValue { signed: v },
        }
    }

    pub fn unsigned(v: u64) -> Self {
        Self {
            tag: SETFMT_ARG_UNSIGNED,
            value: FfiArgValue { unsigned: v },
        }
    }

    pub fn double(v: f64) -> Self {
        Self {
            tag: SETFMT_ARG_DOUBLE,
            value: FfiArgValue { double: v },
        }
    }

    pub fn char(code: u32) -> Self {
        Self {
            tag: SETFMT_ARG_CHAR,
            value: FfiArgValue {
                unsigned: u64::from(code),
            },
        }
    }

    pub fn cstr(ptr: *const c_char) -> Self {
        Self {
            tag: SETFMT_ARG_CSTR,
            value: FfiArgValue { ptr: ptr.cast() },
        }
    }

    pub fn wstr(ptr: *const libc::wchar_t) -> Self {
        Self {
            tag: SETFMT_ARG_WSTR,
            value: FfiArgValue { ptr: ptr.cast() },
        }
    }

    pub fn pointer(ptr: *const c_void) -> Self {
        Self {
            tag: SETFMT_ARG_POINTER,
            value: FfiArgValue { ptr },
        }
    }
}

/// An argument record whose tag is not one of `SETFMT_ARG_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownTag {
    pub index: usize,
    pub tag: u32,
}

/// Decode `nargs` records into borrowed [`FormatArg`]s.
///
/// # Safety
///
/// `args` must point to `nargs` initialized records (or be null with
/// `nargs == 0`). Every string pointer must be null or NUL-terminated and
/// outlive `'a`.
pub unsafe fn decode_args<'a>(
    args: *const FfiArg,
    nargs: usize,
) -> Result<Vec<FormatArg<'a>>, UnknownTag> {
    if args.is_null() || nargs == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: caller guarantees `nargs` readable records.
    let records = unsafe { std::slice::from_raw_parts(args, nargs) };
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            // SAFETY: the tag selects the union member the caller wrote.
            unsafe { decode_one(record, index) }
        })
        .collect()
}

unsafe fn decode_one<'a>(record: &FfiArg, index: usize) -> Result<FormatArg<'a>, UnknownTag> {
    let v = record.value;
    let arg = match record.tag {
        SETFMT_ARG_SIGNED => FormatArg::SignedInt(unsafe { v.signed }),
        SETFMT_ARG_UNSIGNED => FormatArg::UnsignedInt(unsafe { v.unsigned }),
        SETFMT_ARG_DOUBLE => FormatArg::Float(unsafe { v.double }),
        SETFMT_ARG_CHAR => FormatArg::Char(unsafe { v.unsigned } as u32),
        SETFMT_ARG_CSTR => {
            let p = unsafe { v.ptr }.cast::<c_char>();
            if p.is_null() {
                FormatArg::Str(None)
            } else {
                // SAFETY: non-null string arguments are NUL-terminated.
                FormatArg::Str(Some(unsafe { CStr::from_ptr(p) }.to_bytes()))
            }
        }
        SETFMT_ARG_WSTR => {
            let p = unsafe { v.ptr }.cast::<libc::wchar_t>();
            FormatArg::WideStr(if p.is_null() {
                None
            } else {
                Some(unsafe { wide_units(p) })
            })
        }
        SETFMT_ARG_POINTER => FormatArg::Pointer(unsafe { v.ptr } as usize),
        tag => return Err(UnknownTag { index, tag }),
    };
    Ok(arg)
}

/// View a NUL-terminated `wchar_t` string (terminator included) as code units.
unsafe fn wide_units<'a>(p: *const libc::wchar_t) -> &'a [u32] {
    let mut len = 0usize;
    // SAFETY: caller guarantees a terminating 0 unit.
    while unsafe { *p.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: wchar_t is 32 bits on the supported targets; len + 1 units are readable.
    unsafe { std::slice::from_raw_parts(p.cast::<u32>(), len + 1) }
}
