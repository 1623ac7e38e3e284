//! printf formatting engine.
//!
//! Parses printf-style templates into segments and renders typed arguments
//! with POSIX width/precision/flag semantics. Output goes through the
//! [`FormatOut`] trait so the same renderers can fill a growable `Vec<u8>`
//! or a fixed window that only measures what does not fit.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C11 7.21.6.1

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    Z,    // 'z'
    T,    // 't'
    J,    // 'j'
    BigL, // 'L'
}

impl LengthMod {
    /// Integer width in bits that a C caller would have passed for this modifier.
    #[must_use]
    pub const fn int_bits(self) -> u32 {
        match self {
            Self::Hh => 8,
            Self::H => 16,
            Self::None => 32,
            Self::L | Self::Ll | Self::Z | Self::T | Self::J | Self::BigL => 64,
        }
    }
}

/// A parsed printf format specifier.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

impl FormatSpec {
    /// A bare `%<conversion>` with no flags, width, precision or length.
    #[must_use]
    pub const fn plain(conversion: u8) -> Self {
        Self {
            flags: FormatFlags {
                left_justify: false,
                force_sign: false,
                space_sign: false,
                alt_form: false,
                zero_pad: false,
            },
            width: Width::None,
            precision: Precision::None,
            length: LengthMod::None,
            conversion,
        }
    }

    /// True for `f F e E g G a A`.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(
            self.conversion,
            b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A'
        )
    }
}

// ---------------------------------------------------------------------------
// Format argument types
// ---------------------------------------------------------------------------

/// Typed argument value, the closed replacement for a C `va_list` entry.
///
/// Strings are borrowed; `None` stands for a null `char *` / `wchar_t *`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f64),
    /// A character code: a byte for `%c`, a Unicode scalar for `%lc`.
    Char(u32),
    Str(Option<&'a [u8]>),
    WideStr(Option<&'a [u32]>),
    Pointer(usize),
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for FormatArg<'_> {
                fn from(value: $ty) -> Self {
                    Self::$variant(value as $wide)
                }
            }
        )*
    };
}

impl_from_int!(SignedInt, i64: i8, i16, i32, i64, isize);
impl_from_int!(UnsignedInt, u64: u8, u16, u32, u64, usize);

impl From<f32> for FormatArg<'_> {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for FormatArg<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<char> for FormatArg<'_> {
    fn from(value: char) -> Self {
        Self::Char(value as u32)
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(Some(value.as_bytes()))
    }
}

impl<'a> From<&'a String> for FormatArg<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(Some(value.as_bytes()))
    }
}

impl<'a> From<&'a [u8]> for FormatArg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Str(Some(value))
    }
}

impl<'a> From<&'a core::ffi::CStr> for FormatArg<'a> {
    fn from(value: &'a core::ffi::CStr) -> Self {
        Self::Str(Some(value.to_bytes()))
    }
}

impl<'a> From<Option<&'a str>> for FormatArg<'a> {
    fn from(value: Option<&'a str>) -> Self {
        Self::Str(value.map(str::as_bytes))
    }
}

impl<'a> From<&'a [u32]> for FormatArg<'a> {
    fn from(value: &'a [u32]) -> Self {
        Self::WideStr(Some(value))
    }
}

impl<T> From<*const T> for FormatArg<'_> {
    fn from(value: *const T) -> Self {
        Self::Pointer(value as *const () as usize)
    }
}

impl<T> From<*mut T> for FormatArg<'_> {
    fn from(value: *mut T) -> Self {
        Self::Pointer(value as *const () as usize)
    }
}

/// Build a `[FormatArg; N]` from heterogeneous values.
///
/// ```
/// use setfmt_core::{fmt_args, render_to_vec};
/// let out = render_to_vec(b"%s has %d items", &fmt_args!["cart", 3]).unwrap();
/// assert_eq!(out, b"cart has 3 items");
/// ```
#[macro_export]
macro_rules! fmt_args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::FormatArg::from($arg)),*]
    };
}

// ---------------------------------------------------------------------------
// Segment: parsed pieces of a format string
// ---------------------------------------------------------------------------

/// A segment of a parsed format string.
#[derive(Debug, Clone)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%').
    Percent,
    /// A conversion specifier requiring an argument.
    Spec(FormatSpec),
}

// ---------------------------------------------------------------------------
// Output sink for renderers
// ---------------------------------------------------------------------------

/// Byte destination for the renderers.
pub trait FormatOut {
    fn put(&mut self, byte: u8);

    fn put_slice(&mut self, bytes: &[u8]);

    fn put_repeat(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.put(byte);
        }
    }

    /// Total bytes produced so far, including any that did not fit.
    fn written(&self) -> usize;
}

impl FormatOut for Vec<u8> {
    fn put(&mut self, byte: u8) {
        self.push(byte);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn put_repeat(&mut self, byte: u8, count: usize) {
        self.resize(self.len() + count, byte);
    }

    fn written(&self) -> usize {
        self.len()
    }
}

/// Fixed-window writer: stores what fits in `dst`, counts everything.
#[derive(Debug)]
pub struct BoundedWriter<'a> {
    dst: &'a mut [u8],
    required: usize,
}

impl<'a> BoundedWriter<'a> {
    #[must_use]
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, required: 0 }
    }

    /// True once more bytes were produced than the window holds.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.required > self.dst.len()
    }
}

impl FormatOut for BoundedWriter<'_> {
    fn put(&mut self, byte: u8) {
        if let Some(slot) = self.dst.get_mut(self.required) {
            *slot = byte;
        }
        self.required = self.required.saturating_add(1);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        let avail = self.dst.len().saturating_sub(self.required);
        let n = avail.min(bytes.len());
        if n > 0 {
            self.dst[self.required..self.required + n].copy_from_slice(&bytes[..n]);
        }
        self.required = self.required.saturating_add(bytes.len());
    }

    fn put_repeat(&mut self, byte: u8, count: usize) {
        let avail = self.dst.len().saturating_sub(self.required);
        let n = avail.min(count);
        if n > 0 {
            self.dst[self.required..self.required + n].fill(byte);
        }
        self.required = self.required.saturating_add(count);
    }

    fn written(&self) -> usize {
        self.required
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a single format specifier starting after the '%' character.
///
/// `fmt` points to the first byte AFTER '%'. Returns `(spec, bytes_consumed)`
/// where `bytes_consumed` counts from `fmt[0]`. Returns `None` if malformed.
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let mut pos = 0;
    let len = fmt.len();

    // --- flags ---
    let mut flags = FormatFlags::default();
    while pos < len {
        match fmt[pos] {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    // POSIX: '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    // --- width ---
    let width = if pos < len && fmt[pos] == b'*' {
        pos += 1;
        Width::FromArg
    } else {
        let start = pos;
        while pos < len && fmt[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos > start {
            Width::Fixed(parse_decimal(&fmt[start..pos]))
        } else {
            Width::None
        }
    };

    // --- precision ---
    let precision = if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            Precision::FromArg
        } else {
            let start = pos;
            while pos < len && fmt[pos].is_ascii_digit() {
                pos += 1;
            }
            Precision::Fixed(if pos > start {
                parse_decimal(&fmt[start..pos])
            } else {
                0
            })
        }
    } else {
        Precision::None
    };

    // --- length modifier ---
    let length = if pos < len {
        match fmt[pos] {
            b'h' => {
                pos += 1;
                if pos < len && fmt[pos] == b'h' {
                    pos += 1;
                    LengthMod::Hh
                } else {
                    LengthMod::H
                }
            }
            b'l' => {
                pos += 1;
                if pos < len && fmt[pos] == b'l' {
                    pos += 1;
                    LengthMod::Ll
                } else {
                    LengthMod::L
                }
            }
            b'z' => {
                pos += 1;
                LengthMod::Z
            }
            b't' => {
                pos += 1;
                LengthMod::T
            }
            b'j' => {
                pos += 1;
                LengthMod::J
            }
            b'L' => {
                pos += 1;
                LengthMod::BigL
            }
            _ => LengthMod::None,
        }
    } else {
        LengthMod::None
    };

    // --- conversion specifier ---
    if pos >= len {
        return None;
    }
    let conversion = fmt[pos];
    pos += 1;

    match conversion {
        b'd' | b'i' | b'u' | b'x' | b'X' | b'o' | b's' | b'c' | b'p' | b'n' | b'f' | b'F'
        | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' | b'%' => {}
        _ => return None,
    }

    Some((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos,
    ))
}

/// Split a printf format string into segments.
///
/// Yields `FormatSegment::Literal` for literal runs and `FormatSegment::Spec`
/// for each `%`-directive. `%%` yields `FormatSegment::Percent`.
pub fn parse_format_string(fmt: &[u8]) -> Vec<FormatSegment<'_>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let len = fmt.len();

    while pos < len {
        let start = pos;
        while pos < len && fmt[pos] != b'%' {
            pos += 1;
        }
        if pos > start {
            segments.push(FormatSegment::Literal(&fmt[start..pos]));
        }
        if pos >= len {
            break;
        }
        pos += 1;
        if pos >= len {
            // Trailing '%' with nothing after: literal.
            segments.push(FormatSegment::Literal(&fmt[pos - 1..pos]));
            break;
        }
        if fmt[pos] == b'%' {
            segments.push(FormatSegment::Percent);
            pos += 1;
            continue;
        }
        if let Some((spec, consumed)) = parse_format_spec(&fmt[pos..]) {
            pos += consumed;
            segments.push(FormatSegment::Spec(spec));
        } else {
            // Malformed spec: emit the '%' as literal and continue.
            segments.push(FormatSegment::Literal(&fmt[pos - 1..pos]));
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render a signed integer according to `spec`.
pub fn format_signed<O: FormatOut + ?Sized>(value: i64, spec: &FormatSpec, out: &mut O) {
    let negative = value < 0;
    let abs = value.unsigned_abs();

    let mut digits = [0u8; 64];
    let digit_count = render_digits(abs, 10, false, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let sign = sign_byte(negative, spec);
    emit_integer(sign, b"", digit_slice, value == 0, spec, out);
}

/// Render an unsigned integer (`u o x X`) according to `spec`.
pub fn format_unsigned<O: FormatOut + ?Sized>(value: u64, spec: &FormatSpec, out: &mut O) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(value, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let prefix: &[u8] = if !spec.flags.alt_form {
        b""
    } else {
        match spec.conversion {
            b'x' if value != 0 => b"0x",
            b'X' if value != 0 => b"0X",
            // '#o' forces a leading zero; emit_integer drops it when the
            // precision padding already supplies one.
            b'o' => b"0",
            _ => b"",
        }
    };
    emit_integer(None, prefix, digit_slice, value == 0, spec, out);
}

/// Shared integer layout: `[pad][sign][prefix][zero-pad][precision zeros][digits][pad]`.
fn emit_integer<O: FormatOut + ?Sized>(
    sign: Option<u8>,
    mut prefix: &[u8],
    digits: &[u8],
    is_zero: bool,
    spec: &FormatSpec,
    out: &mut O,
) {
    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 1,
    };
    // POSIX: precision 0 with value 0 produces no digits.
    let digits: &[u8] = if is_zero && precision == 0 { b"" } else { digits };
    let zero_prefix_count = precision.saturating_sub(digits.len());

    if prefix == b"0" && (zero_prefix_count > 0 || digits == b"0") {
        prefix = b"";
    }

    // An explicit precision disables the '0' flag for integers.
    let zero_pad = spec.flags.zero_pad && matches!(spec.precision, Precision::None);

    let content_len = sign.is_some() as usize + prefix.len() + zero_prefix_count + digits.len();
    let pad_total = resolve_width(spec).saturating_sub(content_len);

    if !spec.flags.left_justify && !zero_pad {
        out.put_repeat(b' ', pad_total);
    }
    if let Some(s) = sign {
        out.put(s);
    }
    out.put_slice(prefix);
    if !spec.flags.left_justify && zero_pad {
        out.put_repeat(b'0', pad_total);
    }
    out.put_repeat(b'0', zero_prefix_count);
    out.put_slice(digits);
    if spec.flags.left_justify {
        out.put_repeat(b' ', pad_total);
    }
}

/// Render a floating-point value according to `spec`.
///
/// Supports `%f`/`%F`, `%e`/`%E`, `%g`/`%G` and `%a`/`%A`. Digit generation
/// uses Rust's exact float formatting; layout follows POSIX width/flag rules.
pub fn format_float<O: FormatOut + ?Sized>(value: f64, spec: &FormatSpec, out: &mut O) {
    let uppercase = spec.conversion.is_ascii_uppercase();
    let negative = value.is_sign_negative();

    if value.is_nan() || value.is_infinite() {
        let word: &[u8] = match (value.is_nan(), uppercase) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        let sign = sign_byte(negative, spec);
        let content_len = sign.is_some() as usize + word.len();
        let pad_total = resolve_width(spec).saturating_sub(content_len);
        if !spec.flags.left_justify {
            out.put_repeat(b' ', pad_total);
        }
        if let Some(s) = sign {
            out.put(s);
        }
        out.put_slice(word);
        if spec.flags.left_justify {
            out.put_repeat(b' ', pad_total);
        }
        return;
    }

    let abs = value.abs();
    let precision = match spec.precision {
        Precision::Fixed(p) => Some(p),
        _ => None,
    };
    let alt = spec.flags.alt_form;

    let (prefix, body): (&[u8], FloatBody) = match spec.conversion | 0x20 {
        b'e' => (b"", format_e(abs, precision.unwrap_or(6), uppercase, alt)),
        b'g' => (b"", format_g(abs, precision.unwrap_or(6), uppercase, alt)),
        b'a' => (
            if uppercase { b"0X" } else { b"0x" },
            format_a(abs, precision, uppercase, alt),
        ),
        _ => (b"", format_f(abs, precision.unwrap_or(6), alt)),
    };

    let sign = sign_byte(negative, spec);
    let content_len = sign.is_some() as usize + prefix.len() + body.len();
    let pad_total = resolve_width(spec).saturating_sub(content_len);

    if !spec.flags.left_justify && !spec.flags.zero_pad {
        out.put_repeat(b' ', pad_total);
    }
    if let Some(s) = sign {
        out.put(s);
    }
    out.put_slice(prefix);
    if !spec.flags.left_justify && spec.flags.zero_pad {
        out.put_repeat(b'0', pad_total);
    }
    body.write_to(out);
    if spec.flags.left_justify {
        out.put_repeat(b' ', pad_total);
    }
}

/// Render a string argument according to `spec`.
///
/// `s` is treated like a C string: content stops at the first NUL.
/// Precision truncates the string if set.
pub fn format_str<O: FormatOut + ?Sized>(s: &[u8], spec: &FormatSpec, out: &mut O) {
    let s = match s.iter().position(|&b| b == 0) {
        Some(nul) => &s[..nul],
        None => s,
    };
    let max_len = match spec.precision {
        Precision::Fixed(p) => p,
        _ => s.len(),
    };
    pad_field(&s[..s.len().min(max_len)], spec, out);
}

/// Render a character according to `spec`.
pub fn format_char<O: FormatOut + ?Sized>(c: u8, spec: &FormatSpec, out: &mut O) {
    pad_field(&[c], spec, out);
}

/// Render an already-encoded multibyte sequence (`%lc` / `%ls`) as a field.
pub fn format_encoded<O: FormatOut + ?Sized>(bytes: &[u8], spec: &FormatSpec, out: &mut O) {
    pad_field(bytes, spec, out);
}

/// Render a pointer as `0x...` hex, or `(nil)` for null.
pub fn format_pointer<O: FormatOut + ?Sized>(addr: usize, spec: &FormatSpec, out: &mut O) {
    if addr == 0 {
        pad_field(b"(nil)", spec, out);
        return;
    }

    let mut digits = [0u8; 64];
    let count = render_digits(addr as u64, 16, false, &mut digits);
    let digit_slice = &digits[64 - count..];
    let content_len = 2 + count;
    let pad_total = resolve_width(spec).saturating_sub(content_len);

    if !spec.flags.left_justify {
        out.put_repeat(b' ', pad_total);
    }
    out.put_slice(b"0x");
    out.put_slice(digit_slice);
    if spec.flags.left_justify {
        out.put_repeat(b' ', pad_total);
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_decimal(digits: &[u8]) -> usize {
    let mut result = 0_usize;
    for &d in digits {
        result = result
            .saturating_mul(10)
            .saturating_add((d - b'0') as usize);
    }
    result
}

fn resolve_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

fn sign_byte(negative: bool, spec: &FormatSpec) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if spec.flags.force_sign {
        Some(b'+')
    } else if spec.flags.space_sign {
        Some(b' ')
    } else {
        None
    }
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Render `value` in the given `base` into the END of `buf`.
/// Returns the number of digits written. Digits are placed right-aligned.
fn render_digits(mut value: u64, base: u64, uppercase: bool, buf: &mut [u8; 64]) -> usize {
    if value == 0 {
        buf[63] = b'0';
        return 1;
    }
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = 64;
    while value > 0 && pos > 0 {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
    }
    64 - pos
}

/// Space-padded field for text-like conversions (`s c p`, nil pointers).
fn pad_field<O: FormatOut + ?Sized>(content: &[u8], spec: &FormatSpec, out: &mut O) {
    let pad_total = resolve_width(spec).saturating_sub(content.len());
    if !spec.flags.left_justify {
        out.put_repeat(b' ', pad_total);
    }
    out.put_slice(content);
    if spec.flags.left_justify {
        out.put_repeat(b' ', pad_total);
    }
}

/// An f64's exact decimal expansion ends within this many fraction digits
/// (1074 for `%f`, fewer for `%e`); every digit past it is zero. `format!`
/// also rejects runtime precisions above `u16::MAX`.
const MAX_EXACT_DIGITS: usize = 1100;

/// Float digits with the trailing zero run kept out of line, so large
/// precisions never materialize in a `String`.
struct FloatBody {
    head: String,
    zeros: usize,
    tail: String,
}

impl FloatBody {
    fn plain(head: String) -> Self {
        Self {
            head,
            zeros: 0,
            tail: String::new(),
        }
    }

    fn len(&self) -> usize {
        self.head.len() + self.zeros + self.tail.len()
    }

    fn write_to<O: FormatOut + ?Sized>(&self, out: &mut O) {
        out.put_slice(self.head.as_bytes());
        out.put_repeat(b'0', self.zeros);
        out.put_slice(self.tail.as_bytes());
    }
}

/// Fixed-point digits of `value` with `frac_digits` fraction digits, split
/// into the exact part and the count of zeros that follow it.
fn fixed_digits(value: f64, frac_digits: usize) -> (String, usize) {
    let shown = frac_digits.min(MAX_EXACT_DIGITS);
    (format!("{value:.shown$}"), frac_digits - shown)
}

/// `%f` / `%F` formatting: fixed-point decimal.
fn format_f(value: f64, precision: usize, alt_form: bool) -> FloatBody {
    let (mut head, zeros) = fixed_digits(value, precision);
    if precision == 0 && alt_form {
        head.push('.');
    }
    FloatBody {
        head,
        zeros,
        tail: String::new(),
    }
}

/// `%e` / `%E` formatting: scientific notation with at least two exponent digits.
fn format_e(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> FloatBody {
    let (mut head, zeros, exp) = split_exp(value, precision);
    if precision == 0 && alt_form {
        head.push('.');
    }
    let e_char = if uppercase { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    let abs_exp = exp.unsigned_abs();
    FloatBody {
        head,
        zeros,
        tail: format!("{e_char}{sign}{abs_exp:02}"),
    }
}

/// Round `value` to `precision` fraction digits in scientific form and return
/// `(mantissa, trailing zeros, decimal exponent)`.
fn split_exp(value: f64, precision: usize) -> (String, usize, i32) {
    let shown = precision.min(MAX_EXACT_DIGITS);
    let rendered = format!("{value:.shown$e}");
    let zeros = precision - shown;
    match rendered.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), zeros, exp.parse().unwrap_or(0)),
        None => (rendered, zeros, 0),
    }
}

/// `%g` / `%G` formatting: `%e` when the exponent is below -4 or at least
/// the precision, `%f` otherwise; trailing zeros dropped unless `#`.
fn format_g(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> FloatBody {
    let p = precision.max(1);
    let (_, _, exp) = split_exp(value, p - 1);

    if exp >= -4 && (exp as i64) < p as i64 {
        let frac_digits = (p as i64 - 1 - exp as i64).max(0) as usize;
        let (mut head, zeros) = fixed_digits(value, frac_digits);
        if alt_form {
            if !head.contains('.') {
                head.push('.');
            }
            FloatBody {
                head,
                zeros,
                tail: String::new(),
            }
        } else {
            strip_trailing_zeros(&mut head);
            FloatBody::plain(head)
        }
    } else {
        let mut body = format_e(value, p - 1, uppercase, alt_form);
        if !alt_form {
            body.zeros = 0;
            strip_trailing_zeros(&mut body.head);
        }
        body
    }
}

/// `%a` / `%A` body (without the `0x` prefix): hex mantissa and binary exponent.
fn format_a(value: f64, precision: Option<usize>, uppercase: bool, alt_form: bool) -> FloatBody {
    const FRAC_NIBBLES: usize = 13;
    const FRAC_MASK: u64 = (1 << 52) - 1;

    let bits = value.to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;
    let frac = bits & FRAC_MASK;

    let (lead, exp) = if value == 0.0 {
        (0u64, 0)
    } else if raw_exp == 0 {
        (0u64, -1022)
    } else {
        (1u64, raw_exp - 1023)
    };

    let (lead, mut nibbles, zeros) = match precision {
        Some(p) if p < FRAC_NIBBLES => {
            let shift = ((FRAC_NIBBLES - p) * 4) as u32;
            let full = (lead << 52) | frac;
            let kept = full >> shift;
            let rest = full & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            // Round half to even.
            let rounded = if rest > half || (rest == half && kept & 1 == 1) {
                kept + 1
            } else {
                kept
            };
            let frac_bits = (p * 4) as u32;
            let frac_part = if frac_bits == 0 {
                0
            } else {
                rounded & ((1u64 << frac_bits) - 1)
            };
            (rounded >> frac_bits, hex_digits(frac_part, p, uppercase), 0)
        }
        Some(p) => (
            lead,
            hex_digits(frac, FRAC_NIBBLES, uppercase),
            p - FRAC_NIBBLES,
        ),
        None => {
            let mut digits = hex_digits(frac, FRAC_NIBBLES, uppercase);
            while digits.ends_with('0') {
                digits.pop();
            }
            (lead, digits, 0)
        }
    };

    let p_char = if uppercase { 'P' } else { 'p' };
    let sign = if exp < 0 { '-' } else { '+' };
    let abs_exp = exp.unsigned_abs();
    if !nibbles.is_empty() || alt_form {
        nibbles.insert(0, '.');
    }
    FloatBody {
        head: format!("{lead}{nibbles}"),
        zeros,
        tail: format!("{p_char}{sign}{abs_exp}"),
    }
}

/// `count` hex digits of `value`, most significant first.
fn hex_digits(value: u64, count: usize, uppercase: bool) -> String {
    let mut s = String::with_capacity(count);
    for i in (0..count).rev() {
        let nibble = ((value >> (i * 4)) & 0xf) as u8;
        let c = match nibble {
            0..=9 => b'0' + nibble,
            _ if uppercase => b'A' + nibble - 10,
            _ => b'a' + nibble - 10,
        };
        s.push(c as char);
    }
    s
}

/// Remove trailing zeros after the decimal point.
fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
