//! Template rendering driver.
//!
//! Walks the parsed segments of a template, pulls typed arguments in order
//! (`*` width, `.*` precision, then the value) and feeds the renderers in
//! [`crate::printf`]. This is the crate's `vsnprintf`: [`render_bounded`]
//! fills at most `dst.len()` bytes and always reports the full length.

use crate::error::EncodingError;
use crate::printf::{
    BoundedWriter, FormatArg, FormatOut, FormatSegment, FormatSpec, LengthMod, Precision, Width,
    format_char, format_encoded, format_float, format_pointer, format_signed, format_str,
    format_unsigned, parse_format_string,
};

/// Largest length a C `int` return can describe.
pub const INT_MAX: usize = i32::MAX as usize;

struct ArgCursor<'s, 'a> {
    args: &'s [FormatArg<'a>],
    next: usize,
}

impl<'s, 'a> ArgCursor<'s, 'a> {
    fn new(args: &'s [FormatArg<'a>]) -> Self {
        Self { args, next: 0 }
    }

    fn take(&mut self) -> Result<(usize, FormatArg<'a>), EncodingError> {
        let index = self.next;
        let arg = self
            .args
            .get(index)
            .copied()
            .ok_or(EncodingError::MissingArgument { index })?;
        self.next += 1;
        Ok((index, arg))
    }

    /// A `*` width or precision: a C `int`.
    fn take_star(&mut self) -> Result<i32, EncodingError> {
        let (index, arg) = self.take()?;
        match arg {
            FormatArg::SignedInt(v) => Ok(v as i32),
            FormatArg::UnsignedInt(v) => Ok(v as i32),
            _ => Err(EncodingError::ArgumentMismatch {
                index,
                conversion: '*',
            }),
        }
    }
}

/// Render `template` with `args` into `out`.
///
/// Returns the number of bytes this call produced (including any a bounded
/// writer could not store). Arguments beyond those the template consumes are
/// ignored, as in C.
pub fn render_to<O: FormatOut + ?Sized>(
    out: &mut O,
    template: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, EncodingError> {
    let start = out.written();
    let mut cursor = ArgCursor::new(args);

    for segment in parse_format_string(template) {
        match segment {
            FormatSegment::Literal(lit) => out.put_slice(lit),
            FormatSegment::Percent => out.put(b'%'),
            FormatSegment::Spec(spec) => render_spec(out, &spec, &mut cursor)?,
        }
        if out.written() - start > INT_MAX {
            return Err(EncodingError::Overflow);
        }
    }
    Ok(out.written() - start)
}

/// Render into a fixed window.
///
/// Stores the first `dst.len()` bytes of the output and returns the full
/// length the output requires. No terminator is written.
pub fn render_bounded(
    dst: &mut [u8],
    template: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, EncodingError> {
    let mut out = BoundedWriter::new(dst);
    render_to(&mut out, template, args)
}

/// Render into a freshly allocated vector.
pub fn render_to_vec(template: &[u8], args: &[FormatArg<'_>]) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    render_to(&mut out, template, args)?;
    Ok(out)
}

/// Length the rendered output requires, without storing any of it.
pub fn measure(template: &[u8], args: &[FormatArg<'_>]) -> Result<usize, EncodingError> {
    render_bounded(&mut [], template, args)
}

fn render_spec<O: FormatOut + ?Sized>(
    out: &mut O,
    spec: &FormatSpec,
    cursor: &mut ArgCursor<'_, '_>,
) -> Result<(), EncodingError> {
    let conversion = spec.conversion as char;
    let mut resolved = spec.clone();

    if matches!(spec.width, Width::FromArg) {
        let w = cursor.take_star()?;
        // A negative '*' width means '-' flag plus positive width.
        if w < 0 {
            resolved.flags.left_justify = true;
            resolved.flags.zero_pad = false;
        }
        resolved.width = Width::Fixed(w.unsigned_abs() as usize);
    }
    if matches!(spec.precision, Precision::FromArg) {
        let p = cursor.take_star()?;
        resolved.precision = if p < 0 {
            Precision::None
        } else {
            Precision::Fixed(p as usize)
        };
    }
    // `%` with flags, width or precision still prints a bare '%', after any
    // star arguments have been consumed.
    if spec.conversion == b'%' {
        out.put(b'%');
        return Ok(());
    }
    if let Width::Fixed(w) = resolved.width
        && w > INT_MAX
    {
        return Err(EncodingError::Overflow);
    }
    if let Precision::Fixed(p) = resolved.precision
        && p > INT_MAX
    {
        return Err(EncodingError::Overflow);
    }

    if spec.conversion == b'n' {
        return Err(EncodingError::UnsupportedConversion { conversion });
    }

    let (index, arg) = cursor.take()?;
    let mismatch = EncodingError::ArgumentMismatch { index, conversion };

    match spec.conversion {
        b'd' | b'i' => {
            let raw = match arg {
                FormatArg::SignedInt(v) => v,
                FormatArg::UnsignedInt(v) => v as i64,
                FormatArg::Char(c) => i64::from(c),
                _ => return Err(mismatch),
            };
            format_signed(truncate_signed(raw, spec.length), &resolved, out);
        }
        b'u' | b'o' | b'x' | b'X' => {
            let raw = match arg {
                FormatArg::UnsignedInt(v) => v,
                FormatArg::SignedInt(v) => v as u64,
                FormatArg::Char(c) => u64::from(c),
                _ => return Err(mismatch),
            };
            format_unsigned(truncate_unsigned(raw, spec.length), &resolved, out);
        }
        b'c' => {
            let code = match arg {
                FormatArg::Char(c) => c,
                FormatArg::SignedInt(v) => v as u32,
                FormatArg::UnsignedInt(v) => v as u32,
                _ => return Err(mismatch),
            };
            if spec.length == LengthMod::L {
                let ch = char::from_u32(code).ok_or(EncodingError::InvalidWideChar { index })?;
                let mut utf8 = [0u8; 4];
                format_encoded(ch.encode_utf8(&mut utf8).as_bytes(), &resolved, out);
            } else {
                format_char(code as u8, &resolved, out);
            }
        }
        b's' => match (arg, spec.length == LengthMod::L) {
            (FormatArg::Str(Some(s)), false) => format_str(s, &resolved, out),
            (FormatArg::Str(None), false) | (FormatArg::WideStr(None), true) => {
                format_str(null_text(resolved.precision), &resolved, out);
            }
            (FormatArg::WideStr(Some(units)), true) => {
                let encoded = encode_wide(units, resolved.precision, index)?;
                format_encoded(&encoded, &resolved, out);
            }
            _ => return Err(mismatch),
        },
        b'p' => {
            let addr = match arg {
                FormatArg::Pointer(a) => a,
                FormatArg::UnsignedInt(v) => v as usize,
                _ => return Err(mismatch),
            };
            format_pointer(addr, &resolved, out);
        }
        _ if spec.is_float() => match arg {
            FormatArg::Float(v) => format_float(v, &resolved, out),
            _ => return Err(mismatch),
        },
        _ => return Err(EncodingError::UnsupportedConversion { conversion }),
    }
    Ok(())
}

/// Apply C's integer promotion in reverse: keep only the bits the length
/// modifier says the caller passed, then sign-extend.
fn truncate_signed(raw: i64, length: LengthMod) -> i64 {
    match length.int_bits() {
        8 => i64::from(raw as i8),
        16 => i64::from(raw as i16),
        32 => i64::from(raw as i32),
        _ => raw,
    }
}

fn truncate_unsigned(raw: u64, length: LengthMod) -> u64 {
    match length.int_bits() {
        8 => u64::from(raw as u8),
        16 => u64::from(raw as u16),
        32 => u64::from(raw as u32),
        _ => raw,
    }
}

/// glibc prints `(null)` for a null `%s` unless the precision is too short
/// to hold it, in which case nothing is printed.
fn null_text(precision: Precision) -> &'static [u8] {
    match precision {
        Precision::Fixed(p) if p < 6 => b"",
        _ => b"(null)",
    }
}

/// UTF-8 encode a NUL-terminated wide string, stopping before a character
/// that would cross the precision limit.
fn encode_wide(
    units: &[u32],
    precision: Precision,
    index: usize,
) -> Result<Vec<u8>, EncodingError> {
    let limit = match precision {
        Precision::Fixed(p) => p,
        _ => usize::MAX,
    };
    let mut encoded = Vec::new();
    let mut utf8 = [0u8; 4];
    for &unit in units.iter().take_while(|&&u| u != 0) {
        let ch = char::from_u32(unit).ok_or(EncodingError::InvalidWideChar { index })?;
        let bytes = ch.encode_utf8(&mut utf8).as_bytes();
        if encoded.len() + bytes.len() > limit {
            break;
        }
        encoded.extend_from_slice(bytes);
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt_args;

    fn render(template: &str, args: &[FormatArg<'_>]) -> String {
        String::from_utf8(render_to_vec(template.as_bytes(), args).unwrap()).unwrap()
    }

    #[test]
    fn renders_mixed_template() {
        assert_eq!(render("%s has %d items", &fmt_args!["cart", 3]), "cart has 3 items");
        assert_eq!(
            render("%-6s|%5.1f|%#x|%c", &fmt_args!["ip", 2.25, 255u32, 'z']),
            "ip    |  2.2|0xff|z"
        );
        assert_eq!(render("100%% done", &[]), "100% done");
    }

    #[test]
    fn star_width_and_precision_consume_arguments_first() {
        assert_eq!(render("[%*d]", &fmt_args![5, 42]), "[   42]");
        assert_eq!(render("[%*d]", &fmt_args![-5, 42]), "[42   ]");
        assert_eq!(render("[%.*s]", &fmt_args![3, "abcdef"]), "[abc]");
        assert_eq!(render("[%.*f]", &fmt_args![-1, 1.5]), "[1.500000]");
    }

    #[test]
    fn length_modifiers_truncate_like_c_promotion() {
        assert_eq!(render("%hhd", &fmt_args![300]), "44");
        assert_eq!(render("%hu", &fmt_args![70000u32]), "4464");
        assert_eq!(render("%d", &fmt_args![u32::MAX]), "-1");
        assert_eq!(render("%lu", &fmt_args![u64::MAX]), "18446744073709551615");
        assert_eq!(render("%u", &fmt_args![-1]), "4294967295");
    }

    #[test]
    fn null_strings_follow_glibc() {
        assert_eq!(render("%s", &[FormatArg::Str(None)]), "(null)");
        assert_eq!(render("[%.3s]", &[FormatArg::Str(None)]), "[]");
        assert_eq!(render("%ls", &[FormatArg::WideStr(None)]), "(null)");
    }

    #[test]
    fn wide_conversions_encode_utf8() {
        let wide: &[u32] = &[0x68, 0xe9, 0x6c, 0x6c, 0x6f, 0, 0x21];
        assert_eq!(render("%ls", &fmt_args![wide]), "héllo");
        assert_eq!(render("%.2ls", &fmt_args![wide]), "h");
        assert_eq!(render("%lc", &fmt_args!['é']), "é");
    }

    #[test]
    fn invalid_wide_char_is_an_encoding_error() {
        let err = render_to_vec(b"%lc", &[FormatArg::Char(0xD800)]).unwrap_err();
        assert_eq!(err, EncodingError::InvalidWideChar { index: 0 });
        assert!(err.code() < 0);

        let wide: &[u32] = &[0x41, 0x11_0000];
        let err = render_to_vec(b"%ls", &fmt_args![wide]).unwrap_err();
        assert_eq!(err, EncodingError::InvalidWideChar { index: 0 });
    }

    #[test]
    fn missing_and_mismatched_arguments_are_rejected() {
        assert_eq!(
            render_to_vec(b"%d %d", &fmt_args![1]).unwrap_err(),
            EncodingError::MissingArgument { index: 1 }
        );
        assert_eq!(
            render_to_vec(b"%f", &fmt_args!["x"]).unwrap_err(),
            EncodingError::ArgumentMismatch {
                index: 0,
                conversion: 'f'
            }
        );
        assert_eq!(
            render_to_vec(b"%n", &fmt_args![0]).unwrap_err(),
            EncodingError::UnsupportedConversion { conversion: 'n' }
        );
    }

    #[test]
    fn oversized_width_overflows_int() {
        let err = measure(b"%2147483648d", &fmt_args![1]).unwrap_err();
        assert_eq!(err, EncodingError::Overflow);
    }

    #[test]
    fn bounded_render_reports_full_length() {
        let mut window = [0u8; 8];
        let n = render_bounded(&mut window, b"%s has %d items", &fmt_args!["cart", 3]).unwrap();
        assert_eq!(n, 16);
        assert_eq!(&window, b"cart has");
    }

    #[test]
    fn measure_matches_rendered_length() {
        let args = fmt_args!["name", 42, -7.5, 0xbeefu32];
        let template = b"%10s=%08d (%+.3e) [%#X]";
        let full = render_to_vec(template, &args).unwrap();
        assert_eq!(measure(template, &args).unwrap(), full.len());
    }

    #[test]
    fn huge_float_precisions_render_exactly() {
        let fixed = render("%.70000f", &fmt_args![1.0]);
        assert_eq!(fixed.len(), 70002);
        assert!(fixed.starts_with("1.000"));
        assert!(fixed[2..].bytes().all(|b| b == b'0'));

        let exp = render("%.70000e", &fmt_args![1.0]);
        assert_eq!(exp.len(), 70006);
        assert!(exp.ends_with("0e+00"));

        let general = render("%#.70000g", &fmt_args![1.0]);
        assert_eq!(general.len(), 70001);
        assert_eq!(render("%.70000g", &fmt_args![1.0]), "1");

        let star = render("%.*f", &fmt_args![70000, 1.0]);
        assert_eq!(star, fixed);

        let tenth = render("%.70000f", &fmt_args![0.1]);
        assert_eq!(&tenth[..1102], format!("{:.1100}", 0.1));
        assert!(tenth[1102..].bytes().all(|b| b == b'0'));
        assert_eq!(measure(b"%.70000E", &fmt_args![-2.5]).unwrap(), 70007);
    }

    #[test]
    fn percent_with_flags_or_width_prints_one_percent() {
        assert_eq!(render("%5%", &[]), "%");
        assert_eq!(render("[%-%]", &[]), "[%]");
        assert_eq!(render("%*%%d", &fmt_args![5, 7]), "%7");
    }

    #[test]
    fn extra_arguments_are_ignored() {
        assert_eq!(render("%d", &fmt_args![1, 2, 3]), "1");
    }
}
