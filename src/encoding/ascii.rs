//! # Fixed-Width Numeric Text
//!
//! Text tables store numbers as fixed-width ASCII fields. Two conventions
//! need smoothing over:
//!
//! - Double-precision values use a `D` exponent marker (`1.5D+10`). The
//!   parser only understands `E`, so [`normalize_exponent`] canonicalizes
//!   before parsing and [`restore_double_marker`] puts `D` back on encode.
//! - Formatted values must fit their declared byte width exactly. Integers
//!   and floats are right-aligned, text is left-aligned; a value that cannot
//!   be made to fit is a [`CodecError::FieldTooNarrow`], never a silent
//!   truncation.
//!
//! Float formatting prefers the shortest plain decimal form (which
//! round-trips exactly) and falls back to scientific notation with reducing
//! precision when the plain form is too wide.

use eyre::Result;

use crate::config::{DOUBLE_EXPONENT_MARKER, EXPONENT_MARKER};
use crate::records::error::CodecError;

/// Replaces `D`/`d` exponent markers with the canonical `E`.
pub fn normalize_exponent(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c == DOUBLE_EXPONENT_MARKER || c == 'd' {
                EXPONENT_MARKER
            } else {
                c
            }
        })
        .collect()
}

/// Replaces the `E` exponent marker with the double-precision `D`.
pub fn restore_double_marker(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c == EXPONENT_MARKER || c == 'e' {
                DOUBLE_EXPONENT_MARKER
            } else {
                c
            }
        })
        .collect()
}

/// Formats an integer right-aligned into exactly `width` characters.
pub fn format_int(value: i64, width: usize) -> Result<String> {
    let text = value.to_string();
    if text.len() > width {
        return Err(CodecError::FieldTooNarrow { value: text, width }.into());
    }
    Ok(format!("{text:>width$}"))
}

/// Formats a float right-aligned into exactly `width` characters.
///
/// With `double_marker` set, the exponent (if any) is written with the
/// double-precision `D` convention.
pub fn format_float(value: f64, width: usize, double_marker: bool) -> Result<String> {
    let mut text = format!("{value}");
    if value.is_finite() && !text.contains('.') && !text.contains('e') {
        text.push_str(".0");
    }

    if text.len() > width {
        let mut scientific = None;
        for precision in (0..=16).rev() {
            let candidate = format!("{value:.precision$E}");
            if candidate.len() <= width {
                scientific = Some(candidate);
                break;
            }
        }
        text = match scientific {
            Some(s) => s,
            None => return Err(CodecError::FieldTooNarrow { value: text, width }.into()),
        };
    }

    if double_marker {
        text = restore_double_marker(&text);
    }
    Ok(format!("{text:>width$}"))
}

/// Formats text left-aligned into exactly `width` characters.
pub fn format_text(value: &str, width: usize) -> Result<String> {
    if value.len() > width {
        return Err(CodecError::FieldTooNarrow {
            value: value.to_string(),
            width,
        }
        .into());
    }
    Ok(format!("{value:<width$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_double_markers() {
        assert_eq!(normalize_exponent("1.5D+10"), "1.5E+10");
        assert_eq!(normalize_exponent("2.0d-3"), "2.0E-3");
        assert_eq!(normalize_exponent("42"), "42");
    }

    #[test]
    fn restores_double_markers() {
        assert_eq!(restore_double_marker("1.5E10"), "1.5D10");
    }

    #[test]
    fn normalized_text_parses() {
        let parsed: f64 = normalize_exponent("1.5D+2").trim().parse().unwrap();
        assert_eq!(parsed, 150.0);
    }

    #[test]
    fn int_is_right_aligned() {
        assert_eq!(format_int(42, 6).unwrap(), "    42");
        assert_eq!(format_int(-7, 3).unwrap(), " -7");
    }

    #[test]
    fn int_too_wide_fails() {
        let err = format_int(123456, 4).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::FieldTooNarrow { width: 4, .. })
        ));
    }

    #[test]
    fn float_plain_form_roundtrips() {
        let formatted = format_float(1.25, 8, false).unwrap();
        assert_eq!(formatted, "    1.25");
        let reparsed: f64 = formatted.trim().parse().unwrap();
        assert_eq!(reparsed, 1.25);
    }

    #[test]
    fn float_gets_decimal_point() {
        assert_eq!(format_float(3.0, 5, false).unwrap(), "  3.0");
    }

    #[test]
    fn wide_float_falls_back_to_scientific() {
        let formatted = format_float(123456789.0, 8, false).unwrap();
        assert!(formatted.len() == 8);
        assert!(formatted.contains('E'));
    }

    #[test]
    fn double_marker_applied_to_scientific_form() {
        let formatted = format_float(1.0e40, 8, true).unwrap();
        assert!(formatted.contains('D'));
        assert!(!formatted.contains('E'));
    }

    #[test]
    fn text_is_left_aligned() {
        assert_eq!(format_text("abc", 5).unwrap(), "abc  ");
    }

    #[test]
    fn oversized_text_fails() {
        assert!(format_text("abcdef", 4).is_err());
    }
}
