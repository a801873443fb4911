//! Escaped byte-string literals.
//!
//! LLVM prints constant byte arrays in textual IR as `c"..."` strings where
//! printable characters stand for themselves and every other byte is written
//! as a backslash followed by two hex digits:
//!
//! ```text
//! c"\02\1Ex\DA\CBH\CD\C9\C9\D7+..."
//! ```
//!
//! [`decode_literal`] turns the body of such a string back into bytes and
//! [`escape_bytes`] produces it from bytes.
//!
//! Each escape is exactly one byte. Nothing here knows about LEB128
//! continuation bits; that is the header codec's concern.

use crate::error::{Error, Result};

/// Escape marker used by LLVM IR string constants
pub const DEFAULT_ESCAPE: char = '\\';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Decode a literal using the default `\` escape marker.
pub fn decode_literal(literal: &str) -> Result<Vec<u8>> {
    decode_literal_with(literal, DEFAULT_ESCAPE)
}

/// Decode a literal using a custom escape marker.
///
/// Scans left to right. Any ASCII character maps to its own byte value; the
/// escape marker must be followed by exactly two hexadecimal digits (either
/// case).
pub fn decode_literal_with(literal: &str, escape: char) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(literal.len());
    let mut chars = literal.char_indices();

    while let Some((offset, ch)) = chars.next() {
        if ch == escape {
            let hi = chars.next().and_then(|(_, c)| c.to_digit(16));
            let lo = chars.next().and_then(|(_, c)| c.to_digit(16));

            match (hi, lo) {
                (Some(hi), Some(lo)) => bytes.push(((hi << 4) | lo) as u8),
                _ => {
                    let found: String = literal[offset + escape.len_utf8()..]
                        .chars()
                        .take(2)
                        .collect();
                    return Err(Error::malformed_escape(offset, found));
                }
            }
            continue;
        }

        if !ch.is_ascii() {
            return Err(Error::InvalidLiteralChar { offset, ch });
        }
        bytes.push(ch as u8);
    }

    Ok(bytes)
}

/// Escape bytes using the default `\` escape marker.
pub fn escape_bytes(data: &[u8]) -> String {
    escape_bytes_with(data, DEFAULT_ESCAPE)
}

/// Escape bytes the way LLVM prints string constants.
///
/// Printable ASCII other than `"` and the escape marker is kept as is;
/// every other byte becomes the marker plus two uppercase hex digits.
pub fn escape_bytes_with(data: &[u8], escape: char) -> String {
    let mut out = String::with_capacity(data.len());

    for &byte in data {
        let ch = byte as char;
        if (0x20..=0x7E).contains(&byte) && ch != '"' && ch != escape {
            out.push(ch);
        } else {
            out.push(escape);
            out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
            out.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
        }
    }

    out
}

/// Strip an IR `c"..."` wrapper if present.
///
/// Leading and trailing spaces are left alone: `0x20` is a valid payload
/// byte and LLVM prints it unescaped.
pub fn strip_ir_quotes(literal: &str) -> &str {
    literal
        .strip_prefix("c\"")
        .and_then(|body| body.strip_suffix('"'))
        .unwrap_or(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_plain_and_escaped() {
        let bytes = decode_literal(r"\02\03ab").unwrap();
        assert_eq!(bytes, vec![0x02, 0x03, b'a', b'b']);
    }

    #[test]
    fn test_decode_hex_case_insensitive() {
        assert_eq!(decode_literal(r"\da\DA\dA").unwrap(), vec![0xDA; 3]);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_literal("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_escape_non_hex() {
        let err = decode_literal(r"ab\0g").unwrap_err();
        match err {
            Error::MalformedEscape { offset, found } => {
                assert_eq!(offset, 2);
                assert_eq!(found, "0g");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_escape_at_end() {
        let err = decode_literal(r"abc\4").unwrap_err();
        assert!(matches!(err, Error::MalformedEscape { offset: 3, .. }));

        let err = decode_literal("\\").unwrap_err();
        assert!(matches!(err, Error::MalformedEscape { offset: 0, .. }));
    }

    #[test]
    fn test_escaped_backslash_needs_hex() {
        // LLVM writes a literal backslash as \5C, never as \\
        assert!(decode_literal(r"\\").is_err());
        assert_eq!(decode_literal(r"\5C").unwrap(), vec![b'\\']);
    }

    #[test]
    fn test_non_ascii_rejected() {
        let err = decode_literal("ab\u{e9}").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLiteralChar { offset: 2, ch: '\u{e9}' }
        ));
    }

    #[test]
    fn test_custom_escape_marker() {
        assert_eq!(decode_literal_with("%41%2f\\", '%').unwrap(), b"A/\\".to_vec());
        assert_eq!(escape_bytes_with(b"%A\x01", '%'), "%25A%01");
    }

    #[test]
    fn test_escape_bytes_llvm_style() {
        assert_eq!(escape_bytes(b"\x02\x1Eab \"\\\x7F"), r"\02\1Eab \22\5C\7F");
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).collect();
        let literal = escape_bytes(&data);
        assert!(literal.is_ascii());
        assert_eq!(decode_literal(&literal).unwrap(), data);
    }

    #[test]
    fn test_strip_ir_quotes() {
        assert_eq!(strip_ir_quotes(r#"c"\01x""#), r"\01x");
        assert_eq!(strip_ir_quotes(r"\01x"), r"\01x");
        assert_eq!(strip_ir_quotes(" ab "), " ab ");
    }
}
