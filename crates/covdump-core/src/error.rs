//! Error types for the covdump-core library.
//!
//! Every stage of the decoding pipeline reports failures through the single
//! [`Error`] enum below. None of them are recoverable: a blob that violates
//! one of its declared sizes is reported, never patched up.

use thiserror::Error;

/// Result type alias for covdump operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all covdump operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Escape marker not followed by two hexadecimal digits
    #[error("malformed escape at offset {offset}: expected two hex digits, found {found:?}")]
    MalformedEscape {
        /// Byte offset of the escape marker in the literal
        offset: usize,
        /// The characters that followed the marker
        found: String,
    },

    /// Character outside the ASCII range in a literal
    #[error("invalid character {ch:?} at offset {offset}: literals are ASCII only")]
    InvalidLiteralChar {
        /// Byte offset of the character in the literal
        offset: usize,
        /// The offending character
        ch: char,
    },

    /// Blob ended before all header fields were read
    #[error("truncated header: expected {expected} fields, only {available} could be read")]
    TruncatedHeader {
        /// Number of fields the layout requires
        expected: usize,
        /// Number of fields successfully read
        available: usize,
    },

    /// Declared compressed length disagrees with the payload size
    #[error("header length mismatch: header declares {declared} payload bytes, found {actual}")]
    HeaderLengthMismatch {
        /// Length declared by the header
        declared: u64,
        /// Number of bytes following the header
        actual: usize,
    },

    /// zlib rejected the payload
    #[error("failed to inflate payload: {0}")]
    Inflate(#[source] std::io::Error),

    /// zlib failed to compress a payload
    #[error("failed to compress payload: {0}")]
    Deflate(#[source] std::io::Error),

    /// Decompressed size disagrees with the declared uncompressed length
    #[error("decompression size mismatch: header declares {declared} bytes, inflated {actual}")]
    DecompressionSizeMismatch {
        /// Uncompressed length declared by the header
        declared: u64,
        /// Actual number of bytes produced
        actual: usize,
    },

    /// Length-prefixed record runs past the end of the buffer
    #[error("truncated record at offset {offset}: declares {declared} bytes, {available} remain")]
    TruncatedRecord {
        /// Offset of the length prefix in the decompressed buffer
        offset: usize,
        /// Record length declared by the prefix
        declared: u64,
        /// Bytes left after the prefix
        available: usize,
    },

    /// Number of decoded records disagrees with the header
    #[error("record count mismatch: header declares {declared} records, decoded {actual}")]
    RecordCountMismatch {
        /// Record count declared by the header
        declared: u64,
        /// Number of records actually decoded
        actual: usize,
    },

    /// Value does not fit the integer codec in use
    #[error("{field} value {value} does not fit the field encoding (max {max})")]
    FieldOverflow {
        /// Name of the field being encoded
        field: &'static str,
        /// The value that was too large
        value: u64,
        /// Largest encodable value
        max: u64,
    },

    /// Record contains the separator byte and cannot be joined
    #[error("record {index} contains the 0x01 separator byte")]
    SeparatorInRecord {
        /// Position of the record in the input list
        index: usize,
    },
}

impl Error {
    /// Creates a new malformed escape error
    pub fn malformed_escape(offset: usize, found: impl Into<String>) -> Self {
        Self::MalformedEscape {
            offset,
            found: found.into(),
        }
    }

    /// Creates a new header length mismatch error
    pub fn header_length_mismatch(declared: u64, actual: usize) -> Self {
        Self::HeaderLengthMismatch { declared, actual }
    }

    /// Creates a new decompression size mismatch error
    pub fn decompression_size_mismatch(declared: u64, actual: usize) -> Self {
        Self::DecompressionSizeMismatch { declared, actual }
    }

    /// Creates a new truncated record error
    pub fn truncated_record(offset: usize, declared: u64, available: usize) -> Self {
        Self::TruncatedRecord {
            offset,
            declared,
            available,
        }
    }

    /// Creates a new field overflow error
    pub fn field_overflow(field: &'static str, value: u64, max: u64) -> Self {
        Self::FieldOverflow { field, value, max }
    }

    /// Returns true if the error means the input blob itself is inconsistent,
    /// as opposed to a caller asking to encode something unrepresentable
    pub fn is_integrity_violation(&self) -> bool {
        !matches!(
            self,
            Self::FieldOverflow { .. } | Self::SeparatorInRecord { .. } | Self::Deflate(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed_escape(4, "zz");
        assert!(err.to_string().contains("offset 4"));
        assert!(err.to_string().contains("\"zz\""));

        let err = Error::header_length_mismatch(12, 9);
        assert!(err.to_string().contains("declares 12"));
        assert!(err.to_string().contains("found 9"));
    }

    #[test]
    fn test_is_integrity_violation() {
        assert!(Error::decompression_size_mismatch(10, 11).is_integrity_violation());
        assert!(Error::truncated_record(0, 5, 2).is_integrity_violation());
        assert!(!Error::field_overflow("record count", 300, 255).is_integrity_violation());
        assert!(!Error::SeparatorInRecord { index: 1 }.is_integrity_violation());
    }
}
