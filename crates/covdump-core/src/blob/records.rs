//! Splitting a decompressed payload into name records.
//!
//! ## Formats
//!
//! - **Length-prefixed** (coverage filenames): `len` followed by `len` bytes,
//!   repeated until the buffer is exactly used up.
//! - **Separator-delimited** (profile names): names joined by a `0x01` byte.
//!   Every segment is a record, so adjacent separators or a separator at
//!   either end produce empty records, and an empty buffer produces one
//!   empty record.

use super::header::{SingleByte, VarIntCodec};
use crate::error::{Error, Result};
use crate::literal::escape_bytes;
use std::fmt;
use tracing::trace;

/// Byte separating names in the profile names section
pub const SEPARATOR: u8 = 0x01;

/// One raw name from a blob
///
/// No encoding is assumed; [`fmt::Display`] escapes anything that is not
/// printable ASCII.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Record(Vec<u8>);

impl Record {
    /// Creates a record from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the record, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a zero-length record
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_bytes(&self.0))
    }
}

impl From<&[u8]> for Record {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Record {
    fn from(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Record {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// How records are laid out in a decompressed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Each record preceded by its length
    LengthPrefixed,
    /// Records separated by [`SEPARATOR`]
    SeparatorDelimited,
}

impl RecordFormat {
    /// Split `data` using single-byte length prefixes
    pub fn split(self, data: &[u8]) -> Result<Vec<Record>> {
        self.split_with(&SingleByte, data)
    }

    /// Split `data`, reading length prefixes through `codec`
    pub fn split_with<C: VarIntCodec + ?Sized>(self, codec: &C, data: &[u8]) -> Result<Vec<Record>> {
        match self {
            Self::LengthPrefixed => split_length_prefixed(codec, data),
            Self::SeparatorDelimited => Ok(data
                .split(|&byte| byte == SEPARATOR)
                .map(Record::from)
                .collect()),
        }
    }

    /// Lay records out in this format.
    ///
    /// Joining an empty list with separators gives an empty buffer, which
    /// splits back into a single empty record.
    pub fn join<C: VarIntCodec + ?Sized>(self, codec: &C, records: &[Record]) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        match self {
            Self::LengthPrefixed => {
                for record in records {
                    codec.encode("record length", record.len() as u64, &mut out)?;
                    out.extend_from_slice(record.as_bytes());
                }
            }
            Self::SeparatorDelimited => {
                for (index, record) in records.iter().enumerate() {
                    if record.as_bytes().contains(&SEPARATOR) {
                        return Err(Error::SeparatorInRecord { index });
                    }
                    if index > 0 {
                        out.push(SEPARATOR);
                    }
                    out.extend_from_slice(record.as_bytes());
                }
            }
        }

        Ok(out)
    }
}

fn split_length_prefixed<C: VarIntCodec + ?Sized>(codec: &C, data: &[u8]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let (declared, used) = codec
            .decode(&data[offset..])
            .ok_or_else(|| Error::truncated_record(offset, 0, data.len() - offset))?;

        let start = offset + used;
        let available = data.len() - start;
        let len = usize::try_from(declared)
            .ok()
            .filter(|&len| len <= available)
            .ok_or_else(|| Error::truncated_record(offset, declared, available))?;

        let record = Record::from(&data[start..start + len]);
        trace!("Record at offset {}: {} bytes", offset, len);
        records.push(record);

        offset = start + len;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records(names: &[&str]) -> Vec<Record> {
        names.iter().map(|&name| Record::from(name)).collect()
    }

    #[test]
    fn test_length_prefixed_single() {
        let split = RecordFormat::LengthPrefixed.split(b"\x02ab").unwrap();
        assert_eq!(split, records(&["ab"]));
    }

    #[test]
    fn test_length_prefixed_zero_length() {
        let split = RecordFormat::LengthPrefixed.split(b"\x00\x01x\x00").unwrap();
        assert_eq!(split, records(&["", "x", ""]));
    }

    #[test]
    fn test_length_prefixed_empty_buffer() {
        assert!(RecordFormat::LengthPrefixed.split(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_length_prefixed_truncated() {
        let err = RecordFormat::LengthPrefixed.split(b"\x02ab\x05abc").unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedRecord { offset: 3, declared: 5, available: 3 }
        ));
    }

    #[test]
    fn test_length_prefixed_roundtrip() {
        let original = records(&["/src", "", "main.st", "main.st", "lib/a.st"]);
        let packed = RecordFormat::LengthPrefixed.join(&SingleByte, &original).unwrap();
        assert_eq!(packed[0], 4);
        assert_eq!(RecordFormat::LengthPrefixed.split(&packed).unwrap(), original);
    }

    #[test]
    fn test_length_prefixed_record_too_long() {
        let long = vec![Record::new(vec![b'x'; 256])];
        let err = RecordFormat::LengthPrefixed.join(&SingleByte, &long).unwrap_err();
        assert!(matches!(err, Error::FieldOverflow { value: 256, .. }));
    }

    #[test]
    fn test_separator_trailing() {
        let split = RecordFormat::SeparatorDelimited.split(b"foo\x01bar\x01").unwrap();
        assert_eq!(split, records(&["foo", "bar", ""]));
    }

    #[test]
    fn test_separator_boundaries() {
        assert_eq!(
            RecordFormat::SeparatorDelimited.split(&[SEPARATOR]).unwrap(),
            records(&["", ""])
        );
        assert_eq!(
            RecordFormat::SeparatorDelimited.split(&[]).unwrap(),
            records(&[""])
        );
        assert_eq!(
            RecordFormat::SeparatorDelimited.split(b"\x01a\x01\x01").unwrap(),
            records(&["", "a", "", ""])
        );
    }

    #[test]
    fn test_separator_join() {
        let joined = RecordFormat::SeparatorDelimited
            .join(&SingleByte, &records(&["foo", "bar", ""]))
            .unwrap();
        assert_eq!(joined, b"foo\x01bar\x01".to_vec());

        let err = RecordFormat::SeparatorDelimited
            .join(&SingleByte, &[Record::from("ok"), Record::from(&b"a\x01b"[..])])
            .unwrap_err();
        assert!(matches!(err, Error::SeparatorInRecord { index: 1 }));
    }

    #[test]
    fn test_record_display_escapes() {
        assert_eq!(Record::from(&b"main\x00.c"[..]).to_string(), r"main\00.c");
    }
}
