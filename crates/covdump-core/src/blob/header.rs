//! Blob header fields.
//!
//! Both blob kinds start with a short run of unsigned integers:
//!
//! | Layout            | Fields                                              |
//! |-------------------|-----------------------------------------------------|
//! | `Empty`           | none                                                |
//! | `Lengths`         | uncompressed length, compressed length              |
//! | `CountedLengths`  | record count, uncompressed length, compressed length |
//!
//! LLVM writes these as ULEB128. Fields are read through [`VarIntCodec`];
//! the only codec provided is [`SingleByte`], which takes each byte as one
//! value. That matches ULEB128 only for values below 128: a real blob with a
//! larger field spreads it over two bytes and will not decode correctly
//! until a multi-byte codec is plugged in at this seam.

use crate::error::{Error, Result};
use tracing::trace;

/// Integer encoding used for header fields and record length prefixes
pub trait VarIntCodec: Send + Sync {
    /// Decode one value from the front of `data`.
    ///
    /// Returns the value and the number of bytes consumed, or `None` if
    /// `data` ends before a complete value.
    fn decode(&self, data: &[u8]) -> Option<(u64, usize)>;

    /// Largest value this codec can represent
    fn max_value(&self) -> u64;

    /// Append the encoding of `value` to `out`
    fn encode(&self, field: &'static str, value: u64, out: &mut Vec<u8>) -> Result<()>;
}

/// One byte per value, read as-is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleByte;

impl VarIntCodec for SingleByte {
    fn decode(&self, data: &[u8]) -> Option<(u64, usize)> {
        data.first().map(|&byte| (u64::from(byte), 1))
    }

    fn max_value(&self) -> u64 {
        u64::from(u8::MAX)
    }

    fn encode(&self, field: &'static str, value: u64, out: &mut Vec<u8>) -> Result<()> {
        let byte = u8::try_from(value)
            .map_err(|_| Error::field_overflow(field, value, self.max_value()))?;
        out.push(byte);
        Ok(())
    }
}

/// Which fields precede the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// No header at all
    Empty,
    /// Uncompressed and compressed payload lengths
    Lengths,
    /// Record count followed by the two payload lengths
    CountedLengths,
}

impl HeaderLayout {
    /// Number of integer fields in this layout
    pub fn field_count(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Lengths => 2,
            Self::CountedLengths => 3,
        }
    }
}

/// Declared payload sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLengths {
    /// Size of the payload after inflation
    pub uncompressed: u64,
    /// Size of the payload as stored
    pub compressed: u64,
}

/// Decoded header fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Number of records, for layouts that carry one
    pub record_count: Option<u64>,
    /// Payload sizes, for layouts that carry them
    pub lengths: Option<PayloadLengths>,
}

impl Header {
    /// Build a header from fields read in `layout` order
    fn from_fields(layout: HeaderLayout, fields: &[u64]) -> Self {
        match (layout, fields) {
            (HeaderLayout::CountedLengths, &[count, uncompressed, compressed]) => Self {
                record_count: Some(count),
                lengths: Some(PayloadLengths {
                    uncompressed,
                    compressed,
                }),
            },
            (HeaderLayout::Lengths, &[uncompressed, compressed]) => Self {
                record_count: None,
                lengths: Some(PayloadLengths {
                    uncompressed,
                    compressed,
                }),
            },
            _ => Self::default(),
        }
    }

    /// Header fields in on-disk order
    pub fn fields(&self) -> Vec<u64> {
        let mut fields = Vec::with_capacity(3);
        fields.extend(self.record_count);
        if let Some(lengths) = self.lengths {
            fields.push(lengths.uncompressed);
            fields.push(lengths.compressed);
        }
        fields
    }

    /// Append the encoded header to `out`
    pub fn encode<C: VarIntCodec + ?Sized>(&self, codec: &C, out: &mut Vec<u8>) -> Result<()> {
        if let Some(count) = self.record_count {
            codec.encode("record count", count, out)?;
        }
        if let Some(lengths) = self.lengths {
            codec.encode("uncompressed length", lengths.uncompressed, out)?;
            codec.encode("compressed length", lengths.compressed, out)?;
        }
        Ok(())
    }
}

/// Strips header fields off the front of a blob and checks them against
/// the payload that follows
#[derive(Debug)]
pub struct HeaderReader<'c, C: VarIntCodec + ?Sized> {
    codec: &'c C,
    accept_uncompressed: bool,
}

impl<'c, C: VarIntCodec + ?Sized> HeaderReader<'c, C> {
    /// Creates a reader using the given codec
    pub fn new(codec: &'c C) -> Self {
        Self {
            codec,
            accept_uncompressed: false,
        }
    }

    /// Treat a compressed length of zero as "payload stored raw"
    pub fn accept_uncompressed(mut self, accept: bool) -> Self {
        self.accept_uncompressed = accept;
        self
    }

    /// Read exactly `count` fields and return them with the rest of `data`
    pub fn read_fields<'d>(&self, data: &'d [u8], count: usize) -> Result<(Vec<u64>, &'d [u8])> {
        let mut fields = Vec::with_capacity(count);
        let mut rest = data;

        for _ in 0..count {
            let (value, used) = self.codec.decode(rest).ok_or(Error::TruncatedHeader {
                expected: count,
                available: fields.len(),
            })?;
            fields.push(value);
            rest = &rest[used..];
        }

        Ok((fields, rest))
    }

    /// Read a header in the given layout and validate the payload size.
    ///
    /// The declared compressed length must equal the number of bytes after
    /// the header. When uncompressed payloads are accepted and the
    /// compressed length is zero, the uncompressed length is checked instead.
    pub fn read<'d>(&self, data: &'d [u8], layout: HeaderLayout) -> Result<(Header, &'d [u8])> {
        let (fields, payload) = self.read_fields(data, layout.field_count())?;
        let header = Header::from_fields(layout, &fields);
        trace!("Header fields {:?}, {} payload bytes", fields, payload.len());

        if let Some(lengths) = header.lengths {
            let declared = if self.accept_uncompressed && lengths.compressed == 0 {
                lengths.uncompressed
            } else {
                lengths.compressed
            };

            if payload.len() as u64 != declared {
                return Err(Error::header_length_mismatch(declared, payload.len()));
            }
        }

        Ok((header, payload))
    }
}
