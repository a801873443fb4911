//! Building blobs from records.
//!
//! The inverse of [`Decoder`](super::Decoder): lays the records out in the
//! pipeline's format, compresses them, writes the header and optionally
//! escapes the whole thing into an IR-style literal.

use super::header::{Header, HeaderLayout, PayloadLengths, SingleByte, VarIntCodec};
use super::records::Record;
use super::zlib::deflate;
use super::Pipeline;
use crate::error::Result;
use crate::literal::escape_bytes;
use tracing::debug;

/// Builds blobs for one pipeline
#[derive(Debug, Clone)]
pub struct BlobBuilder<C: VarIntCodec = SingleByte> {
    pipeline: Pipeline,
    codec: C,
}

impl BlobBuilder {
    /// Creates a builder writing single-byte header fields
    pub fn new(pipeline: Pipeline) -> Self {
        Self::with_codec(pipeline, SingleByte)
    }
}

impl<C: VarIntCodec> BlobBuilder<C> {
    /// Creates a builder writing header fields through `codec`
    pub fn with_codec(pipeline: Pipeline, codec: C) -> Self {
        Self { pipeline, codec }
    }

    /// Build the raw blob bytes
    pub fn build(&self, records: &[Record]) -> Result<Vec<u8>> {
        let layout = self.pipeline.layout();
        let body = self.pipeline.record_format().join(&self.codec, records)?;

        let (header, payload) = match layout {
            HeaderLayout::Empty => (Header::default(), body),
            HeaderLayout::Lengths | HeaderLayout::CountedLengths => {
                let compressed = deflate(&body)?;
                let header = Header {
                    record_count: (layout == HeaderLayout::CountedLengths)
                        .then_some(records.len() as u64),
                    lengths: Some(PayloadLengths {
                        uncompressed: body.len() as u64,
                        compressed: compressed.len() as u64,
                    }),
                };
                (header, compressed)
            }
        };

        let mut out = Vec::with_capacity(payload.len() + layout.field_count());
        header.encode(&self.codec, &mut out)?;
        out.extend_from_slice(&payload);

        debug!(
            "Built {} blob: {} records, {} bytes",
            self.pipeline,
            records.len(),
            out.len()
        );
        Ok(out)
    }

    /// Build the blob and escape it as a literal
    pub fn build_literal(&self, records: &[Record]) -> Result<String> {
        self.build(records).map(|blob| escape_bytes(&blob))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{decode_coverage_mapping, Decoder};
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_blob_is_just_records() {
        let blob = BlobBuilder::new(Pipeline::Raw)
            .build(&[Record::from("ab")])
            .unwrap();
        assert_eq!(blob, b"\x02ab".to_vec());
    }

    #[test]
    fn test_symbol_table_header() {
        let names = [Record::from("a.st"), Record::from("")];
        let blob = BlobBuilder::new(Pipeline::SymbolTable).build(&names).unwrap();

        assert_eq!(blob[0], 2);
        assert_eq!(blob[1], 6);
        assert_eq!(usize::from(blob[2]), blob.len() - 3);
    }

    #[test]
    fn test_coverage_mapping_roundtrip() {
        let names = [
            Record::from("main"),
            Record::from("foo::bar"),
            Record::from(""),
        ];
        let literal = BlobBuilder::new(Pipeline::CoverageMapping)
            .build_literal(&names)
            .unwrap();

        let blob = decode_coverage_mapping(&literal).unwrap();
        assert_eq!(blob.records, names.to_vec());
        assert_eq!(
            blob.header.lengths.map(|l| l.uncompressed),
            Some(b"main\x01foo::bar\x01".len() as u64)
        );
    }

    #[test]
    fn test_too_many_records_for_single_byte() {
        let names = vec![Record::default(); 256];
        let err = BlobBuilder::new(Pipeline::SymbolTable)
            .build(&names)
            .unwrap_err();
        assert!(matches!(err, Error::FieldOverflow { .. }));
    }

    #[test]
    fn test_symbol_table_roundtrip() {
        let names: Vec<Record> = ["/home/dev/project", "src/main.st", "src/lib.st"]
            .into_iter()
            .map(Record::from)
            .collect();
        let blob = BlobBuilder::new(Pipeline::SymbolTable).build(&names).unwrap();
        let decoded = Decoder::new()
            .decode_bytes(&blob, Pipeline::SymbolTable)
            .unwrap();
        assert_eq!(decoded.records, names);
    }
}
