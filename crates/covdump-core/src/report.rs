//! Human-readable rendering of decoded blobs.
//!
//! Reports are written to a caller-supplied [`Write`] sink, so the same code
//! serves stdout, files and in-memory buffers.

use crate::blob::DecodedBlob;
use std::io::{self, Write};

/// Layout of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStyle {
    /// Header fields one per line, then all records comma-joined
    #[default]
    Text,
    /// One record per line and nothing else
    Names,
}

/// Write a report for `blob` to `out`
pub fn write_report<W: Write + ?Sized>(
    out: &mut W,
    blob: &DecodedBlob,
    style: ReportStyle,
) -> io::Result<()> {
    match style {
        ReportStyle::Text => write_text(out, blob),
        ReportStyle::Names => {
            for record in &blob.records {
                writeln!(out, "{}", record)?;
            }
            Ok(())
        }
    }
}

fn write_text<W: Write + ?Sized>(out: &mut W, blob: &DecodedBlob) -> io::Result<()> {
    writeln!(out, "pipeline: {}", blob.pipeline)?;

    if let Some(count) = blob.header.record_count {
        writeln!(out, "record count: {}", count)?;
    }
    if let Some(lengths) = blob.header.lengths {
        writeln!(out, "uncompressed length: {}", lengths.uncompressed)?;
        writeln!(out, "compressed length: {}", lengths.compressed)?;
    }

    let records = blob
        .records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "records: {}", records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{Header, PayloadLengths, Pipeline, Record};
    use pretty_assertions::assert_eq;

    fn sample() -> DecodedBlob {
        DecodedBlob {
            pipeline: Pipeline::SymbolTable,
            header: Header {
                record_count: Some(2),
                lengths: Some(PayloadLengths {
                    uncompressed: 14,
                    compressed: 22,
                }),
            },
            records: vec![Record::from("/work"), Record::from(&b"a\x00.st"[..])],
        }
    }

    fn render(blob: &DecodedBlob, style: ReportStyle) -> String {
        let mut out = Vec::new();
        write_report(&mut out, blob, style).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_report() {
        assert_eq!(
            render(&sample(), ReportStyle::Text),
            "pipeline: symbol-table\n\
             record count: 2\n\
             uncompressed length: 14\n\
             compressed length: 22\n\
             records: /work, a\\00.st\n"
        );
    }

    #[test]
    fn test_text_report_without_header() {
        let blob = DecodedBlob {
            pipeline: Pipeline::Raw,
            header: Header::default(),
            records: vec![Record::from("ab")],
        };
        assert_eq!(
            render(&blob, ReportStyle::Text),
            "pipeline: raw\nrecords: ab\n"
        );
    }

    #[test]
    fn test_names_report() {
        assert_eq!(render(&sample(), ReportStyle::Names), "/work\na\\00.st\n");
    }
}
