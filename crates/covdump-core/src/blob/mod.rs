//! Decoding coverage metadata blobs.
//!
//! LLVM's source-based coverage embeds two kinds of name tables in every
//! instrumented object, both printed in IR as escaped string constants:
//!
//! - the **symbol table** (coverage filenames): record count, uncompressed
//!   length and compressed length, then a zlib stream of length-prefixed
//!   filenames
//! - the **coverage mapping** names (profile function names): uncompressed
//!   and compressed length, then a zlib stream of names separated by `0x01`
//!
//! ## Pipeline
//!
//! 1. Decode the escaped literal into bytes
//! 2. Strip the header fields and check the compressed length against the
//!    bytes that follow
//! 3. Inflate the payload and check the uncompressed length
//! 4. Split the result into records (and check the record count, if any)
//!
//! Every check is fatal; a blob is either fully consistent or rejected.
//!
//! ## Example
//!
//! ```
//! use covdump_core::{BlobBuilder, Decoder, Pipeline, Record};
//!
//! let names = [Record::from("/work"), Record::from("main.st")];
//! let literal = BlobBuilder::new(Pipeline::SymbolTable).build_literal(&names)?;
//!
//! let blob = Decoder::new().decode_symbol_table(&literal)?;
//! assert_eq!(blob.header.record_count, Some(2));
//! assert_eq!(blob.records, names);
//! # Ok::<(), covdump_core::Error>(())
//! ```

mod builder;
mod header;
mod records;
mod zlib;

use crate::error::{Error, Result};
use crate::literal::{decode_literal_with, DEFAULT_ESCAPE};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

pub use builder::BlobBuilder;
pub use header::{Header, HeaderLayout, HeaderReader, PayloadLengths, SingleByte, VarIntCodec};
pub use records::{Record, RecordFormat, SEPARATOR};
pub use zlib::{deflate, inflate};

/// The blob kinds the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Coverage filenames: counted header, zlib, length-prefixed records
    SymbolTable,
    /// Profile function names: length header, zlib, `0x01`-separated records
    CoverageMapping,
    /// Bare length-prefixed records with no header and no compression
    Raw,
}

impl Pipeline {
    /// Name used in reports and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::SymbolTable => "symbol-table",
            Self::CoverageMapping => "coverage-mapping",
            Self::Raw => "raw",
        }
    }

    /// Header fields preceding the payload
    pub fn layout(self) -> HeaderLayout {
        match self {
            Self::SymbolTable => HeaderLayout::CountedLengths,
            Self::CoverageMapping => HeaderLayout::Lengths,
            Self::Raw => HeaderLayout::Empty,
        }
    }

    /// Record layout inside the decompressed payload
    pub fn record_format(self) -> RecordFormat {
        match self {
            Self::SymbolTable | Self::Raw => RecordFormat::LengthPrefixed,
            Self::CoverageMapping => RecordFormat::SeparatorDelimited,
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for the decoder
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Character introducing a two-digit hex escape
    pub escape: char,
    /// Treat a zero compressed length as an uncompressed payload
    pub accept_uncompressed: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            escape: DEFAULT_ESCAPE,
            accept_uncompressed: false,
        }
    }
}

impl DecoderConfig {
    /// Creates a new decoder config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the escape marker
    pub fn escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    /// Sets whether payloads stored without compression are accepted
    pub fn accept_uncompressed(mut self, accept: bool) -> Self {
        self.accept_uncompressed = accept;
        self
    }
}

/// Result of decoding one blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlob {
    /// Pipeline the blob was decoded with
    pub pipeline: Pipeline,
    /// Header fields as declared in the blob
    pub header: Header,
    /// Records in on-disk order
    pub records: Vec<Record>,
}

/// Runs literals through one of the decoding pipelines
///
/// Holds no state between calls and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Decoder<C: VarIntCodec = SingleByte> {
    config: DecoderConfig,
    codec: C,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with default configuration
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Creates a decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self::with_codec(config, SingleByte)
    }
}

impl<C: VarIntCodec> Decoder<C> {
    /// Creates a decoder reading header fields through `codec`
    pub fn with_codec(config: DecoderConfig, codec: C) -> Self {
        Self { config, codec }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a filenames literal (count, lengths, zlib, length-prefixed)
    pub fn decode_symbol_table(&self, literal: &str) -> Result<DecodedBlob> {
        self.decode(literal, Pipeline::SymbolTable)
    }

    /// Decode a profile names literal (lengths, zlib, separator-delimited)
    pub fn decode_coverage_mapping(&self, literal: &str) -> Result<DecodedBlob> {
        self.decode(literal, Pipeline::CoverageMapping)
    }

    /// Decode a literal of bare length-prefixed records
    pub fn decode_raw(&self, literal: &str) -> Result<DecodedBlob> {
        self.decode(literal, Pipeline::Raw)
    }

    /// Decode an escaped literal with the given pipeline
    pub fn decode(&self, literal: &str, pipeline: Pipeline) -> Result<DecodedBlob> {
        let data = decode_literal_with(literal, self.config.escape)?;
        self.decode_bytes(&data, pipeline)
    }

    /// Decode an already unescaped blob with the given pipeline
    pub fn decode_bytes(&self, data: &[u8], pipeline: Pipeline) -> Result<DecodedBlob> {
        debug!("Decoding {} byte {} blob", data.len(), pipeline);

        let (header, payload) = HeaderReader::new(&self.codec)
            .accept_uncompressed(self.config.accept_uncompressed)
            .read(data, pipeline.layout())?;

        let body: Cow<'_, [u8]> = match header.lengths {
            Some(lengths) if self.config.accept_uncompressed && lengths.compressed == 0 => {
                debug!("Payload stored uncompressed ({} bytes)", payload.len());
                Cow::Borrowed(payload)
            }
            Some(lengths) => {
                let inflated = inflate(payload, lengths.uncompressed)?;
                debug!(
                    "Inflated {} bytes into {}",
                    payload.len(),
                    inflated.len()
                );
                Cow::Owned(inflated)
            }
            None => Cow::Borrowed(payload),
        };

        let records = pipeline.record_format().split_with(&self.codec, &body)?;

        if let Some(declared) = header.record_count {
            if records.len() as u64 != declared {
                return Err(Error::RecordCountMismatch {
                    declared,
                    actual: records.len(),
                });
            }
        }

        debug!("Decoded {} records", records.len());
        Ok(DecodedBlob {
            pipeline,
            header,
            records,
        })
    }
}

/// Decode a filenames literal with the default decoder
pub fn decode_symbol_table(literal: &str) -> Result<DecodedBlob> {
    Decoder::new().decode_symbol_table(literal)
}

/// Decode a profile names literal with the default decoder
pub fn decode_coverage_mapping(literal: &str) -> Result<DecodedBlob> {
    Decoder::new().decode_coverage_mapping(literal)
}
