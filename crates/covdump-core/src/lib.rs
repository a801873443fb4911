//! # covdump-core
//!
//! A library for decoding the coverage metadata blobs LLVM embeds in
//! instrumented objects.
//!
//! This crate provides the core functionality for:
//! - Turning escaped IR string literals back into bytes
//! - Reading and validating the blob headers
//! - Inflating the zlib payload and splitting it into name records
//! - Building blobs from names, for fixtures and round trips
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`literal`]: Escaped byte-string literals
//! - [`blob`]: Header, decompression, record splitting and the pipelines
//! - [`report`]: Rendering decoded blobs into an output sink
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use covdump_core::{decode_coverage_mapping, write_report, ReportStyle};
//! use std::io;
//!
//! let literal = std::fs::read_to_string("names.txt")?;
//! let blob = decode_coverage_mapping(literal.trim_end_matches('\n'))?;
//! write_report(&mut io::stdout().lock(), &blob, ReportStyle::Text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! Header fields and record lengths are read through [`VarIntCodec`]. Only
//! the single-byte case of LEB128 is implemented ([`SingleByte`]); a
//! multi-byte codec can be passed to [`Decoder::with_codec`] without
//! changing any caller.
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod blob;
pub mod error;
pub mod literal;
pub mod report;

// Re-export primary types for convenience
pub use blob::{
    decode_coverage_mapping, decode_symbol_table, BlobBuilder, DecodedBlob, Decoder,
    DecoderConfig, Header, HeaderLayout, Pipeline, Record, RecordFormat, SingleByte, VarIntCodec,
};
pub use error::{Error, Result};
pub use literal::{decode_literal, escape_bytes, strip_ir_quotes};
pub use report::{write_report, ReportStyle};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
