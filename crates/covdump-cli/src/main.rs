//! covdump - Decode LLVM coverage metadata blobs
//!
//! This tool takes the escaped string constants LLVM emits for coverage
//! filenames and profile names, validates every declared size and prints
//! the names they contain.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use covdump_core::literal::decode_literal_with;
use covdump_core::{
    strip_ir_quotes, write_report, BlobBuilder, Decoder, DecoderConfig, Pipeline, Record,
    ReportStyle,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Decode LLVM coverage filename and profile name blobs
#[derive(Parser, Debug)]
#[command(name = "covdump")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a coverage filenames blob (count, lengths, zlib, length-prefixed names)
    Symtab(DecodeArgs),
    /// Decode a profile names blob (lengths, zlib, 0x01-separated names)
    Covmap(DecodeArgs),
    /// Decode bare length-prefixed names with no header or compression
    Raw(DecodeArgs),
    /// Encode names into a blob literal
    Encode(EncodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    input: InputMode,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print a short blake3 digest of the decoded blob bytes
    #[arg(long)]
    digest: bool,

    /// Accept payloads stored uncompressed (compressed length 0)
    #[arg(long)]
    allow_uncompressed: bool,

    /// Escape marker preceding two hex digits
    #[arg(long, default_value = "\\")]
    escape: char,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Literal exactly as it appears in the IR, optionally wrapped in c"..."
    #[arg(allow_hyphen_values = true)]
    literal: Option<String>,

    /// Read the literal from a file instead
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Blob kind to produce
    #[arg(long, value_enum)]
    pipeline: PipelineKind,

    /// Wrap the output in c"..." as LLVM IR prints it
    #[arg(long)]
    ir: bool,

    /// Names to encode, in order
    names: Vec<String>,
}

/// Output format for decoded blobs
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Header fields and comma-joined names
    Text,
    /// One name per line (for scripting)
    Names,
}

impl From<OutputFormat> for ReportStyle {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportStyle::Text,
            OutputFormat::Names => ReportStyle::Names,
        }
    }
}

/// Blob kind selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PipelineKind {
    /// Coverage filenames
    Symtab,
    /// Profile names
    Covmap,
    /// Bare length-prefixed names
    Raw,
}

impl From<PipelineKind> for Pipeline {
    fn from(kind: PipelineKind) -> Self {
        match kind {
            PipelineKind::Symtab => Pipeline::SymbolTable,
            PipelineKind::Covmap => Pipeline::CoverageMapping,
            PipelineKind::Raw => Pipeline::Raw,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &mut out)
}

/// Dispatch a subcommand, writing its output to `out`
fn run<W: Write>(command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Symtab(args) => decode_blob(&args, Pipeline::SymbolTable, out),
        Command::Covmap(args) => decode_blob(&args, Pipeline::CoverageMapping, out),
        Command::Raw(args) => decode_blob(&args, Pipeline::Raw, out),
        Command::Encode(args) => encode_blob(&args, out),
    }
}

/// Decode one literal and print its report
fn decode_blob<W: Write>(args: &DecodeArgs, pipeline: Pipeline, out: &mut W) -> Result<()> {
    let raw = match (&args.input.literal, &args.input.input) {
        (Some(literal), _) => literal.clone(),
        (None, Some(path)) => read_literal_file(path)?,
        (None, None) => bail!("Either a literal or --input must be specified"),
    };
    let literal = strip_ir_quotes(&raw);

    let data = decode_literal_with(literal, args.escape)
        .with_context(|| format!("Invalid {} literal", pipeline))?;
    info!("Decoded literal into {} bytes", data.len());

    let config = DecoderConfig::new()
        .escape(args.escape)
        .accept_uncompressed(args.allow_uncompressed);
    let blob = Decoder::with_config(config)
        .decode_bytes(&data, pipeline)
        .with_context(|| format!("Invalid {} blob", pipeline))?;

    write_report(out, &blob, args.format.into()).context("Failed to write report")?;
    if args.digest {
        writeln!(out, "digest: {}", blob_digest(&data)).context("Failed to write report")?;
    }

    Ok(())
}

/// Encode names and print the literal
fn encode_blob<W: Write>(args: &EncodeArgs, out: &mut W) -> Result<()> {
    let pipeline = Pipeline::from(args.pipeline);
    let records: Vec<Record> = args.names.iter().map(|name| Record::from(name.as_str())).collect();

    debug!("Encoding {} names as {}", records.len(), pipeline);
    let literal = BlobBuilder::new(pipeline)
        .build_literal(&records)
        .with_context(|| format!("Cannot encode names as {} blob", pipeline))?;

    if args.ir {
        writeln!(out, "c\"{}\"", literal)?;
    } else {
        writeln!(out, "{}", literal)?;
    }
    Ok(())
}

/// Read a literal from a file, dropping the trailing line break
fn read_literal_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read literal file: {}", path.display()))?;
    Ok(text.trim_end_matches(|c| c == '\n' || c == '\r').to_string())
}

/// Compute a short digest of blob bytes (first 8 chars of blake3)
fn blob_digest(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hash.to_hex()[..8].to_string()
}
