//! zlib payload handling.

use crate::error::{Error, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Upper bound on the buffer reserved up front from a declared length
const MAX_PREALLOC: usize = 1024 * 1024;

/// Inflate a zlib stream and check it against the declared length.
///
/// The size check is the only thing standing between a truncated or
/// corrupted blob and a plausible-looking record list, so it always runs.
pub fn inflate(payload: &[u8], declared_len: u64) -> Result<Vec<u8>> {
    let capacity = usize::try_from(declared_len)
        .unwrap_or(MAX_PREALLOC)
        .min(MAX_PREALLOC);
    let mut decompressed = Vec::with_capacity(capacity);

    ZlibDecoder::new(payload)
        .read_to_end(&mut decompressed)
        .map_err(Error::Inflate)?;

    if decompressed.len() as u64 != declared_len {
        return Err(Error::decompression_size_mismatch(
            declared_len,
            decompressed.len(),
        ));
    }

    Ok(decompressed)
}

/// Compress `data` into a zlib stream at the default level
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(Error::Deflate)?;
    encoder.finish().map_err(Error::Deflate)
}
