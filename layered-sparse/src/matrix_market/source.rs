//! Byte sources for Matrix Market content
//!
//! Files and in-memory buffers may be plain text or compressed; the
//! compression can be given explicitly or guessed from magic bytes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::{MultiGzDecoder, ZlibDecoder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Compression applied to Matrix Market content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Compression {
    /// Plain text
    None,
    /// Gzip for files; Gzip or Zlib for buffers
    Gzip,
    /// Guess from the leading magic bytes
    #[default]
    Auto,
}

/// Gzip streams start with 1f 8b
pub(crate) fn is_gzip(header: &[u8]) -> bool {
    header.len() >= 2 && header[0] == 0x1f && header[1] == 0x8b
}

/// Zlib streams use deflate (CM = 8) and a header checksum divisible by 31
pub(crate) fn is_zlib(header: &[u8]) -> bool {
    header.len() >= 2
        && header[0] & 0x0f == 8
        && ((u16::from(header[0]) << 8) | u16::from(header[1])) % 31 == 0
}

/// Open a file, decompressing as requested
pub fn open_file(path: &Path, compression: Compression, buffer_size: usize) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| Error::io(Some(path.to_path_buf()), e))?;
    let mut reader = BufReader::with_capacity(buffer_size.max(1), file);

    let gzip = match compression {
        Compression::None => false,
        Compression::Gzip => true,
        Compression::Auto => {
            let header = reader
                .fill_buf()
                .map_err(|e| Error::io(Some(path.to_path_buf()), e))?;
            is_gzip(header)
        }
    };

    if gzip {
        tracing::debug!(path = %path.display(), "reading gzip-compressed file");
        Ok(Box::new(BufReader::with_capacity(
            buffer_size.max(1),
            MultiGzDecoder::new(reader),
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// Wrap an in-memory buffer, decompressing as requested
pub fn open_buffer<'a>(
    contents: &'a [u8],
    compression: Compression,
    buffer_size: usize,
) -> Result<Box<dyn BufRead + 'a>> {
    let capacity = buffer_size.max(1);
    let reader: Box<dyn BufRead + 'a> = match compression {
        Compression::None => Box::new(contents),
        Compression::Gzip | Compression::Auto if is_gzip(contents) => {
            Box::new(BufReader::with_capacity(capacity, MultiGzDecoder::new(contents)))
        }
        Compression::Gzip => Box::new(BufReader::with_capacity(capacity, ZlibDecoder::new(contents))),
        Compression::Auto if is_zlib(contents) => {
            Box::new(BufReader::with_capacity(capacity, ZlibDecoder::new(contents)))
        }
        Compression::Auto => Box::new(contents),
    };
    Ok(reader)
}
