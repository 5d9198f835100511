//! Column chunk arithmetic
//!
//! Columns are partitioned into fixed-width chunks so that in-chunk
//! offsets fit into a narrow [`ColumnIndex`] type. These are pure
//! functions with no I/O.

use core::ops::Range;

use crate::error::{LayeredError, Result};
use crate::traits::ColumnIndex;

/// Clamp a count to at least one
pub const fn at_least_one(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        n
    }
}

/// Validate a requested chunk size against the column index type
///
/// Zero is rejected; sizes beyond what `C` can address are capped at
/// `C::MAX_CHUNK_SIZE`.
pub fn check_chunk_size<C: ColumnIndex>(chunk_size: usize) -> Result<usize> {
    if chunk_size == 0 {
        return Err(LayeredError::NonPositiveChunkSize);
    }
    Ok(chunk_size.min(C::MAX_CHUNK_SIZE))
}

/// Partition of `ncol` columns into chunks of `chunk_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    ncol: usize,
    chunk_size: usize,
}

impl ChunkLayout {
    /// Create a layout; `chunk_size` must be positive
    pub fn new(ncol: usize, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(LayeredError::NonPositiveChunkSize);
        }
        Ok(Self { ncol, chunk_size })
    }

    /// Total number of columns
    pub const fn ncol(&self) -> usize {
        self.ncol
    }

    /// Width of every chunk except possibly the last
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks; a matrix with no columns still has one empty chunk
    pub const fn num_chunks(&self) -> usize {
        at_least_one(self.ncol.div_ceil(self.chunk_size))
    }

    /// Chunk holding column `col`
    pub const fn chunk_of(&self, col: usize) -> usize {
        col / self.chunk_size
    }

    /// Offset of column `col` inside its chunk
    pub const fn offset_of(&self, col: usize) -> usize {
        col % self.chunk_size
    }

    /// First column of chunk `chunk`
    pub const fn chunk_start(&self, chunk: usize) -> usize {
        chunk * self.chunk_size
    }

    /// Number of columns in chunk `chunk`
    pub fn chunk_width(&self, chunk: usize) -> usize {
        let start = self.chunk_start(chunk).min(self.ncol);
        (start + self.chunk_size).min(self.ncol) - start
    }

    /// Columns covered by chunk `chunk`
    pub fn chunk_range(&self, chunk: usize) -> Range<usize> {
        let start = self.chunk_start(chunk).min(self.ncol);
        start..start + self.chunk_width(chunk)
    }
}
