//! Loading layered sparse matrices from Matrix Market files
//!
//! The input is scanned twice. The first pass records, per column chunk
//! and row, the widest layer needed and the number of entries, so every
//! layer can be allocated exactly. The second pass writes each entry at
//! its row's cursor. Entries may appear in any order in the file; rows
//! are sorted by column afterwards where needed.

pub mod parser;
pub mod source;

use std::io::BufRead;
use std::path::Path;

use layered_core::{
    categorize_count, check_chunk_size, Category, ChunkLayout, ColumnIndex, MatrixElement,
    SparseMatrix,
};
use tracing::{debug, info};

use crate::compressed::{compress_sparse_triplets, CompressedSparseMatrix};
use crate::error::{Error, Result};
use crate::layered::{ChunkBuilder, LayeredMatrix};

pub use parser::{Banner, Field, MatrixMarketParser};
pub use source::{open_buffer, open_file, Compression};

/// Options for reading Matrix Market content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Number of columns per chunk
    pub chunk_size: usize,
    /// Compression of the input
    pub compression: Compression,
    /// Read buffer size in bytes
    pub buffer_size: usize,
}

impl ReadOptions {
    /// Set the number of columns per chunk
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the input compression
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the read buffer size in bytes
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            chunk_size: 65_536,
            compression: Compression::Auto,
            buffer_size: 65_536,
        }
    }
}

fn too_large(line: usize) -> Error {
    Error::parse(line, "declared dimensions are too large to allocate")
}

/// One entry per (chunk, row), allocated without aborting on absurd sizes
fn row_table<T: Clone>(cells: Option<usize>, fill: T, line: usize) -> Result<Vec<T>> {
    let cells = cells.ok_or_else(|| too_large(line))?;
    let mut table = Vec::new();
    table
        .try_reserve_exact(cells)
        .map_err(|_| too_large(line))?;
    table.resize(cells, fill);
    Ok(table)
}

fn read_layered<'a, V, C, F>(open: F, chunk_size: usize) -> Result<LayeredMatrix<V, C>>
where
    V: MatrixElement,
    C: ColumnIndex,
    F: Fn() -> Result<Box<dyn BufRead + 'a>>,
{
    let chunk_size = check_chunk_size::<C>(chunk_size)?;

    // First pass: widest layer and entry count per (chunk, row).
    let mut parser = MatrixMarketParser::new(open()?);
    parser.scan_preamble()?;
    let (nrow, ncol, nnz) = parser.size().unwrap_or_default();
    let size_line = parser.line();
    let layout = ChunkLayout::new(ncol, chunk_size)?;
    let num_chunks = layout.num_chunks();
    debug!(nrow, ncol, nnz, num_chunks, "scanning Matrix Market entries");

    let cells = nrow.checked_mul(num_chunks);
    let mut widest = row_table(cells, Category::U8, size_line)?;
    let mut counts = row_table(cells, 0usize, size_line)?;
    parser.scan_triplets(|r, c, count| {
        if count == 0 {
            return Ok(());
        }
        let cell = layout.chunk_of(c) * nrow + r;
        widest[cell] = widest[cell].max(categorize_count(count)?);
        counts[cell] += 1;
        Ok(())
    })?;

    let mut builders = Vec::with_capacity(num_chunks);
    for k in 0..num_chunks {
        let mut builder = ChunkBuilder::<C>::new();
        builder
            .try_reserve_rows(nrow)
            .map_err(|_| too_large(size_line))?;
        for cell in k * nrow..(k + 1) * nrow {
            builder.assign_row(widest[cell], counts[cell]);
        }
        builder.allocate();
        builders.push(builder);
    }
    drop(widest);

    // Second pass: place every entry at its row's cursor. The count table
    // is reused for the cursors.
    let mut cursors = counts;
    for (k, builder) in builders.iter().enumerate() {
        for r in 0..nrow {
            cursors[k * nrow + r] = builder.cursor(r);
        }
    }

    let mut parser = MatrixMarketParser::new(open()?);
    parser.scan_preamble()?;
    if parser.size() != Some((nrow, ncol, nnz)) {
        return Err(Error::parse(parser.line(), "size line changed between passes"));
    }
    parser.scan_triplets(|r, c, count| {
        if count == 0 {
            return Ok(());
        }
        let chunk = layout.chunk_of(c);
        let cell = chunk * nrow + r;
        let at = cursors[cell];
        cursors[cell] += 1;
        builders[chunk].set(r, at, C::from_usize(layout.offset_of(c)), count as u32);
        Ok(())
    })?;

    let resorted: usize = builders.iter_mut().map(ChunkBuilder::sort_rows).sum();
    if resorted > 0 {
        debug!(resorted, "sorted rows with out-of-order columns");
    }
    for (k, builder) in builders.iter().enumerate() {
        if let Some((row, offset)) = builder.first_repeat() {
            return Err(Error::DuplicateEntry {
                row: row + 1,
                column: layout.chunk_start(k) + offset + 1,
            });
        }
    }

    let matrix = LayeredMatrix::from_builders(nrow, layout, builders);
    let summary = matrix.summary();
    info!(
        nrow,
        ncol,
        nnz = summary.nnz,
        stored_bytes = summary.stored_bytes,
        "loaded layered sparse matrix"
    );
    Ok(matrix)
}

/// Load a layered sparse matrix from a (possibly Gzip-compressed) Matrix Market file
///
/// The file must use the coordinate format with an integer, real or double
/// field and general symmetry. Values must be non-negative and fit in
/// 32 bits; explicit zeros are dropped and a coordinate listed twice is
/// an [`Error::DuplicateEntry`].
pub fn read_layered_sparse_from_matrix_market_file<V, P>(
    path: P,
    options: &ReadOptions,
) -> Result<LayeredMatrix<V, u16>>
where
    V: MatrixElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!(path = %path.display(), compression = ?options.compression, "opening Matrix Market file");
    read_layered(
        || open_file(path, options.compression, options.buffer_size),
        options.chunk_size,
    )
}

/// Load a layered sparse matrix from Matrix Market content held in memory
///
/// With [`Compression::Gzip`] the buffer may hold either Gzip or Zlib
/// data; [`Compression::Auto`] also accepts plain text.
pub fn read_layered_sparse_from_matrix_market_buffer<V>(
    contents: &[u8],
    options: &ReadOptions,
) -> Result<LayeredMatrix<V, u16>>
where
    V: MatrixElement,
{
    read_layered(
        || open_buffer(contents, options.compression, options.buffer_size),
        options.chunk_size,
    )
}

fn read_compressed<'a, V, F>(open: F, row_major: bool) -> Result<CompressedSparseMatrix<V>>
where
    V: MatrixElement,
    F: FnOnce() -> Result<Box<dyn BufRead + 'a>>,
{
    let mut parser = MatrixMarketParser::new(open()?);
    parser.scan_preamble()?;
    let (nrow, ncol, nnz) = parser.size().unwrap_or_default();
    let size_line = parser.line();

    let mut values = Vec::new();
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for reserve in [
        values.try_reserve_exact(nnz),
        rows.try_reserve_exact(nnz),
        cols.try_reserve_exact(nnz),
    ] {
        reserve.map_err(|_| too_large(size_line))?;
    }
    parser.scan_triplets(|r, c, count| {
        if count == 0 {
            return Ok(());
        }
        categorize_count(count)?;
        values.push(V::from_count(count as u32));
        rows.push(r);
        cols.push(c);
        Ok(())
    })?;

    let pointers =
        compress_sparse_triplets(nrow, ncol, &mut values, &mut rows, &mut cols, row_major)?;
    let repeat = (1..values.len()).find(|&i| rows[i - 1] == rows[i] && cols[i - 1] == cols[i]);
    if let Some(i) = repeat {
        return Err(Error::DuplicateEntry {
            row: rows[i] + 1,
            column: cols[i] + 1,
        });
    }

    let indices = if row_major { cols } else { rows };
    let matrix = CompressedSparseMatrix::new(nrow, ncol, values, indices, pointers, row_major)?;
    debug!(nrow, ncol, nnz = matrix.nnz(), row_major, "loaded compressed sparse matrix");
    Ok(matrix)
}

/// Load a compressed sparse matrix from a (possibly Gzip-compressed) Matrix Market file
///
/// Accepts the same inputs as [`read_layered_sparse_from_matrix_market_file`].
/// The chunk size of `options` is ignored. Pair with
/// [`convert_to_layered_sparse`](crate::convert_to_layered_sparse) to choose
/// the layout and thread count of the layered result.
pub fn read_compressed_sparse_from_matrix_market_file<V, P>(
    path: P,
    options: &ReadOptions,
    row_major: bool,
) -> Result<CompressedSparseMatrix<V>>
where
    V: MatrixElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!(path = %path.display(), compression = ?options.compression, "opening Matrix Market file");
    read_compressed(
        || open_file(path, options.compression, options.buffer_size),
        row_major,
    )
}

/// Load a compressed sparse matrix from Matrix Market content held in memory
pub fn read_compressed_sparse_from_matrix_market_buffer<V>(
    contents: &[u8],
    options: &ReadOptions,
    row_major: bool,
) -> Result<CompressedSparseMatrix<V>>
where
    V: MatrixElement,
{
    read_compressed(
        || open_buffer(contents, options.compression, options.buffer_size),
        row_major,
    )
}
