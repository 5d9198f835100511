//! Layered Sparse - Memory-efficient storage for non-negative count matrices
//!
//! Every row of a layered sparse matrix is assigned, per column chunk, to the
//! narrowest unsigned integer layer (u8, u16 or u32) that can hold its largest
//! value in that chunk. Rows and columns stay extractable through the common
//! [`Matrix`] interface.
//!
//! ## Architecture
//!
//! - **layered-core**: value classification, chunk arithmetic and the matrix
//!   traits (no I/O)
//! - **layered-sparse**: concrete matrices, conversion, Matrix Market loading
//!   and configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use layered_sparse::{
//!     convert_to_layered_sparse, read_layered_sparse_from_matrix_market_file, DenseMatrix,
//!     Matrix, ReadOptions,
//! };
//!
//! fn example() -> layered_sparse::Result<()> {
//!     // Convert an in-memory matrix using four threads
//!     let dense = DenseMatrix::from_rows(&[vec![0, 300], vec![70_000, 1]])?;
//!     let layered = convert_to_layered_sparse::<f64, _>(&dense, 4)?;
//!     println!("{:?}", layered.summary());
//!
//!     // Load a (possibly gzipped) Matrix Market file
//!     let counts = read_layered_sparse_from_matrix_market_file::<u32, _>(
//!         "counts.mtx.gz",
//!         &ReadOptions::default(),
//!     )?;
//!     let mut row = vec![0; counts.ncol()];
//!     counts.dense_row(0, &mut row);
//!     Ok(())
//! }
//! ```

pub use layered_core::{
    // Core traits
    ColumnIndex, Matrix, MatrixElement, SparseMatrix,
    // Layer classification
    categorize, categorize_count, Category,
    // Chunking
    at_least_one, check_chunk_size, ChunkLayout,
    // Error handling
    ErrorCategory, LayeredError,
};

pub mod compressed;
pub mod config;
pub mod convert;
pub mod dense;
pub mod error;
pub mod extract;
pub mod layered;
pub mod matrix_market;
pub mod parallel;

pub use compressed::{compress_sparse_triplets, CompressedSparseMatrix};
pub use config::LayeredConfig;
pub use convert::{convert_by_column, convert_by_row, convert_to_layered_sparse};
pub use dense::DenseMatrix;
pub use error::{Error, Result};
pub use extract::{
    checked_column, checked_row, consecutive_columns, consecutive_rows, ConsecutiveExtractor,
    SparseVector,
};
pub use layered::{DynamicLayeredMatrix, LayerSummary, LayeredChunk, LayeredMatrix, RowSlot};
pub use matrix_market::{
    read_compressed_sparse_from_matrix_market_buffer,
    read_compressed_sparse_from_matrix_market_file, read_layered_sparse_from_matrix_market_buffer,
    read_layered_sparse_from_matrix_market_file, Compression, ReadOptions,
};
