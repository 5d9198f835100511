//! Core matrix abstraction traits
//!
//! This module defines the extraction interface that every matrix
//! implementation must satisfy, whether it stores dense values,
//! compressed sparse vectors or layered chunks.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use super::element::MatrixElement;

/// Row and column extraction interface
///
/// Dense fetches fill a caller-provided buffer of length `ncol()` (for rows)
/// or `nrow()` (for columns). Sparse fetches clear the supplied buffers and
/// push the non-zero values and their indices in increasing index order.
///
/// Indices are a caller contract: passing `row >= nrow()` or
/// `col >= ncol()` panics like slice indexing.
pub trait Matrix: Sync {
    /// The element type reported by this matrix
    type Value: MatrixElement;

    /// Number of rows
    fn nrow(&self) -> usize;

    /// Number of columns
    fn ncol(&self) -> usize;

    /// Whether the underlying storage is sparse
    fn is_sparse(&self) -> bool;

    /// Whether row access is cheaper than column access
    fn prefer_rows(&self) -> bool;

    /// Fill `buffer` with the dense contents of a row
    fn dense_row(&self, row: usize, buffer: &mut [Self::Value]);

    /// Fill `buffer` with the dense contents of a column
    fn dense_column(&self, col: usize, buffer: &mut [Self::Value]);

    /// Collect the non-zero entries of a row
    fn sparse_row(&self, row: usize, values: &mut Vec<Self::Value>, indices: &mut Vec<usize>) {
        let mut buffer = vec![Self::Value::zero(); self.ncol()];
        self.dense_row(row, &mut buffer);
        collect_non_zero(&buffer, values, indices);
    }

    /// Collect the non-zero entries of a column
    fn sparse_column(&self, col: usize, values: &mut Vec<Self::Value>, indices: &mut Vec<usize>) {
        let mut buffer = vec![Self::Value::zero(); self.nrow()];
        self.dense_column(col, &mut buffer);
        collect_non_zero(&buffer, values, indices);
    }

    /// Collect the non-zero entries of a column restricted to a block of rows
    ///
    /// Reported indices are absolute row indices, not offsets into the block.
    fn sparse_column_block(
        &self,
        col: usize,
        rows: Range<usize>,
        values: &mut Vec<Self::Value>,
        indices: &mut Vec<usize>,
    ) {
        self.sparse_column(col, values, indices);
        let mut kept = 0;
        for i in 0..indices.len() {
            if rows.contains(&indices[i]) {
                values[kept] = values[i];
                indices[kept] = indices[i];
                kept += 1;
            }
        }
        values.truncate(kept);
        indices.truncate(kept);
    }
}

/// Summary access for sparse matrices
pub trait SparseMatrix {
    /// The element type stored in this matrix
    type Element: MatrixElement;

    /// Get an element at the specified position
    ///
    /// Returns `None` if the element is zero (not stored) or if the
    /// position is out of bounds.
    fn get_element(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Get number of non-zero elements stored
    fn nnz(&self) -> usize;
}

fn collect_non_zero<V: MatrixElement>(
    dense: &[V],
    values: &mut Vec<V>,
    indices: &mut Vec<usize>,
) {
    values.clear();
    indices.clear();
    for (i, &v) in dense.iter().enumerate() {
        if !v.is_zero() {
            values.push(v);
            indices.push(i);
        }
    }
}
