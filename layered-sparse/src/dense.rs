//! Dense in-memory matrices
//!
//! Mostly useful as conversion input and as a reference when checking
//! other representations.

use layered_core::{LayeredError, Matrix, MatrixElement, SparseMatrix};

/// Dense matrix stored contiguously in row-major or column-major order
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<V> {
    nrow: usize,
    ncol: usize,
    values: Vec<V>,
    row_major: bool,
}

impl<V: MatrixElement> DenseMatrix<V> {
    /// Wrap a value vector of length `nrow * ncol`
    pub fn new(
        nrow: usize,
        ncol: usize,
        values: Vec<V>,
        row_major: bool,
    ) -> Result<Self, LayeredError> {
        let expected = nrow
            .checked_mul(ncol)
            .ok_or(LayeredError::DimensionMismatch)?;
        if values.len() != expected {
            return Err(LayeredError::DimensionMismatch);
        }
        Ok(Self::from_parts(nrow, ncol, values, row_major))
    }

    pub(crate) fn from_parts(nrow: usize, ncol: usize, values: Vec<V>, row_major: bool) -> Self {
        Self {
            nrow,
            ncol,
            values,
            row_major,
        }
    }

    /// Build a row-major matrix from equally long rows
    pub fn from_rows(rows: &[Vec<V>]) -> Result<Self, LayeredError> {
        let ncol = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncol) {
            return Err(LayeredError::DimensionMismatch);
        }
        let values = rows.iter().flatten().copied().collect();
        Self::new(rows.len(), ncol, values, true)
    }

    /// Build a column-major matrix from equally long columns
    pub fn from_columns(columns: &[Vec<V>]) -> Result<Self, LayeredError> {
        let nrow = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != nrow) {
            return Err(LayeredError::DimensionMismatch);
        }
        let values = columns.iter().flatten().copied().collect();
        Self::new(nrow, columns.len(), values, false)
    }

    /// Whether values are laid out row by row
    pub fn is_row_major(&self) -> bool {
        self.row_major
    }

    /// Underlying value storage
    pub fn values(&self) -> &[V] {
        &self.values
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        if self.row_major {
            row * self.ncol + col
        } else {
            col * self.nrow + row
        }
    }
}

impl<V: MatrixElement> Matrix for DenseMatrix<V> {
    type Value = V;

    fn nrow(&self) -> usize {
        self.nrow
    }

    fn ncol(&self) -> usize {
        self.ncol
    }

    fn is_sparse(&self) -> bool {
        false
    }

    fn prefer_rows(&self) -> bool {
        self.row_major
    }

    fn dense_row(&self, row: usize, buffer: &mut [V]) {
        assert!(row < self.nrow, "row index out of bounds");
        if self.row_major {
            let start = row * self.ncol;
            buffer[..self.ncol].copy_from_slice(&self.values[start..start + self.ncol]);
        } else {
            for (c, slot) in buffer[..self.ncol].iter_mut().enumerate() {
                *slot = self.values[c * self.nrow + row];
            }
        }
    }

    fn dense_column(&self, col: usize, buffer: &mut [V]) {
        assert!(col < self.ncol, "column index out of bounds");
        if self.row_major {
            for (r, slot) in buffer[..self.nrow].iter_mut().enumerate() {
                *slot = self.values[r * self.ncol + col];
            }
        } else {
            let start = col * self.nrow;
            buffer[..self.nrow].copy_from_slice(&self.values[start..start + self.nrow]);
        }
    }
}

impl<V: MatrixElement> SparseMatrix for DenseMatrix<V> {
    type Element = V;

    fn get_element(&self, row: usize, col: usize) -> Option<V> {
        if row >= self.nrow || col >= self.ncol {
            return None;
        }
        let value = self.values[self.offset(row, col)];
        (!value.is_zero()).then_some(value)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    fn nnz(&self) -> usize {
        self.values.iter().filter(|v| !v.is_zero()).count()
    }
}
