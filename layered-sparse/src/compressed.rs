//! Compressed sparse row and column matrices
//!
//! Each primary dimension element (a row for CSR, a column for CSC) owns a
//! contiguous slice of the value and index arrays, delimited by a pointer
//! array of length `primary + 1`.

use std::ops::Range;

use layered_core::{ColumnIndex, LayeredError, Matrix, MatrixElement, SparseMatrix};

/// Compressed sparse matrix in CSR (`row_major`) or CSC layout
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedSparseMatrix<V, I = usize> {
    nrow: usize,
    ncol: usize,
    values: Vec<V>,
    indices: Vec<I>,
    pointers: Vec<usize>,
    row_major: bool,
}

impl<V: MatrixElement, I: ColumnIndex> CompressedSparseMatrix<V, I> {
    /// Validate and wrap compressed arrays
    ///
    /// Secondary indices must be strictly increasing within each primary
    /// element: out-of-order indices are `InvalidRange`, repeated ones
    /// `DuplicateIndex`.
    pub fn new(
        nrow: usize,
        ncol: usize,
        values: Vec<V>,
        indices: Vec<I>,
        pointers: Vec<usize>,
        row_major: bool,
    ) -> Result<Self, LayeredError> {
        let (primary, secondary) = if row_major { (nrow, ncol) } else { (ncol, nrow) };

        if values.len() != indices.len() || pointers.len() != primary + 1 {
            return Err(LayeredError::DimensionMismatch);
        }
        if pointers[0] != 0 || pointers[primary] != values.len() {
            return Err(LayeredError::InvalidRange);
        }
        if pointers.windows(2).any(|w| w[0] > w[1]) {
            return Err(LayeredError::InvalidRange);
        }
        if indices.iter().any(|i| i.to_usize() >= secondary) {
            return Err(LayeredError::IndexOutOfBounds);
        }
        for p in 0..primary {
            check_increasing(&indices[pointers[p]..pointers[p + 1]])?;
        }

        Ok(Self::from_parts(nrow, ncol, values, indices, pointers, row_major))
    }

    /// Wrap arrays already known to be consistent
    pub(crate) fn from_parts(
        nrow: usize,
        ncol: usize,
        values: Vec<V>,
        indices: Vec<I>,
        pointers: Vec<usize>,
        row_major: bool,
    ) -> Self {
        Self {
            nrow,
            ncol,
            values,
            indices,
            pointers,
            row_major,
        }
    }

    /// Compressed sparse row matrix with validated ordering
    pub fn csr(
        nrow: usize,
        ncol: usize,
        values: Vec<V>,
        indices: Vec<I>,
        pointers: Vec<usize>,
    ) -> Result<Self, LayeredError> {
        Self::new(nrow, ncol, values, indices, pointers, true)
    }

    /// Compressed sparse column matrix with validated ordering
    pub fn csc(
        nrow: usize,
        ncol: usize,
        values: Vec<V>,
        indices: Vec<I>,
        pointers: Vec<usize>,
    ) -> Result<Self, LayeredError> {
        Self::new(nrow, ncol, values, indices, pointers, false)
    }

    /// Whether the primary dimension is rows
    pub fn is_row_major(&self) -> bool {
        self.row_major
    }

    /// Stored values
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Stored secondary indices
    pub fn indices(&self) -> &[I] {
        &self.indices
    }

    /// Pointer array delimiting each primary element
    pub fn pointers(&self) -> &[usize] {
        &self.pointers
    }

    /// Values and secondary indices of one primary element
    pub fn primary_slice(&self, primary: usize) -> (&[V], &[I]) {
        let range = self.pointers[primary]..self.pointers[primary + 1];
        (&self.values[range.clone()], &self.indices[range])
    }

    /// Bytes held by the value, index and pointer arrays
    pub fn stored_bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<V>()
            + self.indices.len() * std::mem::size_of::<I>()
            + self.pointers.len() * std::mem::size_of::<usize>()
    }

    pub(crate) fn find(&self, primary: usize, secondary: usize) -> Option<V> {
        let (values, indices) = self.primary_slice(primary);
        indices
            .binary_search_by(|i| i.to_usize().cmp(&secondary))
            .ok()
            .map(|pos| values[pos])
    }

    fn primary_extract(&self, primary: usize, values: &mut Vec<V>, indices: &mut Vec<usize>) {
        values.clear();
        indices.clear();
        let (vals, idx) = self.primary_slice(primary);
        for (&v, &i) in vals.iter().zip(idx) {
            if !v.is_zero() {
                values.push(v);
                indices.push(i.to_usize());
            }
        }
    }

    fn secondary_extract(
        &self,
        secondary: usize,
        primaries: Range<usize>,
        values: &mut Vec<V>,
        indices: &mut Vec<usize>,
    ) {
        values.clear();
        indices.clear();
        for p in primaries {
            if let Some(v) = self.find(p, secondary) {
                if !v.is_zero() {
                    values.push(v);
                    indices.push(p);
                }
            }
        }
    }
}

impl<V: MatrixElement> CompressedSparseMatrix<V, usize> {
    /// Build from unsorted triplets
    ///
    /// A coordinate given twice is rejected with `DuplicateIndex`.
    pub fn from_triplets(
        nrow: usize,
        ncol: usize,
        mut values: Vec<V>,
        mut rows: Vec<usize>,
        mut cols: Vec<usize>,
        row_major: bool,
    ) -> Result<Self, LayeredError> {
        let pointers =
            compress_sparse_triplets(nrow, ncol, &mut values, &mut rows, &mut cols, row_major)?;
        let indices = if row_major { cols } else { rows };
        for w in pointers.windows(2) {
            check_increasing(&indices[w[0]..w[1]])?;
        }
        Ok(Self::from_parts(nrow, ncol, values, indices, pointers, row_major))
    }
}

impl<V: MatrixElement, I: ColumnIndex> Matrix for CompressedSparseMatrix<V, I> {
    type Value = V;

    fn nrow(&self) -> usize {
        self.nrow
    }

    fn ncol(&self) -> usize {
        self.ncol
    }

    fn is_sparse(&self) -> bool {
        true
    }

    fn prefer_rows(&self) -> bool {
        self.row_major
    }

    fn dense_row(&self, row: usize, buffer: &mut [V]) {
        assert!(row < self.nrow, "row index out of bounds");
        let buffer = &mut buffer[..self.ncol];
        if self.row_major {
            buffer.fill(V::zero());
            let (vals, idx) = self.primary_slice(row);
            for (&v, &i) in vals.iter().zip(idx) {
                buffer[i.to_usize()] = v;
            }
        } else {
            for (c, slot) in buffer.iter_mut().enumerate() {
                *slot = self.find(c, row).unwrap_or_else(V::zero);
            }
        }
    }

    fn dense_column(&self, col: usize, buffer: &mut [V]) {
        assert!(col < self.ncol, "column index out of bounds");
        let buffer = &mut buffer[..self.nrow];
        if self.row_major {
            for (r, slot) in buffer.iter_mut().enumerate() {
                *slot = self.find(r, col).unwrap_or_else(V::zero);
            }
        } else {
            buffer.fill(V::zero());
            let (vals, idx) = self.primary_slice(col);
            for (&v, &i) in vals.iter().zip(idx) {
                buffer[i.to_usize()] = v;
            }
        }
    }

    fn sparse_row(&self, row: usize, values: &mut Vec<V>, indices: &mut Vec<usize>) {
        assert!(row < self.nrow, "row index out of bounds");
        if self.row_major {
            self.primary_extract(row, values, indices);
        } else {
            self.secondary_extract(row, 0..self.ncol, values, indices);
        }
    }

    fn sparse_column(&self, col: usize, values: &mut Vec<V>, indices: &mut Vec<usize>) {
        self.sparse_column_block(col, 0..self.nrow, values, indices);
    }

    fn sparse_column_block(
        &self,
        col: usize,
        rows: Range<usize>,
        values: &mut Vec<V>,
        indices: &mut Vec<usize>,
    ) {
        assert!(col < self.ncol, "column index out of bounds");
        if self.row_major {
            self.secondary_extract(col, rows, values, indices);
            return;
        }

        values.clear();
        indices.clear();
        let (vals, idx) = self.primary_slice(col);
        let start = idx.partition_point(|i| i.to_usize() < rows.start);
        let end = idx.partition_point(|i| i.to_usize() < rows.end);
        for (&v, &i) in vals[start..end].iter().zip(&idx[start..end]) {
            if !v.is_zero() {
                values.push(v);
                indices.push(i.to_usize());
            }
        }
    }
}

impl<V: MatrixElement, I: ColumnIndex> SparseMatrix for CompressedSparseMatrix<V, I> {
    type Element = V;

    fn get_element(&self, row: usize, col: usize) -> Option<V> {
        if row >= self.nrow || col >= self.ncol {
            return None;
        }
        let found = if self.row_major {
            self.find(row, col)
        } else {
            self.find(col, row)
        };
        found.filter(|v| !v.is_zero())
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }
}

fn check_increasing<I: Ord>(indices: &[I]) -> Result<(), LayeredError> {
    for w in indices.windows(2) {
        if w[0] == w[1] {
            return Err(LayeredError::DuplicateIndex);
        }
        if w[0] > w[1] {
            return Err(LayeredError::InvalidRange);
        }
    }
    Ok(())
}

/// Sort triplets in place and compute compressed pointers
///
/// Triplets are ordered by (primary, secondary), where primary is the row
/// when `by_row` is set and the column otherwise. Returns the pointer
/// array of length `primary + 1`.
pub fn compress_sparse_triplets<V: Copy>(
    nrow: usize,
    ncol: usize,
    values: &mut Vec<V>,
    rows: &mut Vec<usize>,
    cols: &mut Vec<usize>,
    by_row: bool,
) -> Result<Vec<usize>, LayeredError> {
    let n = values.len();
    if rows.len() != n || cols.len() != n {
        return Err(LayeredError::DimensionMismatch);
    }
    if rows.iter().any(|&r| r >= nrow) || cols.iter().any(|&c| c >= ncol) {
        return Err(LayeredError::IndexOutOfBounds);
    }

    let (primary, secondary, primary_len) = if by_row {
        (&*rows, &*cols, nrow)
    } else {
        (&*cols, &*rows, ncol)
    };

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (primary[i], secondary[i]));

    let mut pointers = vec![0usize; primary_len + 1];
    for &p in primary.iter() {
        pointers[p + 1] += 1;
    }
    for i in 0..primary_len {
        pointers[i + 1] += pointers[i];
    }

    *values = order.iter().map(|&i| values[i]).collect();
    *rows = order.iter().map(|&i| rows[i]).collect();
    *cols = order.iter().map(|&i| cols[i]).collect();

    Ok(pointers)
}
