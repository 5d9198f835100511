//! Bounds-checked and sequential access on top of [`Matrix`]

use std::ops::Range;

use layered_core::{LayeredError, Matrix};

use crate::error::Result;

/// Non-zero entries of one row or column
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<V> {
    pub values: Vec<V>,
    pub indices: Vec<usize>,
}

impl<V> Default for SparseVector<V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            indices: Vec::new(),
        }
    }
}

impl<V> SparseVector<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pairs of (index, value)
    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> + '_ {
        self.indices.iter().copied().zip(self.values.iter())
    }
}

/// Fetch the non-zero entries of `row`, failing instead of panicking when out of range
pub fn checked_row<M: Matrix>(matrix: &M, row: usize) -> Result<SparseVector<M::Value>> {
    if row >= matrix.nrow() {
        return Err(LayeredError::IndexOutOfBounds.into());
    }
    let mut out = SparseVector::default();
    matrix.sparse_row(row, &mut out.values, &mut out.indices);
    Ok(out)
}

/// Fetch the non-zero entries of `col`, failing instead of panicking when out of range
pub fn checked_column<M: Matrix>(matrix: &M, col: usize) -> Result<SparseVector<M::Value>> {
    if col >= matrix.ncol() {
        return Err(LayeredError::IndexOutOfBounds.into());
    }
    let mut out = SparseVector::default();
    matrix.sparse_column(col, &mut out.values, &mut out.indices);
    Ok(out)
}

/// Walks a contiguous range of rows or columns, reusing its buffers
pub struct ConsecutiveExtractor<'a, M: Matrix> {
    matrix: &'a M,
    by_row: bool,
    current: usize,
    end: usize,
    buffer: SparseVector<M::Value>,
}

impl<'a, M: Matrix> ConsecutiveExtractor<'a, M> {
    /// Extract rows (`by_row`) or columns in `range`
    pub fn new(matrix: &'a M, by_row: bool, range: Range<usize>) -> Result<Self> {
        let extent = if by_row { matrix.nrow() } else { matrix.ncol() };
        if range.start > range.end {
            return Err(LayeredError::InvalidRange.into());
        }
        if range.end > extent {
            return Err(LayeredError::IndexOutOfBounds.into());
        }
        Ok(Self {
            matrix,
            by_row,
            current: range.start,
            end: range.end,
            buffer: SparseVector::default(),
        })
    }

    /// Next (index, entries); the entries are valid until the following call
    pub fn fetch(&mut self) -> Option<(usize, &SparseVector<M::Value>)> {
        if self.current >= self.end {
            return None;
        }
        let index = self.current;
        self.current += 1;

        let SparseVector { values, indices } = &mut self.buffer;
        if self.by_row {
            self.matrix.sparse_row(index, values, indices);
        } else {
            self.matrix.sparse_column(index, values, indices);
        }
        Some((index, &self.buffer))
    }

    /// Number of rows or columns left
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.current)
    }
}

/// Extractor over every row of `matrix`
pub fn consecutive_rows<M: Matrix>(matrix: &M) -> ConsecutiveExtractor<'_, M> {
    ConsecutiveExtractor {
        matrix,
        by_row: true,
        current: 0,
        end: matrix.nrow(),
        buffer: SparseVector::default(),
    }
}

/// Extractor over every column of `matrix`
pub fn consecutive_columns<M: Matrix>(matrix: &M) -> ConsecutiveExtractor<'_, M> {
    ConsecutiveExtractor {
        matrix,
        by_row: false,
        current: 0,
        end: matrix.ncol(),
        buffer: SparseVector::default(),
    }
}
