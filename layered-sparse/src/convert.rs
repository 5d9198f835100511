//! Conversion of arbitrary matrices into layered sparse form
//!
//! The input must hold non-negative integers no larger than `u32::MAX`.
//! Rows are processed in contiguous blocks, one per worker, and each
//! block's chunk builders are appended in row order, so the result does
//! not depend on the number of threads.

use layered_core::{
    categorize_count, check_chunk_size, ChunkLayout, ColumnIndex, LayeredError, Matrix,
    MatrixElement,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::layered::{ChunkBuilder, DynamicLayeredMatrix, LayeredMatrix};
use crate::parallel::parallelize;

/// Per-chunk (offset, value) buffers for the row being assembled
struct RowEntries<C> {
    layout: ChunkLayout,
    entries: Vec<Vec<(C, u32)>>,
}

impl<C: ColumnIndex> RowEntries<C> {
    fn new(layout: ChunkLayout) -> Self {
        Self {
            layout,
            entries: vec![Vec::new(); layout.num_chunks()],
        }
    }

    fn add<V: MatrixElement>(&mut self, col: usize, value: V) -> Result<()> {
        if value.is_zero() {
            return Ok(());
        }
        let count = value.to_count()?;
        categorize_count(count)?;
        self.entries[self.layout.chunk_of(col)]
            .push((C::from_usize(self.layout.offset_of(col)), count as u32));
        Ok(())
    }

    fn flush_into(&mut self, builders: &mut [ChunkBuilder<C>]) -> Result<()> {
        for (builder, entries) in builders.iter_mut().zip(self.entries.iter_mut()) {
            push_entries(builder, entries)?;
        }
        Ok(())
    }
}

/// Append one row's entries for a chunk, restoring offset order if needed
///
/// Offsets must be unique within the row.
fn push_entries<C: ColumnIndex>(
    builder: &mut ChunkBuilder<C>,
    entries: &mut Vec<(C, u32)>,
) -> Result<()> {
    if !entries.windows(2).all(|w| w[0].0 < w[1].0) {
        entries.sort_unstable_by_key(|&(offset, _)| offset);
        if entries.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(LayeredError::DuplicateIndex.into());
        }
    }
    builder.push_row(entries);
    entries.clear();
    Ok(())
}

fn merge_blocks<C: ColumnIndex>(
    layout: ChunkLayout,
    blocks: Vec<Vec<ChunkBuilder<C>>>,
) -> Vec<ChunkBuilder<C>> {
    let mut merged = vec![ChunkBuilder::new(); layout.num_chunks()];
    for block in blocks {
        for (target, part) in merged.iter_mut().zip(block) {
            target.append(part);
        }
    }
    merged
}

/// Convert by traversing the input row by row
///
/// `chunk_size` is capped to what `C` can address; zero is rejected.
pub fn convert_by_row<V, C, M>(
    matrix: &M,
    chunk_size: usize,
    num_threads: usize,
) -> Result<LayeredMatrix<V, C>>
where
    V: MatrixElement,
    C: ColumnIndex,
    M: Matrix + ?Sized,
{
    let (nrow, ncol) = (matrix.nrow(), matrix.ncol());
    let layout = ChunkLayout::new(ncol, check_chunk_size::<C>(chunk_size)?)?;
    debug!(nrow, ncol, num_chunks = layout.num_chunks(), sparse = matrix.is_sparse(), "converting by row");

    let blocks = parallelize(nrow, num_threads, |rows| {
        let mut builders = vec![ChunkBuilder::new(); layout.num_chunks()];
        let mut row = RowEntries::<C>::new(layout);

        if matrix.is_sparse() {
            let mut values = Vec::new();
            let mut indices = Vec::new();
            for r in rows {
                matrix.sparse_row(r, &mut values, &mut indices);
                for (&v, &c) in values.iter().zip(&indices) {
                    row.add(c, v)?;
                }
                row.flush_into(&mut builders)?;
            }
        } else {
            let mut buffer = vec![M::Value::zero(); ncol];
            for r in rows {
                matrix.dense_row(r, &mut buffer);
                for (c, &v) in buffer.iter().enumerate() {
                    row.add(c, v)?;
                }
                row.flush_into(&mut builders)?;
            }
        }

        Ok(builders)
    })?;

    let builders = merge_blocks(layout, blocks);
    Ok(LayeredMatrix::from_builders(nrow, layout, builders))
}

/// Convert by traversing the input column by column within row blocks
///
/// `chunk_size` is capped to what `C` can address; zero is rejected.
pub fn convert_by_column<V, C, M>(
    matrix: &M,
    chunk_size: usize,
    num_threads: usize,
) -> Result<LayeredMatrix<V, C>>
where
    V: MatrixElement,
    C: ColumnIndex,
    M: Matrix + ?Sized,
{
    let (nrow, ncol) = (matrix.nrow(), matrix.ncol());
    let layout = ChunkLayout::new(ncol, check_chunk_size::<C>(chunk_size)?)?;
    debug!(nrow, ncol, num_chunks = layout.num_chunks(), sparse = matrix.is_sparse(), "converting by column");

    let blocks = parallelize(nrow, num_threads, |rows| {
        let mut builders = vec![ChunkBuilder::new(); layout.num_chunks()];
        let mut pending: Vec<Vec<(C, u32)>> = vec![Vec::new(); rows.len()];
        let mut values = Vec::new();
        let mut indices = Vec::new();
        let mut buffer = vec![M::Value::zero(); if matrix.is_sparse() { 0 } else { nrow }];

        for (k, builder) in builders.iter_mut().enumerate() {
            for c in layout.chunk_range(k) {
                let offset = C::from_usize(layout.offset_of(c));
                let mut take = |r: usize, v: M::Value| -> Result<()> {
                    if v.is_zero() {
                        return Ok(());
                    }
                    let count = v.to_count()?;
                    categorize_count(count)?;
                    pending[r - rows.start].push((offset, count as u32));
                    Ok(())
                };

                if matrix.is_sparse() {
                    matrix.sparse_column_block(c, rows.clone(), &mut values, &mut indices);
                    for (&v, &r) in values.iter().zip(&indices) {
                        take(r, v)?;
                    }
                } else {
                    matrix.dense_column(c, &mut buffer);
                    for r in rows.clone() {
                        take(r, buffer[r])?;
                    }
                }
            }

            for entries in pending.iter_mut() {
                push_entries(builder, entries)?;
            }
        }

        Ok(builders)
    })?;

    let builders = merge_blocks(layout, blocks);
    Ok(LayeredMatrix::from_builders(nrow, layout, builders))
}

/// Convert a matrix of non-negative integers into layered sparse form
///
/// Matrices with at most 65535 rows store column offsets as `u16` in
/// chunks of 65536 columns; larger matrices use `u32` offsets, which in
/// practice puts every column into a single chunk. The traversal order
/// follows [`Matrix::prefer_rows`].
///
/// Fails on the first negative value or value above `u32::MAX`.
pub fn convert_to_layered_sparse<V, M>(
    matrix: &M,
    num_threads: usize,
) -> Result<DynamicLayeredMatrix<V>>
where
    V: MatrixElement,
    M: Matrix + ?Sized,
{
    let converted: DynamicLayeredMatrix<V> = if matrix.nrow() <= u16::MAX as usize {
        let chunk_size = <u16 as ColumnIndex>::MAX_CHUNK_SIZE;
        if matrix.prefer_rows() {
            convert_by_row::<V, u16, M>(matrix, chunk_size, num_threads)?.into()
        } else {
            convert_by_column::<V, u16, M>(matrix, chunk_size, num_threads)?.into()
        }
    } else {
        let chunk_size = <u32 as ColumnIndex>::MAX_CHUNK_SIZE;
        if matrix.prefer_rows() {
            convert_by_row::<V, u32, M>(matrix, chunk_size, num_threads)?.into()
        } else {
            convert_by_column::<V, u32, M>(matrix, chunk_size, num_threads)?.into()
        }
    };

    let summary = converted.summary();
    info!(
        nrow = summary.nrow,
        ncol = summary.ncol,
        nnz = summary.nnz,
        stored_bytes = summary.stored_bytes,
        "converted matrix to layered sparse form"
    );
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressed::CompressedSparseMatrix;
    use crate::dense::DenseMatrix;
    use crate::error::Error;
    use layered_core::{Category, LayeredError, SparseMatrix};

    fn rows() -> Vec<Vec<i32>> {
        vec![
            vec![0, 3, 0, 0, 1000, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0],
            vec![70_000, 0, 5, 0, 0, 0, 2],
            vec![0, 0, 0, 256, 0, 255, 0],
        ]
    }

    fn assert_same<A: Matrix, B: Matrix>(a: &A, b: &B)
    where
        A::Value: PartialEq<B::Value>,
    {
        assert_eq!(a.nrow(), b.nrow());
        assert_eq!(a.ncol(), b.ncol());
        let mut x = vec![A::Value::zero(); a.ncol()];
        let mut y = vec![B::Value::zero(); b.ncol()];
        for r in 0..a.nrow() {
            a.dense_row(r, &mut x);
            b.dense_row(r, &mut y);
            assert!(x.iter().zip(&y).all(|(p, q)| p == q), "row {r} differs");
        }
    }

    #[test]
    fn test_convert_dense_row_major() {
        let dense = DenseMatrix::from_rows(&rows()).unwrap();
        let layered: DynamicLayeredMatrix<i32> = convert_to_layered_sparse(&dense, 1).unwrap();
        assert!(matches!(layered, DynamicLayeredMatrix::Narrow(_)));
        assert_same(&layered, &dense);
        assert_eq!(layered.nnz(), 7);
    }

    #[test]
    fn test_convert_dense_column_major() {
        let columns: Vec<Vec<i32>> = (0..7)
            .map(|c| rows().iter().map(|r| r[c]).collect())
            .collect();
        let dense = DenseMatrix::from_columns(&columns).unwrap();
        let layered: DynamicLayeredMatrix<i32> = convert_to_layered_sparse(&dense, 2).unwrap();
        assert_same(&layered, &dense);
    }

    #[test]
    fn test_small_chunks_assign_layers_per_chunk() {
        let dense = DenseMatrix::from_rows(&rows()).unwrap();
        let layered: LayeredMatrix<i32, u8> = convert_by_row(&dense, 3, 1).unwrap();
        assert_eq!(layered.num_chunks(), 3);

        // Row 0: chunk 0 holds 3 (u8), chunk 1 holds 1000 (u16).
        assert_eq!(layered.chunk(0).slot(0).category, Category::U8);
        assert_eq!(layered.chunk(1).slot(0).category, Category::U16);
        // Row 2: 70000 forces u32 in chunk 0 only.
        assert_eq!(layered.chunk(0).slot(2).category, Category::U32);
        assert_eq!(layered.chunk(2).slot(2).category, Category::U8);
        // Row 3: 256 in chunk 1 is just past the u8 limit.
        assert_eq!(layered.chunk(1).slot(3).category, Category::U16);
        assert_same(&layered, &dense);
    }

    #[test]
    fn test_thread_count_does_not_change_result() {
        let dense = DenseMatrix::from_rows(&rows()).unwrap();
        let single: LayeredMatrix<i32, u16> = convert_by_row(&dense, 2, 1).unwrap();
        let multi: LayeredMatrix<i32, u16> = convert_by_row(&dense, 2, 3).unwrap();
        assert_eq!(single, multi);

        let by_col: LayeredMatrix<i32, u16> = convert_by_column(&dense, 2, 3).unwrap();
        assert_eq!(single, by_col);
    }

    #[test]
    fn test_convert_sparse_inputs() {
        let csc = CompressedSparseMatrix::from_triplets(
            3,
            4,
            vec![300u32, 1, 90_000, 4],
            vec![0, 1, 2, 2],
            vec![3, 0, 1, 2],
            false,
        )
        .unwrap();
        let layered: DynamicLayeredMatrix<u32> = convert_to_layered_sparse(&csc, 2).unwrap();
        assert_same(&layered, &csc);
        assert_eq!(layered.get_element(2, 1), Some(90_000));

        let csr = CompressedSparseMatrix::from_triplets(
            3,
            4,
            vec![300u32, 1, 90_000, 4],
            vec![0, 1, 2, 2],
            vec![3, 0, 1, 2],
            true,
        )
        .unwrap();
        let layered: DynamicLayeredMatrix<u32> = convert_to_layered_sparse(&csr, 1).unwrap();
        assert_same(&layered, &csr);
    }

    #[test]
    fn test_invalid_values() {
        let negative = DenseMatrix::from_rows(&[vec![1i64, -2]]).unwrap();
        let err = convert_to_layered_sparse::<f64, _>(&negative, 1).unwrap_err();
        assert!(matches!(err, Error::Layered(LayeredError::NegativeValue)));

        let huge = DenseMatrix::from_rows(&[vec![5_000_000_000u64]]).unwrap();
        let err = convert_to_layered_sparse::<f64, _>(&huge, 1).unwrap_err();
        assert!(matches!(err, Error::Layered(LayeredError::ValueOutOfRange)));
    }

    /// Sparse rows reported in reverse column order, optionally repeating the last column
    struct Reversed {
        inner: DenseMatrix<u32>,
        repeat: bool,
    }

    impl Matrix for Reversed {
        type Value = u32;

        fn nrow(&self) -> usize {
            self.inner.nrow()
        }

        fn ncol(&self) -> usize {
            self.inner.ncol()
        }

        fn is_sparse(&self) -> bool {
            true
        }

        fn prefer_rows(&self) -> bool {
            true
        }

        fn dense_row(&self, row: usize, buffer: &mut [u32]) {
            self.inner.dense_row(row, buffer);
        }

        fn dense_column(&self, col: usize, buffer: &mut [u32]) {
            self.inner.dense_column(col, buffer);
        }

        fn sparse_row(&self, row: usize, values: &mut Vec<u32>, indices: &mut Vec<usize>) {
            self.inner.sparse_row(row, values, indices);
            values.reverse();
            indices.reverse();
            if self.repeat {
                if let (Some(&v), Some(&i)) = (values.last(), indices.last()) {
                    values.push(v);
                    indices.push(i);
                }
            }
        }
    }

    #[test]
    fn test_unordered_sparse_rows_are_sorted() {
        let inner = DenseMatrix::from_rows(&[vec![4u32, 0, 9], vec![0, 300, 1]]).unwrap();
        let reversed = Reversed {
            inner: inner.clone(),
            repeat: false,
        };
        let layered: LayeredMatrix<u32, u16> = convert_by_row(&reversed, 4, 1).unwrap();

        let mut col = vec![0; 2];
        layered.dense_column(2, &mut col);
        assert_eq!(col, vec![9, 1]);
        assert_eq!(layered.get_element(0, 2), Some(9));
        assert_eq!(layered.get_element(0, 0), Some(4));
        assert_same(&layered, &inner);
    }

    #[test]
    fn test_repeated_columns_rejected() {
        let inner = DenseMatrix::from_rows(&[vec![4u32, 0, 9]]).unwrap();
        let reversed = Reversed {
            inner,
            repeat: true,
        };
        let err = convert_by_row::<u32, u16, _>(&reversed, 4, 1).unwrap_err();
        assert!(matches!(err, Error::Layered(LayeredError::DuplicateIndex)));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let dense = DenseMatrix::from_rows(&rows()).unwrap();
        let err = convert_by_row::<f64, u16, _>(&dense, 0, 1).unwrap_err();
        assert!(matches!(err, Error::Layered(LayeredError::NonPositiveChunkSize)));
    }

    #[test]
    fn test_empty_matrix() {
        let empty = DenseMatrix::<u32>::new(0, 3, Vec::new(), true).unwrap();
        let layered: DynamicLayeredMatrix<u32> = convert_to_layered_sparse(&empty, 4).unwrap();
        assert_eq!(layered.dimensions(), (0, 3));
        assert_eq!(layered.nnz(), 0);
        assert_eq!(layered.num_chunks(), 1);
    }
}
