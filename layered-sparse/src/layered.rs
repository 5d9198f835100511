//! Layered sparse matrices
//!
//! Columns are split into chunks. Within a chunk every row is stored in
//! exactly one of three compressed sparse row layers, holding `u8`, `u16`
//! or `u32` values, chosen by the largest value the row has in that chunk.
//! Rows of count data are mostly small, so most of the matrix ends up in
//! the one-byte layer.

use std::marker::PhantomData;
use std::ops::Range;

use layered_core::{Category, ChunkLayout, ColumnIndex, Matrix, MatrixElement, SparseMatrix};
use serde::Serialize;

use crate::compressed::CompressedSparseMatrix;
use crate::dense::DenseMatrix;

/// Unsigned value type backing one layer
pub(crate) trait LayerValue: MatrixElement + Into<u32> {
    /// Narrow a value already known to fit this layer
    fn narrow(value: u32) -> Self;
}

impl LayerValue for u8 {
    fn narrow(value: u32) -> Self {
        value as u8
    }
}

impl LayerValue for u16 {
    fn narrow(value: u32) -> Self {
        value as u16
    }
}

impl LayerValue for u32 {
    fn narrow(value: u32) -> Self {
        value
    }
}

/// Location of a row inside a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    /// Layer holding the row
    pub category: Category,
    /// Row index within that layer
    pub position: usize,
}

/// Growable compressed storage for one layer
#[derive(Debug, Clone)]
pub(crate) struct LayerBuilder<T, C> {
    values: Vec<T>,
    indices: Vec<C>,
    pointers: Vec<usize>,
}

impl<T: LayerValue, C: ColumnIndex> LayerBuilder<T, C> {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            indices: Vec::new(),
            pointers: vec![0],
        }
    }

    fn rows(&self) -> usize {
        self.pointers.len() - 1
    }

    fn end(&self) -> usize {
        self.pointers[self.rows()]
    }

    /// Reserve `count` entries for a new row, returning its position
    fn reserve_row(&mut self, count: usize) -> usize {
        let position = self.rows();
        let end = self.end();
        self.pointers.push(end + count);
        position
    }

    /// Size the value and index arrays after all rows are reserved
    fn allocate(&mut self) {
        let total = self.end();
        self.values.resize(total, T::zero());
        self.indices.resize(total, C::from_usize(0));
    }

    fn row_start(&self, position: usize) -> usize {
        self.pointers[position]
    }

    fn set(&mut self, at: usize, offset: C, value: u32) {
        self.values[at] = T::narrow(value);
        self.indices[at] = offset;
    }

    fn push_row(&mut self, entries: &[(C, u32)]) -> usize {
        let position = self.rows();
        for &(offset, value) in entries {
            self.indices.push(offset);
            self.values.push(T::narrow(value));
        }
        self.pointers.push(self.values.len());
        position
    }

    /// Append another builder's rows after ours, returning their position offset
    fn append(&mut self, other: Self) -> usize {
        let row_offset = self.rows();
        let base = self.end();
        self.values.extend(other.values);
        self.indices.extend(other.indices);
        self.pointers
            .extend(other.pointers[1..].iter().map(|p| p + base));
        row_offset
    }

    /// Sort every row by column offset, returning how many rows needed it
    fn sort_rows(&mut self) -> usize {
        let mut resorted = 0;
        let mut buffer: Vec<(C, T)> = Vec::new();
        for r in 0..self.rows() {
            let range = self.pointers[r]..self.pointers[r + 1];
            if self.indices[range.clone()].windows(2).all(|w| w[0] <= w[1]) {
                continue;
            }

            buffer.clear();
            buffer.extend(
                self.indices[range.clone()]
                    .iter()
                    .copied()
                    .zip(self.values[range.clone()].iter().copied()),
            );
            buffer.sort_by_key(|&(c, _)| c);
            for (i, (c, v)) in range.zip(buffer.iter().copied()) {
                self.indices[i] = c;
                self.values[i] = v;
            }
            resorted += 1;
        }
        resorted
    }

    /// Offset stored twice in the row at `position`, if any; rows must be sorted
    fn repeated_offset(&self, position: usize) -> Option<C> {
        let range = self.pointers[position]..self.pointers[position + 1];
        self.indices[range]
            .windows(2)
            .find(|w| w[0] == w[1])
            .map(|w| w[0])
    }

    fn finish(self, width: usize) -> CompressedSparseMatrix<T, C> {
        let rows = self.rows();
        CompressedSparseMatrix::from_parts(rows, width, self.values, self.indices, self.pointers, true)
    }
}

/// Layers and row assignments of one column chunk under construction
#[derive(Debug, Clone)]
pub(crate) struct ChunkBuilder<C> {
    layer8: LayerBuilder<u8, C>,
    layer16: LayerBuilder<u16, C>,
    layer32: LayerBuilder<u32, C>,
    slots: Vec<RowSlot>,
}

impl<C: ColumnIndex> ChunkBuilder<C> {
    pub(crate) fn new() -> Self {
        Self {
            layer8: LayerBuilder::new(),
            layer16: LayerBuilder::new(),
            layer32: LayerBuilder::new(),
            slots: Vec::new(),
        }
    }

    /// Reserve row assignments up front, failing instead of aborting
    pub(crate) fn try_reserve_rows(
        &mut self,
        rows: usize,
    ) -> std::result::Result<(), std::collections::TryReserveError> {
        self.slots.try_reserve_exact(rows)
    }

    /// Assign the next row to `category` with room for `count` entries
    pub(crate) fn assign_row(&mut self, category: Category, count: usize) {
        let position = match category {
            Category::U8 => self.layer8.reserve_row(count),
            Category::U16 => self.layer16.reserve_row(count),
            Category::U32 => self.layer32.reserve_row(count),
        };
        self.slots.push(RowSlot { category, position });
    }

    pub(crate) fn allocate(&mut self) {
        self.layer8.allocate();
        self.layer16.allocate();
        self.layer32.allocate();
    }

    /// First storage position of `row` in its layer
    pub(crate) fn cursor(&self, row: usize) -> usize {
        let slot = self.slots[row];
        match slot.category {
            Category::U8 => self.layer8.row_start(slot.position),
            Category::U16 => self.layer16.row_start(slot.position),
            Category::U32 => self.layer32.row_start(slot.position),
        }
    }

    /// Store a value at a position previously obtained from [`Self::cursor`]
    pub(crate) fn set(&mut self, row: usize, at: usize, offset: C, value: u32) {
        match self.slots[row].category {
            Category::U8 => self.layer8.set(at, offset, value),
            Category::U16 => self.layer16.set(at, offset, value),
            Category::U32 => self.layer32.set(at, offset, value),
        }
    }

    /// Append a complete row whose entries are sorted by offset
    pub(crate) fn push_row(&mut self, entries: &[(C, u32)]) {
        let category = entries
            .iter()
            .map(|&(_, v)| Category::of(v))
            .max()
            .unwrap_or_default();
        let position = match category {
            Category::U8 => self.layer8.push_row(entries),
            Category::U16 => self.layer16.push_row(entries),
            Category::U32 => self.layer32.push_row(entries),
        };
        self.slots.push(RowSlot { category, position });
    }

    /// Append the rows of a builder covering the following row block
    pub(crate) fn append(&mut self, other: ChunkBuilder<C>) {
        let offset8 = self.layer8.append(other.layer8);
        let offset16 = self.layer16.append(other.layer16);
        let offset32 = self.layer32.append(other.layer32);
        self.slots.extend(other.slots.into_iter().map(|slot| {
            let offset = match slot.category {
                Category::U8 => offset8,
                Category::U16 => offset16,
                Category::U32 => offset32,
            };
            RowSlot {
                category: slot.category,
                position: slot.position + offset,
            }
        }));
    }

    pub(crate) fn sort_rows(&mut self) -> usize {
        self.layer8.sort_rows() + self.layer16.sort_rows() + self.layer32.sort_rows()
    }

    /// First (row, offset) stored more than once, checked after [`Self::sort_rows`]
    pub(crate) fn first_repeat(&self) -> Option<(usize, usize)> {
        self.slots.iter().enumerate().find_map(|(row, slot)| {
            let repeated = match slot.category {
                Category::U8 => self.layer8.repeated_offset(slot.position),
                Category::U16 => self.layer16.repeated_offset(slot.position),
                Category::U32 => self.layer32.repeated_offset(slot.position),
            };
            repeated.map(|offset| (row, offset.to_usize()))
        })
    }

    pub(crate) fn finish(self, width: usize) -> LayeredChunk<C> {
        LayeredChunk {
            layer8: self.layer8.finish(width),
            layer16: self.layer16.finish(width),
            layer32: self.layer32.finish(width),
            slots: self.slots,
        }
    }
}

fn visit_row<T: LayerValue, C: ColumnIndex>(
    layer: &CompressedSparseMatrix<T, C>,
    position: usize,
    f: &mut impl FnMut(usize, u32),
) {
    let (values, indices) = layer.primary_slice(position);
    for (&v, &i) in values.iter().zip(indices) {
        f(i.to_usize(), v.into());
    }
}

/// One column chunk of a layered matrix
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredChunk<C> {
    layer8: CompressedSparseMatrix<u8, C>,
    layer16: CompressedSparseMatrix<u16, C>,
    layer32: CompressedSparseMatrix<u32, C>,
    slots: Vec<RowSlot>,
}

impl<C: ColumnIndex> LayeredChunk<C> {
    /// Where `row` lives in this chunk
    pub fn slot(&self, row: usize) -> RowSlot {
        self.slots[row]
    }

    /// Visit the stored entries of `row` as (offset, value) in offset order
    pub fn for_each_in_row(&self, row: usize, mut f: impl FnMut(usize, u32)) {
        let slot = self.slots[row];
        match slot.category {
            Category::U8 => visit_row(&self.layer8, slot.position, &mut f),
            Category::U16 => visit_row(&self.layer16, slot.position, &mut f),
            Category::U32 => visit_row(&self.layer32, slot.position, &mut f),
        }
    }

    /// Value at (`row`, `offset`) if stored
    pub fn find(&self, row: usize, offset: usize) -> Option<u32> {
        let slot = self.slots[row];
        match slot.category {
            Category::U8 => self.layer8.find(slot.position, offset).map(u32::from),
            Category::U16 => self.layer16.find(slot.position, offset).map(u32::from),
            Category::U32 => self.layer32.find(slot.position, offset),
        }
    }

    /// Number of rows assigned to `category`
    pub fn layer_rows(&self, category: Category) -> usize {
        match category {
            Category::U8 => self.layer8.nrow(),
            Category::U16 => self.layer16.nrow(),
            Category::U32 => self.layer32.nrow(),
        }
    }

    /// Number of stored values in `category`
    pub fn layer_nnz(&self, category: Category) -> usize {
        match category {
            Category::U8 => self.layer8.nnz(),
            Category::U16 => self.layer16.nnz(),
            Category::U32 => self.layer32.nnz(),
        }
    }

    /// Bytes held by the layers and the row assignments
    pub fn stored_bytes(&self) -> usize {
        self.layer8.stored_bytes()
            + self.layer16.stored_bytes()
            + self.layer32.stored_bytes()
            + self.slots.len() * std::mem::size_of::<RowSlot>()
    }

    fn nnz(&self) -> usize {
        Category::ALL.iter().map(|&c| self.layer_nnz(c)).sum()
    }
}

/// Per-layer statistics of a layered matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub nrow: usize,
    pub ncol: usize,
    pub nnz: usize,
    pub chunk_size: usize,
    pub num_chunks: usize,
    /// Row assignments per layer (u8, u16, u32), summed over chunks
    pub rows_per_layer: [usize; 3],
    /// Stored values per layer (u8, u16, u32)
    pub nnz_per_layer: [usize; 3],
    pub stored_bytes: usize,
}

/// Sparse matrix of non-negative integers stored in width-specific layers
///
/// `V` is the value type reported through [`Matrix`]; `C` holds the
/// column offsets inside each chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredMatrix<V, C> {
    nrow: usize,
    layout: ChunkLayout,
    chunks: Vec<LayeredChunk<C>>,
    _value: PhantomData<fn() -> V>,
}

impl<V: MatrixElement, C: ColumnIndex> LayeredMatrix<V, C> {
    pub(crate) fn from_builders(
        nrow: usize,
        layout: ChunkLayout,
        builders: Vec<ChunkBuilder<C>>,
    ) -> Self {
        let chunks = builders
            .into_iter()
            .enumerate()
            .map(|(k, b)| b.finish(layout.chunk_width(k)))
            .collect();
        Self {
            nrow,
            layout,
            chunks,
            _value: PhantomData,
        }
    }

    /// Column partition used by this matrix
    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_size(&self) -> usize {
        self.layout.chunk_size()
    }

    pub fn chunk(&self, chunk: usize) -> &LayeredChunk<C> {
        &self.chunks[chunk]
    }

    /// Number of rows stored in `category` for one chunk
    pub fn layer_rows(&self, chunk: usize, category: Category) -> usize {
        self.chunks[chunk].layer_rows(category)
    }

    pub fn summary(&self) -> LayerSummary {
        let mut rows_per_layer = [0; 3];
        let mut nnz_per_layer = [0; 3];
        for chunk in &self.chunks {
            for category in Category::ALL {
                rows_per_layer[category.index()] += chunk.layer_rows(category);
                nnz_per_layer[category.index()] += chunk.layer_nnz(category);
            }
        }

        LayerSummary {
            nrow: self.nrow,
            ncol: self.layout.ncol(),
            nnz: nnz_per_layer.iter().sum(),
            chunk_size: self.layout.chunk_size(),
            num_chunks: self.chunks.len(),
            rows_per_layer,
            nnz_per_layer,
            stored_bytes: self.chunks.iter().map(LayeredChunk::stored_bytes).sum(),
        }
    }

    /// Materialize into a dense matrix
    pub fn to_dense(&self, row_major: bool) -> DenseMatrix<V> {
        let (nrow, ncol) = (self.nrow, self.layout.ncol());
        let mut values = vec![V::zero(); nrow * ncol];
        for (k, chunk) in self.chunks.iter().enumerate() {
            let start = self.layout.chunk_start(k);
            for r in 0..nrow {
                chunk.for_each_in_row(r, |offset, value| {
                    let c = start + offset;
                    let at = if row_major { r * ncol + c } else { c * nrow + r };
                    values[at] = V::from_count(value);
                });
            }
        }
        DenseMatrix::from_parts(nrow, ncol, values, row_major)
    }
}

impl<V: MatrixElement, C: ColumnIndex> Matrix for LayeredMatrix<V, C> {
    type Value = V;

    fn nrow(&self) -> usize {
        self.nrow
    }

    fn ncol(&self) -> usize {
        self.layout.ncol()
    }

    fn is_sparse(&self) -> bool {
        true
    }

    fn prefer_rows(&self) -> bool {
        true
    }

    fn dense_row(&self, row: usize, buffer: &mut [V]) {
        assert!(row < self.nrow, "row index out of bounds");
        buffer[..self.layout.ncol()].fill(V::zero());
        for (k, chunk) in self.chunks.iter().enumerate() {
            let start = self.layout.chunk_start(k);
            chunk.for_each_in_row(row, |offset, value| {
                buffer[start + offset] = V::from_count(value);
            });
        }
    }

    fn dense_column(&self, col: usize, buffer: &mut [V]) {
        assert!(col < self.layout.ncol(), "column index out of bounds");
        let chunk = &self.chunks[self.layout.chunk_of(col)];
        let offset = self.layout.offset_of(col);
        for (r, slot) in buffer[..self.nrow].iter_mut().enumerate() {
            *slot = chunk.find(r, offset).map_or_else(V::zero, V::from_count);
        }
    }

    fn sparse_row(&self, row: usize, values: &mut Vec<V>, indices: &mut Vec<usize>) {
        assert!(row < self.nrow, "row index out of bounds");
        values.clear();
        indices.clear();
        for (k, chunk) in self.chunks.iter().enumerate() {
            let start = self.layout.chunk_start(k);
            chunk.for_each_in_row(row, |offset, value| {
                values.push(V::from_count(value));
                indices.push(start + offset);
            });
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
        assert!(col < self.layout.ncol(), "column index out of bounds");
        values.clear();
        indices.clear();
        let chunk = &self.chunks[self.layout.chunk_of(col)];
        let offset = self.layout.offset_of(col);
        for r in rows {
            if let Some(value) = chunk.find(r, offset) {
                values.push(V::from_count(value));
                indices.push(r);
            }
        }
    }
}

impl<V: MatrixElement, C: ColumnIndex> SparseMatrix for LayeredMatrix<V, C> {
    type Element = V;

    fn get_element(&self, row: usize, col: usize) -> Option<V> {
        if row >= self.nrow || col >= self.layout.ncol() {
            return None;
        }
        self.chunks[self.layout.chunk_of(col)]
            .find(row, self.layout.offset_of(col))
            .map(V::from_count)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrow, self.layout.ncol())
    }

    fn nnz(&self) -> usize {
        self.chunks.iter().map(LayeredChunk::nnz).sum()
    }
}

/// Layered matrix with either narrow (u16) or wide (u32) column offsets
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicLayeredMatrix<V> {
    Narrow(LayeredMatrix<V, u16>),
    Wide(LayeredMatrix<V, u32>),
}

macro_rules! delegate {
    ($self:ident, $m:ident => $body:expr) => {
        match $self {
            DynamicLayeredMatrix::Narrow($m) => $body,
            DynamicLayeredMatrix::Wide($m) => $body,
        }
    };
}

impl<V: MatrixElement> DynamicLayeredMatrix<V> {
    pub fn num_chunks(&self) -> usize {
        delegate!(self, m => m.num_chunks())
    }

    pub fn chunk_size(&self) -> usize {
        delegate!(self, m => m.chunk_size())
    }

    pub fn layer_rows(&self, chunk: usize, category: Category) -> usize {
        delegate!(self, m => m.layer_rows(chunk, category))
    }

    pub fn summary(&self) -> LayerSummary {
        delegate!(self, m => m.summary())
    }

    pub fn to_dense(&self, row_major: bool) -> DenseMatrix<V> {
        delegate!(self, m => m.to_dense(row_major))
    }
}

impl<V: MatrixElement> From<LayeredMatrix<V, u16>> for DynamicLayeredMatrix<V> {
    fn from(matrix: LayeredMatrix<V, u16>) -> Self {
        DynamicLayeredMatrix::Narrow(matrix)
    }
}

impl<V: MatrixElement> From<LayeredMatrix<V, u32>> for DynamicLayeredMatrix<V> {
    fn from(matrix: LayeredMatrix<V, u32>) -> Self {
        DynamicLayeredMatrix::Wide(matrix)
    }
}

impl<V: MatrixElement> Matrix for DynamicLayeredMatrix<V> {
    type Value = V;

    fn nrow(&self) -> usize {
        delegate!(self, m => m.nrow())
    }

    fn ncol(&self) -> usize {
        delegate!(self, m => m.ncol())
    }

    fn is_sparse(&self) -> bool {
        true
    }

    fn prefer_rows(&self) -> bool {
        true
    }

    fn dense_row(&self, row: usize, buffer: &mut [V]) {
        delegate!(self, m => m.dense_row(row, buffer))
    }

    fn dense_column(&self, col: usize, buffer: &mut [V]) {
        delegate!(self, m => m.dense_column(col, buffer))
    }

    fn sparse_row(&self, row: usize, values: &mut Vec<V>, indices: &mut Vec<usize>) {
        delegate!(self, m => m.sparse_row(row, values, indices))
    }

    fn sparse_column(&self, col: usize, values: &mut Vec<V>, indices: &mut Vec<usize>) {
        delegate!(self, m => m.sparse_column(col, values, indices))
    }

    fn sparse_column_block(
        &self,
        col: usize,
        rows: Range<usize>,
        values: &mut Vec<V>,
        indices: &mut Vec<usize>,
    ) {
        delegate!(self, m => m.sparse_column_block(col, rows, values, indices))
    }
}

impl<V: MatrixElement> SparseMatrix for DynamicLayeredMatrix<V> {
    type Element = V;

    fn get_element(&self, row: usize, col: usize) -> Option<V> {
        delegate!(self, m => m.get_element(row, col))
    }

    fn dimensions(&self) -> (usize, usize) {
        delegate!(self, m => m.dimensions())
    }

    fn nnz(&self) -> usize {
        delegate!(self, m => m.nnz())
    }
}
