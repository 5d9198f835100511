#![allow(dead_code)]

use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use layered_sparse::{CompressedSparseMatrix, DenseMatrix, Matrix};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};

/// Random count matrix as unique (row, column, value) triplets
pub struct MockCounts {
    pub nrow: usize,
    pub ncol: usize,
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub values: Vec<u32>,
}

/// Mostly small counts with some needing the u16 and u32 layers
fn mock_value(rng: &mut StdRng) -> u32 {
    match rng.gen_range(0..10) {
        0..=6 => rng.gen_range(1..=255),
        7 | 8 => rng.gen_range(256..=65_535),
        _ => rng.gen_range(65_536..=5_000_000),
    }
}

impl MockCounts {
    pub fn new(nrow: usize, ncol: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = Self {
            nrow,
            ncol,
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
        };
        for r in 0..nrow {
            let per_row = rng.gen_range(0..=3.min(ncol));
            let mut cols = (0..ncol).choose_multiple(&mut rng, per_row);
            cols.shuffle(&mut rng);
            for c in cols {
                counts.rows.push(r);
                counts.cols.push(c);
                counts.values.push(mock_value(&mut rng));
            }
        }
        counts
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn to_csr(&self) -> CompressedSparseMatrix<u32> {
        CompressedSparseMatrix::from_triplets(
            self.nrow,
            self.ncol,
            self.values.clone(),
            self.rows.clone(),
            self.cols.clone(),
            true,
        )
        .unwrap()
    }

    pub fn to_csc(&self) -> CompressedSparseMatrix<u32> {
        CompressedSparseMatrix::from_triplets(
            self.nrow,
            self.ncol,
            self.values.clone(),
            self.rows.clone(),
            self.cols.clone(),
            false,
        )
        .unwrap()
    }

    pub fn to_dense(&self, row_major: bool) -> DenseMatrix<u32> {
        let mut values = vec![0u32; self.nrow * self.ncol];
        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            let at = if row_major {
                r * self.ncol + c
            } else {
                c * self.nrow + r
            };
            values[at] = v;
        }
        DenseMatrix::new(self.nrow, self.ncol, values, row_major).unwrap()
    }

    /// Coordinate Matrix Market text, entries in generation order
    pub fn to_matrix_market(&self) -> String {
        let mut text = String::from("%%MatrixMarket matrix coordinate integer general\n");
        text.push_str("% generated for tests\n");
        text.push_str(&format!("{} {} {}\n", self.nrow, self.ncol, self.nnz()));
        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            text.push_str(&format!("{} {} {}\n", r + 1, c + 1, v));
        }
        text
    }
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

pub fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Assert that two matrices report identical rows and columns
pub fn assert_same_content<A, B>(a: &A, b: &B)
where
    A: Matrix<Value = u32>,
    B: Matrix<Value = u32>,
{
    assert_eq!((a.nrow(), a.ncol()), (b.nrow(), b.ncol()));

    let (mut va, mut ia, mut vb, mut ib) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for r in 0..a.nrow() {
        a.sparse_row(r, &mut va, &mut ia);
        b.sparse_row(r, &mut vb, &mut ib);
        assert_eq!((&va, &ia), (&vb, &ib), "row {r} differs");
    }
    for c in 0..a.ncol() {
        a.sparse_column(c, &mut va, &mut ia);
        b.sparse_column(c, &mut vb, &mut ib);
        assert_eq!((&va, &ia), (&vb, &ib), "column {c} differs");
    }
}
