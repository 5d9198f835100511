use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use layered_sparse::{
    convert_to_layered_sparse, read_layered_sparse_from_matrix_market_buffer,
    CompressedSparseMatrix, LayeredMatrix, ReadOptions,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NROW: usize = 20_000;
const NCOL: usize = 2_000;

/// Triplets with roughly 2% density, mostly small counts
fn mock_triplets() -> (Vec<u32>, Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut values, mut rows, mut cols) = (Vec::new(), Vec::new(), Vec::new());
    for r in 0..NROW {
        for c in 0..NCOL {
            if rng.gen_bool(0.02) {
                let value = match rng.gen_range(0..20) {
                    0 => rng.gen_range(65_536..1_000_000),
                    1..=3 => rng.gen_range(256..65_536),
                    _ => rng.gen_range(1..256),
                };
                values.push(value);
                rows.push(r);
                cols.push(c);
            }
        }
    }
    (values, rows, cols)
}

fn bench_convert(c: &mut Criterion) {
    let (values, rows, cols) = mock_triplets();
    let csr = CompressedSparseMatrix::from_triplets(
        NROW,
        NCOL,
        values.clone(),
        rows.clone(),
        cols.clone(),
        true,
    )
    .unwrap();
    let csc = CompressedSparseMatrix::from_triplets(NROW, NCOL, values, rows, cols, false).unwrap();

    let mut group = c.benchmark_group("convert");
    for &threads in &[1, 2, 4] {
        group.bench_with_input(BenchmarkId::new("csr", threads), &threads, |b, &threads| {
            b.iter(|| convert_to_layered_sparse::<u32, _>(&csr, threads).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("csc", threads), &threads, |b, &threads| {
            b.iter(|| convert_to_layered_sparse::<u32, _>(&csc, threads).unwrap());
        });
    }
    group.finish();
}

fn bench_matrix_market(c: &mut Criterion) {
    let (values, rows, cols) = mock_triplets();
    let mut text = format!(
        "%%MatrixMarket matrix coordinate integer general\n{NROW} {NCOL} {}\n",
        values.len()
    );
    for ((r, c), v) in rows.iter().zip(&cols).zip(&values) {
        text.push_str(&format!("{} {} {}\n", r + 1, c + 1, v));
    }

    let mut group = c.benchmark_group("matrix_market");
    for &chunk_size in &[256, 65_536] {
        let options = ReadOptions::default().with_chunk_size(chunk_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &options,
            |b, options| {
                b.iter(|| {
                    let m: LayeredMatrix<u32, u16> =
                        read_layered_sparse_from_matrix_market_buffer(text.as_bytes(), options)
                            .unwrap();
                    m
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_convert, bench_matrix_market);
criterion_main!(benches);
