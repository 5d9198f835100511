mod common;

use common::{assert_same_content, MockCounts};
use layered_sparse::{
    convert_by_column, convert_by_row, convert_to_layered_sparse, Category, ColumnIndex,
    CompressedSparseMatrix, DenseMatrix, DynamicLayeredMatrix, Error, LayeredError,
    LayeredMatrix, SparseMatrix,
};

#[test]
fn test_convert_sparse_row_major() {
    let mock = MockCounts::new(200, 150, 1);
    let csr = mock.to_csr();
    let layered = convert_to_layered_sparse::<u32, _>(&csr, 1).unwrap();

    assert!(matches!(layered, DynamicLayeredMatrix::Narrow(_)));
    assert_eq!(layered.nnz(), mock.nnz());
    assert_same_content(&layered, &csr);
}

#[test]
fn test_offset_width_follows_row_count() {
    let tall = |nrow: usize| {
        CompressedSparseMatrix::from_triplets(
            nrow,
            3,
            vec![7u32, 300, 70_000],
            vec![0, nrow / 2, nrow - 1],
            vec![0, 2, 1],
            true,
        )
        .unwrap()
    };

    let narrow = convert_to_layered_sparse::<u32, _>(&tall(65_535), 2).unwrap();
    assert!(matches!(narrow, DynamicLayeredMatrix::Narrow(_)));
    assert_eq!(narrow.chunk_size(), 65_536);
    assert_eq!(narrow.get_element(65_534, 1), Some(70_000));

    let wide = convert_to_layered_sparse::<u32, _>(&tall(65_536), 2).unwrap();
    assert!(matches!(wide, DynamicLayeredMatrix::Wide(_)));
    assert_eq!(wide.chunk_size(), <u32 as ColumnIndex>::MAX_CHUNK_SIZE);
    assert_eq!(wide.nnz(), 3);
    assert_eq!(wide.get_element(32_768, 2), Some(300));
    assert_eq!(wide.get_element(65_535, 1), Some(70_000));
    assert_eq!(wide.get_element(0, 0), Some(7));
    assert_eq!(wide.get_element(0, 1), None);
}

#[test]
fn test_convert_sparse_column_major() {
    let mock = MockCounts::new(120, 300, 2);
    let csc = mock.to_csc();
    let layered = convert_to_layered_sparse::<u32, _>(&csc, 3).unwrap();
    assert_same_content(&layered, &csc);
}

#[test]
fn test_convert_dense_inputs() {
    let mock = MockCounts::new(60, 40, 3);
    for row_major in [true, false] {
        let dense = mock.to_dense(row_major);
        let layered = convert_to_layered_sparse::<u32, _>(&dense, 2).unwrap();
        assert_same_content(&layered, &dense);
        assert_eq!(layered.to_dense(row_major).values(), dense.values());
    }
}

#[test]
fn test_thread_count_does_not_change_result() {
    let mock = MockCounts::new(257, 90, 4);
    let csr = mock.to_csr();
    let csc = mock.to_csc();

    let reference: LayeredMatrix<u32, u16> = convert_by_row(&csr, 16, 1).unwrap();
    for threads in [0, 2, 3, 8] {
        let by_row: LayeredMatrix<u32, u16> = convert_by_row(&csr, 16, threads).unwrap();
        let by_col: LayeredMatrix<u32, u16> = convert_by_column(&csc, 16, threads).unwrap();
        assert_eq!(by_row.summary(), reference.summary());
        assert_eq!(by_col.summary(), reference.summary());
        assert_same_content(&by_row, &reference);
        assert_same_content(&by_col, &reference);
    }
}

#[test]
fn test_rows_use_narrowest_layer_per_chunk() {
    let dense = DenseMatrix::from_rows(&[
        vec![1u32, 0, 0, 300],
        vec![0, 70_000, 2, 0],
        vec![0, 0, 0, 0],
    ])
    .unwrap();
    let layered: LayeredMatrix<u32, u8> = convert_by_row(&dense, 2, 1).unwrap();

    assert_eq!(layered.num_chunks(), 2);
    assert_eq!(layered.chunk(0).slot(0).category, Category::U8);
    assert_eq!(layered.chunk(1).slot(0).category, Category::U16);
    assert_eq!(layered.chunk(0).slot(1).category, Category::U32);
    assert_eq!(layered.chunk(1).slot(1).category, Category::U8);
    assert_eq!(layered.layer_rows(0, Category::U8), 2);
    assert_eq!(layered.get_element(1, 1), Some(70_000));
    assert_eq!(layered.get_element(2, 3), None);
}

#[test]
fn test_chunk_size_is_capped_by_index_type() {
    let mock = MockCounts::new(10, 600, 5);
    let csr = mock.to_csr();
    let layered: LayeredMatrix<u32, u8> = convert_by_row(&csr, 100_000, 1).unwrap();
    assert_eq!(layered.chunk_size(), 256);
    assert_eq!(layered.num_chunks(), 3);
    assert_same_content(&layered, &csr);
}

#[test]
fn test_float_values_are_counts() {
    let dense = DenseMatrix::from_rows(&[vec![0.0f64, 2.0], vec![1000.0, 0.0]]).unwrap();
    let layered = convert_to_layered_sparse::<f64, _>(&dense, 1).unwrap();
    assert_eq!(layered.get_element(1, 0), Some(1000.0));
    assert_eq!(layered.summary().nnz_per_layer, [1, 1, 0]);
}

#[test]
fn test_invalid_values_abort() {
    let negative = DenseMatrix::from_rows(&[vec![1i64, -2]]).unwrap();
    assert!(matches!(
        convert_to_layered_sparse::<f64, _>(&negative, 2),
        Err(Error::Layered(LayeredError::NegativeValue))
    ));

    let huge = DenseMatrix::from_columns(&[vec![5_000_000_000i64], vec![1]]).unwrap();
    assert!(matches!(
        convert_to_layered_sparse::<f64, _>(&huge, 1),
        Err(Error::Layered(LayeredError::ValueOutOfRange))
    ));
}

#[test]
fn test_empty_matrix() {
    let dense = DenseMatrix::<u32>::new(0, 0, Vec::new(), true).unwrap();
    let layered = convert_to_layered_sparse::<u32, _>(&dense, 4).unwrap();
    assert_eq!(layered.dimensions(), (0, 0));
    assert_eq!(layered.num_chunks(), 1);
    assert_eq!(layered.nnz(), 0);
}
