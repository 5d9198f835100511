//! Abstract interfaces for layered matrices
//!
//! This module defines the element, column index and matrix extraction
//! traits used throughout the layered ecosystem.

pub mod element;
pub mod matrix;

pub use element::{ColumnIndex, MatrixElement};
pub use matrix::{Matrix, SparseMatrix};
