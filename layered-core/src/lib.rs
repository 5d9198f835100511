#![no_std]

//! Layered Core - Layered Sparse Matrix Definitions
//!
//! This crate provides the core definitions and traits for layered sparse
//! integer matrices: value classification into storage layers, column chunk
//! arithmetic and the extraction interface shared by every matrix type.

extern crate alloc;

pub mod category;
pub mod chunk;
pub mod error;
pub mod traits;

pub use category::*;
pub use chunk::*;
pub use error::*;
pub use traits::*;
