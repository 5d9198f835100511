//! Matrix element and column index type constraints
//!
//! This module defines the traits that constrain what types can be
//! read from or reported by matrices, and what types can hold the
//! column offsets stored inside a column chunk.

use crate::error::{LayeredError, Result};

/// Trait for types that can be stored as matrix elements
///
/// All matrix element types must be:
/// - Copy: Can be copied without allocation
/// - PartialEq: Can be compared for equality (zero detection)
/// - Send + Sync: Can be shared with worker threads
pub trait MatrixElement: Copy + PartialEq + Send + Sync + core::fmt::Debug + 'static {
    /// The additive identity
    fn zero() -> Self;

    /// Whether this value is a structural zero
    fn is_zero(self) -> bool {
        self == Self::zero()
    }

    /// Interpret this value as a non-negative integer count
    ///
    /// Negative values fail with [`LayeredError::NegativeValue`]; values
    /// that are not finite or exceed `u64::MAX` fail with
    /// [`LayeredError::ValueOutOfRange`]. Fractional parts are truncated.
    fn to_count(self) -> Result<u64>;

    /// Construct from a stored count, saturating at `Self`'s maximum
    fn from_count(count: u32) -> Self;

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self;

    /// Convert to f64 for generic operations
    fn to_f64(self) -> f64;
}

macro_rules! unsigned_element {
    ($($t:ty),*) => {
        $(
            impl MatrixElement for $t {
                fn zero() -> Self {
                    0
                }

                fn to_count(self) -> Result<u64> {
                    Ok(self as u64)
                }

                fn from_count(count: u32) -> Self {
                    if (count as u64) > (<$t>::MAX as u64) {
                        <$t>::MAX
                    } else {
                        count as $t
                    }
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! signed_element {
    ($($t:ty),*) => {
        $(
            impl MatrixElement for $t {
                fn zero() -> Self {
                    0
                }

                fn to_count(self) -> Result<u64> {
                    if self < 0 {
                        return Err(LayeredError::NegativeValue);
                    }
                    Ok(self as u64)
                }

                fn from_count(count: u32) -> Self {
                    if (count as i64) > (<$t>::MAX as i64) {
                        <$t>::MAX
                    } else {
                        count as $t
                    }
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

unsigned_element!(u8, u16, u32, u64, usize);
signed_element!(i32, i64);

/// Shared float classification; 2^64 is the first value past `u64::MAX`
fn float_to_count(value: f64) -> Result<u64> {
    if value.is_nan() {
        return Err(LayeredError::ValueOutOfRange);
    }
    if value < 0.0 {
        return Err(LayeredError::NegativeValue);
    }
    if value >= 18_446_744_073_709_551_616.0 {
        return Err(LayeredError::ValueOutOfRange);
    }
    Ok(value as u64)
}

impl MatrixElement for f32 {
    fn zero() -> Self {
        0.0
    }

    fn to_count(self) -> Result<u64> {
        float_to_count(self as f64)
    }

    fn from_count(count: u32) -> Self {
        count as f32
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl MatrixElement for f64 {
    fn zero() -> Self {
        0.0
    }

    fn to_count(self) -> Result<u64> {
        float_to_count(self)
    }

    fn from_count(count: u32) -> Self {
        count as f64
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Trait for unsigned types holding stored secondary indices
///
/// Inside a layered matrix these are column offsets within a chunk; a
/// chunk never spans more columns than the index type can address, so
/// the largest chunk is `MAX + 1` columns wide.
pub trait ColumnIndex: Copy + Ord + Send + Sync + core::fmt::Debug + 'static {
    /// Largest number of columns addressable by this type
    const MAX_CHUNK_SIZE: usize;

    /// Narrow an in-chunk offset; callers guarantee `value < MAX_CHUNK_SIZE`
    fn from_usize(value: usize) -> Self;

    /// Widen back to an offset
    fn to_usize(self) -> usize;
}

macro_rules! column_index {
    ($($t:ty),*) => {
        $(
            impl ColumnIndex for $t {
                const MAX_CHUNK_SIZE: usize = (<$t>::MAX as usize).saturating_add(1);

                fn from_usize(value: usize) -> Self {
                    value as $t
                }

                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

column_index!(u8, u16, u32, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_counts() {
        assert_eq!(7u8.to_count(), Ok(7));
        assert_eq!(70_000u32.to_count(), Ok(70_000));
        assert_eq!(5i32.to_count(), Ok(5));
        assert_eq!((-1i32).to_count(), Err(LayeredError::NegativeValue));
        assert_eq!((-3i64).to_count(), Err(LayeredError::NegativeValue));
    }

    #[test]
    fn test_float_counts() {
        assert_eq!(10.0f64.to_count(), Ok(10));
        assert_eq!(2.9f64.to_count(), Ok(2));
        assert_eq!((-0.5f32).to_count(), Err(LayeredError::NegativeValue));
        assert_eq!(f64::NAN.to_count(), Err(LayeredError::ValueOutOfRange));
        assert_eq!(f64::INFINITY.to_count(), Err(LayeredError::ValueOutOfRange));
        assert_eq!(1e10f64.to_count(), Ok(10_000_000_000));
    }

    #[test]
    fn test_from_count_saturates() {
        assert_eq!(u8::from_count(300), u8::MAX);
        assert_eq!(u16::from_count(300), 300);
        assert_eq!(i32::from_count(u32::MAX), i32::MAX);
        assert_eq!(f64::from_count(65_536), 65_536.0);
    }

    #[test]
    fn test_column_index_limits() {
        assert_eq!(<u8 as ColumnIndex>::MAX_CHUNK_SIZE, 256);
        assert_eq!(<u16 as ColumnIndex>::MAX_CHUNK_SIZE, 65_536);
        assert_eq!(<u16 as ColumnIndex>::from_usize(65_535).to_usize(), 65_535);
    }
}
