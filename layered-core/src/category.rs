//! Storage layer classification
//!
//! Every row of a column chunk is stored in the narrowest unsigned layer
//! that can hold its largest value. This module maps values to layers.

use crate::error::{LayeredError, Result};
use crate::traits::MatrixElement;

/// Storage layer for a row within a column chunk
///
/// Variants are ordered by width so that `max` over a row's values
/// yields the layer the whole row must live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Category {
    /// Values up to 255
    #[default]
    U8 = 0,
    /// Values up to 65535
    U16 = 1,
    /// Values up to 4294967295
    U32 = 2,
}

impl Category {
    /// All layers, narrowest first
    pub const ALL: [Category; 3] = [Category::U8, Category::U16, Category::U32];

    /// Largest value representable in this layer
    pub const fn max_value(&self) -> u32 {
        match self {
            Category::U8 => u8::MAX as u32,
            Category::U16 => u16::MAX as u32,
            Category::U32 => u32::MAX,
        }
    }

    /// Size in bytes of one stored value
    pub const fn byte_width(&self) -> usize {
        match self {
            Category::U8 => 1,
            Category::U16 => 2,
            Category::U32 => 4,
        }
    }

    /// Narrowest layer holding `value`
    pub const fn of(value: u32) -> Category {
        if value <= u8::MAX as u32 {
            Category::U8
        } else if value <= u16::MAX as u32 {
            Category::U16
        } else {
            Category::U32
        }
    }

    /// Position of this layer in [`Category::ALL`]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Category::U8 => write!(f, "u8"),
            Category::U16 => write!(f, "u16"),
            Category::U32 => write!(f, "u32"),
        }
    }
}

/// Classify a non-negative count into its storage layer
pub const fn categorize_count(count: u64) -> Result<Category> {
    if count > u32::MAX as u64 {
        return Err(LayeredError::ValueOutOfRange);
    }
    Ok(Category::of(count as u32))
}

/// Classify a matrix value into its storage layer
///
/// Fails for negative values and for values beyond `u32::MAX`.
pub fn categorize<T: MatrixElement>(value: T) -> Result<Category> {
    categorize_count(value.to_count()?)
}
