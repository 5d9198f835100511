//! Error types for layered matrix operations

/// Errors that can occur while classifying or indexing layered matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayeredError {
    /// Value is negative and cannot be stored in an unsigned layer
    NegativeValue,
    /// Value does not fit in the widest (u32) layer
    ValueOutOfRange,
    /// Chunk size of zero was requested
    NonPositiveChunkSize,
    /// Row or column index out of bounds
    IndexOutOfBounds,
    /// Array lengths or dimensions disagree
    DimensionMismatch,
    /// Invalid range or pointer layout
    InvalidRange,
    /// The same index appears twice within a row or column
    DuplicateIndex,
}

impl LayeredError {
    /// Get the category for this error type
    pub const fn category(&self) -> ErrorCategory {
        match self {
            LayeredError::NegativeValue | LayeredError::ValueOutOfRange => ErrorCategory::Value,
            LayeredError::NonPositiveChunkSize => ErrorCategory::Configuration,
            LayeredError::IndexOutOfBounds
            | LayeredError::DimensionMismatch
            | LayeredError::InvalidRange
            | LayeredError::DuplicateIndex => ErrorCategory::Structure,
        }
    }
}

/// Broad classification of layered errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A stored value was unrepresentable
    Value,
    /// A parameter was invalid
    Configuration,
    /// Matrix shape or layout was inconsistent
    Structure,
}

impl core::fmt::Display for LayeredError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            LayeredError::NegativeValue => "values should not be negative",
            LayeredError::ValueOutOfRange => "value is outside of the range of a 32-bit unsigned integer",
            LayeredError::NonPositiveChunkSize => "chunk size should be positive",
            LayeredError::IndexOutOfBounds => "index out of bounds",
            LayeredError::DimensionMismatch => "inconsistent dimensions",
            LayeredError::InvalidRange => "invalid range",
            LayeredError::DuplicateIndex => "duplicate index within a row or column",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for LayeredError {}

/// Result type for layered matrix operations
pub type Result<T> = core::result::Result<T, LayeredError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_messages() {
        assert!(LayeredError::NegativeValue.to_string().contains("negative"));
        assert!(LayeredError::ValueOutOfRange
            .to_string()
            .contains("outside of the range"));
        assert!(LayeredError::NonPositiveChunkSize
            .to_string()
            .contains("should be positive"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(LayeredError::NegativeValue.category(), ErrorCategory::Value);
        assert_eq!(
            LayeredError::NonPositiveChunkSize.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            LayeredError::DimensionMismatch.category(),
            ErrorCategory::Structure
        );
        assert_eq!(LayeredError::DuplicateIndex.category(), ErrorCategory::Structure);
    }
}
