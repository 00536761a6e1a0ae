//! Error types for chain construction.
//!
//! This module provides `ChainError`, the structured error type for
//! direct construction of a discretised cost chain.

use thiserror::Error;

/// Errors that can occur while constructing a [`Chain`](crate::chain::Chain).
///
/// Provides structured error handling with diagnostic information
/// naming the offending column and indices.
///
/// # Variants
///
/// - `EmptyChain`: No stages supplied
/// - `LengthMismatch`: A measurement column has the wrong length
/// - `NegativeCost`: A forward or backward time is negative
///
/// # Examples
///
/// ```
/// use remat_core::error::ChainError;
///
/// let err = ChainError::length_mismatch("x_size", 3, 2);
/// assert!(format!("{}", err).contains("x_size"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The chain has no stages.
    #[error("Chain must contain at least one stage")]
    EmptyChain,

    /// A measurement column does not match the stage count.
    #[error("Length mismatch for {column}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Name of the offending measurement column
        column: &'static str,
        /// Expected number of entries
        expected: usize,
        /// Number of entries provided
        actual: usize,
    },

    /// A compute cost is negative.
    #[error("Negative {column} cost at stage {stage}")]
    NegativeCost {
        /// Name of the offending cost column
        column: &'static str,
        /// Stage index carrying the negative cost
        stage: usize,
    },
}

impl ChainError {
    /// Create a length mismatch error.
    pub fn length_mismatch(column: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            column,
            expected,
            actual,
        }
    }

    /// Create a negative cost error.
    pub fn negative_cost(column: &'static str, stage: usize) -> Self {
        Self::NegativeCost { column, stage }
    }

    /// Check if this is an empty chain error.
    pub fn is_empty_chain(&self) -> bool {
        matches!(self, Self::EmptyChain)
    }

    /// Check if this is a length mismatch error.
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self, Self::LengthMismatch { .. })
    }

    /// Check if this is a negative cost error.
    pub fn is_negative_cost(&self) -> bool {
        matches!(self, Self::NegativeCost { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_display() {
        let err = ChainError::EmptyChain;
        assert!(format!("{}", err).contains("at least one stage"));
        assert!(err.is_empty_chain());
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = ChainError::length_mismatch("bwd_time", 4, 3);
        let display = format!("{}", err);
        assert!(display.contains("bwd_time"));
        assert!(display.contains("4"));
        assert!(display.contains("3"));
        assert!(err.is_length_mismatch());
        assert!(!err.is_empty_chain());
    }

    #[test]
    fn test_negative_cost_display() {
        let err = ChainError::negative_cost("fwd_time", 2);
        let display = format!("{}", err);
        assert!(display.contains("fwd_time"));
        assert!(display.contains("2"));
        assert!(err.is_negative_cost());
    }

    #[test]
    fn test_clone_and_equality() {
        let err1 = ChainError::length_mismatch("x_size", 5, 4);
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ChainError::EmptyChain;
        let _: &dyn std::error::Error = &err;
    }
}
