//! Core error types

use thiserror::Error;

/// Errors raised when constructing generators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Interval period was zero, negative, or NaN
    #[error("Interval period must be positive, got {0}ms")]
    InvalidPeriod(f64),

    /// A sequence cursor needs something to point at
    #[error("Sequence requires at least one item")]
    EmptySequence,
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
