//! Error types for the allocation engine and its I/O helpers.
//!
//! The engine itself only ever fails with [`InvalidInputError`]: a request that
//! violates a precondition is rejected before any arithmetic runs. Residual
//! rounding dust is not an error; it is reported on the receipt and trace.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// A request value that the engine refuses to compute with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    /// Capacity below zero
    #[error("capacity cannot be negative: {0}")]
    NegativeCapacity(Decimal),

    /// Requested amount below zero
    #[error("{name}: requested amount cannot be negative: {value}")]
    NegativeRequested { name: String, value: Decimal },

    /// Weight below zero
    #[error("{name}: weight cannot be negative: {value}")]
    NegativeWeight { name: String, value: Decimal },

    /// NaN or infinite input (only reachable through f64 entry points)
    #[error("{field} must be a finite number")]
    NonFinite { field: String },

    /// Claimant with an empty or whitespace-only name
    #[error("claimant {index}: name is required")]
    EmptyName { index: usize },

    /// Two claimants share a name
    #[error("duplicate claimant name: {0}")]
    DuplicateName(String),

    /// Amount text that does not parse as a decimal
    #[error("{field}: '{text}' is not a valid amount")]
    UnparsableAmount { field: String, text: String },

    /// A sum over the request does not fit in a `Decimal`
    #[error("{field} overflows the decimal range")]
    Overflow { field: String },
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    /// Precondition violation
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Fixture file missing from its directory
    #[error("fixture not found: {0}")]
    FixtureNotFound(String),

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encode failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_messages() {
        let err = InvalidInputError::NegativeRequested {
            name: "A".to_string(),
            value: Decimal::new(-5, 0),
        };
        assert_eq!(err.to_string(), "A: requested amount cannot be negative: -5");

        let err = InvalidInputError::EmptyName { index: 2 };
        assert_eq!(err.to_string(), "claimant 2: name is required");
    }

    #[test]
    fn test_overflow_message() {
        let err = InvalidInputError::Overflow {
            field: "total weight".to_string(),
        };
        assert_eq!(err.to_string(), "total weight overflows the decimal range");
    }

    #[test]
    fn test_invalid_input_converts_to_crate_error() {
        let err: Error = InvalidInputError::DuplicateName("B".to_string()).into();
        assert!(matches!(err, Error::InvalidInput(InvalidInputError::DuplicateName(_))));
        assert_eq!(err.to_string(), "invalid input: duplicate claimant name: B");
    }
}
