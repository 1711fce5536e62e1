//! Request validation ahead of the engine.
//!
//! The engine stops at the first precondition violation. The validator
//! reports every violation at once, plus advisory warnings, so a caller can
//! show the whole list to the person who typed the request.

use std::fmt;

use rust_decimal::Decimal;

use crate::error::InvalidInputError;
use crate::types::AllocationRequest;

/// Advisory condition: the request is valid but probably not what was meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Capacity is zero; nothing will be distributed
    ZeroCapacity,
    /// No claimants; the result will be empty
    NoClaimants,
    /// Every weight is zero; capacity will be split equally
    AllWeightsZero,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "capacity is zero - nothing will be distributed"),
            Self::NoClaimants => write!(f, "no claimants - the result will be empty"),
            Self::AllWeightsZero => {
                write!(f, "all claimants have zero weight - capacity will be split equally")
            }
        }
    }
}

/// Every problem found in a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Precondition violations; any of these blocks allocation
    pub errors: Vec<InvalidInputError>,

    /// Advisory warnings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Check if the request may be allocated
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error, if any
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, InvalidInputError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.warnings),
        }
    }
}

/// Validate a request
///
/// # Example
///
/// ```
/// use prorata_allocator::types::{AllocationRequest, Claimant};
/// use prorata_allocator::validation::{validate, ValidationWarning};
/// use rust_decimal::Decimal;
///
/// let request = AllocationRequest::new(
///     Decimal::ZERO,
///     vec![Claimant::new("A", Decimal::from(10), Decimal::ZERO)],
/// );
///
/// let report = validate(&request);
/// assert!(report.is_valid());
/// assert_eq!(
///     report.warnings,
///     vec![ValidationWarning::ZeroCapacity, ValidationWarning::AllWeightsZero]
/// );
/// ```
pub fn validate(request: &AllocationRequest) -> ValidationReport {
    let errors = request.violations();
    let mut warnings = Vec::new();

    if request.capacity.is_zero() {
        warnings.push(ValidationWarning::ZeroCapacity);
    }
    if request.is_empty() {
        warnings.push(ValidationWarning::NoClaimants);
    } else if request.claimants.iter().all(|c| c.weight == Decimal::ZERO) {
        warnings.push(ValidationWarning::AllWeightsZero);
    }

    ValidationReport { errors, warnings }
}

// ============================================================================
// Unit Tests
// ============================================================================
