//! Claimants and the allocation request.
//!
//! ## Wire Format
//!
//! Requests deserialize from JSON. Both the native field names and the
//! investor-style names used by older fixture files are accepted:
//!
//! | Native      | Alias              |
//! |-------------|--------------------|
//! | `capacity`  | `allocation_amount`|
//! | `claimants` | `investor_amounts` |
//! | `requested` | `requested_amount` |
//! | `weight`    | `average_amount`   |
//!
//! Amounts may be JSON numbers or strings.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;
use crate::types::amount::decimal_from_f64;

/// A party with an upper bound and a proportional weight.
///
/// ## Example
///
/// ```
/// use prorata_allocator::types::Claimant;
/// use rust_decimal::Decimal;
///
/// let claimant = Claimant::new("A", Decimal::new(150, 0), Decimal::new(100, 0));
/// assert_eq!(claimant.name, "A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimant {
    /// Unique identifier within the request
    pub name: String,

    /// Hard upper bound on the allocation
    #[serde(alias = "requested_amount")]
    pub requested: Decimal,

    /// Proportional-share basis (e.g. a historical average)
    #[serde(alias = "average_amount")]
    pub weight: Decimal,
}

impl Claimant {
    /// Create a new claimant
    pub fn new(name: impl Into<String>, requested: Decimal, weight: Decimal) -> Self {
        Self {
            name: name.into(),
            requested,
            weight,
        }
    }

    /// Create a claimant from floating-point inputs
    ///
    /// NaN and infinities are rejected here so they never reach the engine.
    pub fn from_f64(
        name: impl Into<String>,
        requested: f64,
        weight: f64,
    ) -> Result<Self, InvalidInputError> {
        let name = name.into();
        let requested = decimal_from_f64(&format!("{name}: requested amount"), requested)?;
        let weight = decimal_from_f64(&format!("{name}: weight"), weight)?;
        Ok(Self::new(name, requested, weight))
    }
}

/// The capacity to distribute and the ordered claimants competing for it.
///
/// Claimant order is significant: it decides which claimants receive
/// rounding pennies. It is never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Total distributable amount
    #[serde(alias = "allocation_amount")]
    pub capacity: Decimal,

    /// Claimants in input order
    #[serde(alias = "investor_amounts")]
    pub claimants: Vec<Claimant>,
}

impl AllocationRequest {
    /// Create a new request
    pub fn new(capacity: Decimal, claimants: Vec<Claimant>) -> Self {
        Self { capacity, claimants }
    }

    /// Create a request from a floating-point capacity
    pub fn from_f64(capacity: f64, claimants: Vec<Claimant>) -> Result<Self, InvalidInputError> {
        Ok(Self::new(decimal_from_f64("capacity", capacity)?, claimants))
    }

    /// Sum of all requested amounts, saturating at `Decimal::MAX`
    pub fn total_requested(&self) -> Decimal {
        self.claimants
            .iter()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.requested))
    }

    /// Sum of all weights, saturating at `Decimal::MAX`
    pub fn total_weight(&self) -> Decimal {
        self.claimants
            .iter()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.weight))
    }

    /// Sum of all requested amounts
    ///
    /// # Returns
    ///
    /// * `Some(Decimal)` - The exact total
    /// * `None` - If the total does not fit in a `Decimal`
    pub fn checked_total_requested(&self) -> Option<Decimal> {
        self.claimants
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(c.requested))
    }

    /// Sum of all weights, `None` on overflow
    pub fn checked_total_weight(&self) -> Option<Decimal> {
        self.claimants
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(c.weight))
    }

    /// Number of claimants
    #[inline]
    pub fn len(&self) -> usize {
        self.claimants.len()
    }

    /// Check if there are no claimants
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.claimants.is_empty()
    }

    /// Every precondition violation in the request, in input order
    pub fn violations(&self) -> Vec<InvalidInputError> {
        let mut violations = Vec::new();

        if self.capacity < Decimal::ZERO {
            violations.push(InvalidInputError::NegativeCapacity(self.capacity));
        }

        let mut seen = HashSet::with_capacity(self.claimants.len());
        for (index, claimant) in self.claimants.iter().enumerate() {
            if claimant.name.trim().is_empty() {
                violations.push(InvalidInputError::EmptyName { index });
            } else if !seen.insert(claimant.name.as_str()) {
                violations.push(InvalidInputError::DuplicateName(claimant.name.clone()));
            }

            if claimant.requested < Decimal::ZERO {
                violations.push(InvalidInputError::NegativeRequested {
                    name: claimant.name.clone(),
                    value: claimant.requested,
                });
            }
            if claimant.weight < Decimal::ZERO {
                violations.push(InvalidInputError::NegativeWeight {
                    name: claimant.name.clone(),
                    value: claimant.weight,
                });
            }
        }

        if self.checked_total_requested().is_none() {
            violations.push(InvalidInputError::Overflow {
                field: "total requested".to_string(),
            });
        }
        if self.checked_total_weight().is_none() {
            violations.push(InvalidInputError::Overflow {
                field: "total weight".to_string(),
            });
        }

        violations
    }

    /// Fail on the first precondition violation
    pub fn check_preconditions(&self) -> Result<(), InvalidInputError> {
        match self.violations().into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
