//! Rounding and dust reconciliation.
//!
//! ## Rounding
//!
//! Exact shares are rounded to the cent, halves away from zero. A rounded
//! amount is never allowed above the claimant's request (truncated to the
//! cent), so `allocated ≤ requested` survives rounding.
//!
//! ## Dust
//!
//! `dust = round(capacity) − Σ rounded`. The sweep walks claimants **once**,
//! last to first, moving one cent per eligible claimant while at least half a
//! cent of dust remains:
//!
//! - positive dust: claimants still below their request gain a cent
//! - negative dust: claimants holding a positive amount give up a cent
//!
//! Whatever is left after the single sweep is reported as residual.
//!
//! ## Example
//!
//! ```
//! use prorata_allocator::engine::reconciler::sweep_dust;
//! use prorata_allocator::types::{AllocationRequest, Claimant};
//! use rust_decimal::Decimal;
//!
//! let request = AllocationRequest::new(
//!     Decimal::from(10),
//!     vec![
//!         Claimant::new("A", Decimal::from(10), Decimal::ONE),
//!         Claimant::new("B", Decimal::from(10), Decimal::ONE),
//!         Claimant::new("C", Decimal::from(10), Decimal::ONE),
//!     ],
//! );
//! let mut amounts = vec![Decimal::new(333, 2); 3];
//!
//! let sweep = sweep_dust(&request, &mut amounts, Decimal::new(1, 2));
//! assert_eq!(amounts[2], Decimal::new(334, 2));
//! assert_eq!(sweep.applied_cents, 1);
//! assert!(sweep.residual.is_zero());
//! ```

use rust_decimal::Decimal;

use crate::engine::state::AllocationState;
use crate::types::amount::{round_to_cents, truncate_to_cents, CENT, HALF_CENT};
use crate::types::{AllocationRequest, Allocations};

/// Result of a dust sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DustSweep {
    /// Cents moved
    pub applied_cents: u64,

    /// Signed dust left after the sweep (positive: under-allocated)
    pub residual: Decimal,
}

/// Rounded, reconciled allocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Final allocations in claimant order
    pub allocations: Allocations,

    /// Dust measured before the sweep
    pub dust: Decimal,

    /// Outcome of the sweep
    pub sweep: DustSweep,
}

/// Round every claimant's state to the cent
///
/// # Returns
///
/// Rounded amounts, indexed like the request's claimants
pub fn round_allocations(request: &AllocationRequest, state: &AllocationState) -> Vec<Decimal> {
    request
        .claimants
        .iter()
        .zip(state.slots())
        .map(|(claimant, slot)| {
            round_to_cents(slot.allocated).min(truncate_to_cents(claimant.requested))
        })
        .collect()
}

/// `round(capacity) − Σ amounts`
pub fn measure_dust(capacity: Decimal, amounts: &[Decimal]) -> Decimal {
    let total: Decimal = amounts.iter().sum();
    round_to_cents(capacity) - total
}

/// Single reverse sweep distributing `dust` one cent at a time
///
/// # Arguments
///
/// * `request` - Source of requested amounts (the upper bounds)
/// * `amounts` - Rounded amounts, updated in place
/// * `dust` - Signed dust to place
pub fn sweep_dust(request: &AllocationRequest, amounts: &mut [Decimal], dust: Decimal) -> DustSweep {
    let increment = if dust > Decimal::ZERO { CENT } else { -CENT };
    let mut remaining = dust.abs();
    let mut applied_cents = 0u64;
    let mut index = amounts.len();

    while index > 0 && remaining >= HALF_CENT {
        index -= 1;
        let amount = amounts[index];

        let eligible = if dust > Decimal::ZERO {
            amount
                .checked_add(CENT)
                .is_some_and(|next| next <= truncate_to_cents(request.claimants[index].requested))
        } else {
            amount > Decimal::ZERO
        };

        if eligible {
            amounts[index] = amount + increment;
            remaining -= CENT;
            applied_cents += 1;
        }
    }

    let residual = if remaining < HALF_CENT {
        Decimal::ZERO
    } else if dust > Decimal::ZERO {
        remaining
    } else {
        -remaining
    };

    DustSweep {
        applied_cents,
        residual,
    }
}

/// Round, then sweep dust
pub fn reconcile(request: &AllocationRequest, state: &AllocationState) -> Reconciliation {
    let mut amounts = round_allocations(request, state);
    let dust = measure_dust(request.capacity, &amounts);

    let sweep = if dust.abs() >= HALF_CENT {
        sweep_dust(request, &mut amounts, dust)
    } else {
        DustSweep::default()
    };

    Reconciliation {
        allocations: collect(request, &amounts),
        dust,
        sweep,
    }
}

/// Round without sweeping
///
/// Used by the equal-weight fallback, which never redistributes. Any
/// difference from the rounded capacity is reported as residual.
pub fn round_only(request: &AllocationRequest, state: &AllocationState) -> Reconciliation {
    let amounts = round_allocations(request, state);
    let dust = measure_dust(request.capacity, &amounts);

    Reconciliation {
        allocations: collect(request, &amounts),
        dust,
        sweep: DustSweep {
            applied_cents: 0,
            residual: dust,
        },
    }
}

fn collect(request: &AllocationRequest, amounts: &[Decimal]) -> Allocations {
    let mut allocations = Allocations::with_capacity(amounts.len());
    for (claimant, amount) in request.claimants.iter().zip(amounts) {
        allocations.push(claimant.name.clone(), *amount);
    }
    allocations
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Claimant;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn request(capacity: &str, claimants: &[(&str, &str)]) -> AllocationRequest {
        AllocationRequest::new(
            dec(capacity),
            claimants
                .iter()
                .map(|(name, requested)| Claimant::new(*name, dec(requested), Decimal::ONE))
                .collect(),
        )
    }

    fn state_with(amounts: &[&str]) -> AllocationState {
        let mut state = AllocationState::new(amounts.len());
        for (i, amount) in amounts.iter().enumerate() {
            state.set_tentative(i, dec(amount));
        }
        state
    }

    #[test]
    fn test_positive_dust_goes_to_last_claimant() {
        let req = request("10", &[("A", "10"), ("B", "10"), ("C", "10")]);
        let state = state_with(&["3.3333", "3.3333", "3.3334"]);

        let result = reconcile(&req, &state);

        assert_eq!(result.dust, dec("0.01"));
        assert_eq!(result.allocations.get("A"), Some(dec("3.33")));
        assert_eq!(result.allocations.get("B"), Some(dec("3.33")));
        assert_eq!(result.allocations.get("C"), Some(dec("3.34")));
        assert_eq!(result.allocations.total(), dec("10.00"));
        assert_eq!(result.sweep.applied_cents, 1);
        assert!(result.sweep.residual.is_zero());
    }

    #[test]
    fn test_negative_dust_taken_from_last_claimant() {
        let req = request("2", &[("A", "10"), ("B", "10"), ("C", "10")]);
        let state = state_with(&["0.6666", "0.6667", "0.6667"]);

        let result = reconcile(&req, &state);

        assert_eq!(result.dust, dec("-0.01"));
        assert_eq!(result.allocations.get("A"), Some(dec("0.67")));
        assert_eq!(result.allocations.get("B"), Some(dec("0.67")));
        assert_eq!(result.allocations.get("C"), Some(dec("0.66")));
        assert_eq!(result.allocations.total(), dec("2.00"));
    }

    #[test]
    fn test_sweep_skips_claimants_at_their_request() {
        let req = request("10", &[("A", "5"), ("B", "3.33"), ("C", "3.33")]);
        let mut amounts = vec![dec("3.33"), dec("3.33"), dec("3.33")];

        let sweep = sweep_dust(&req, &mut amounts, dec("0.01"));

        assert_eq!(amounts, vec![dec("3.34"), dec("3.33"), dec("3.33")]);
        assert_eq!(sweep.applied_cents, 1);
    }

    #[test]
    fn test_negative_sweep_skips_zero_amounts() {
        let req = request("1", &[("A", "5"), ("B", "5")]);
        let mut amounts = vec![dec("1.01"), dec("0.00")];

        let sweep = sweep_dust(&req, &mut amounts, dec("-0.01"));

        assert_eq!(amounts, vec![dec("1.00"), dec("0.00")]);
        assert!(sweep.residual.is_zero());
    }

    #[test]
    fn test_sweep_is_single_pass() {
        // Three cents of dust, only one eligible claimant
        let req = request("10", &[("A", "3"), ("B", "3"), ("C", "5")]);
        let mut amounts = vec![dec("3"), dec("3"), dec("3.97")];

        let sweep = sweep_dust(&req, &mut amounts, dec("0.03"));

        assert_eq!(amounts[2], dec("3.98"));
        assert_eq!(sweep.applied_cents, 1);
        assert_eq!(sweep.residual, dec("0.02"));
    }

    #[test]
    fn test_sweep_stops_once_dust_is_placed() {
        let req = request("10", &[("A", "10"), ("B", "10"), ("C", "10")]);
        let mut amounts = vec![dec("3.32"), dec("3.33"), dec("3.33")];

        let sweep = sweep_dust(&req, &mut amounts, dec("0.02"));

        // A is never reached
        assert_eq!(amounts, vec![dec("3.32"), dec("3.34"), dec("3.34")]);
        assert_eq!(sweep.applied_cents, 2);
    }

    #[test]
    fn test_rounding_respects_sub_cent_requests() {
        let req = request("100", &[("A", "3.335"), ("B", "200")]);
        let mut state = AllocationState::new(2);
        state.cap(0, dec("3.335"));
        state.set_tentative(1, dec("96.665"));

        let amounts = round_allocations(&req, &state);
        assert_eq!(amounts, vec![dec("3.33"), dec("96.67")]);
    }

    #[test]
    fn test_no_dust_no_sweep() {
        let req = request("100", &[("A", "150"), ("B", "50")]);
        let state = state_with(&["80", "20"]);

        let result = reconcile(&req, &state);
        assert!(result.dust.is_zero());
        assert_eq!(result.sweep, DustSweep::default());
    }

    #[test]
    fn test_round_only_reports_shortfall() {
        let req = request("50", &[("A", "10"), ("B", "100")]);
        let state = state_with(&["10", "25"]);

        let result = round_only(&req, &state);
        assert_eq!(result.dust, dec("15"));
        assert_eq!(result.sweep.applied_cents, 0);
        assert_eq!(result.sweep.residual, dec("15"));
        assert_eq!(result.allocations.total(), dec("35"));
    }
}
