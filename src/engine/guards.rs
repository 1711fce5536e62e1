//! Short-circuit branches that run before the distributor.
//!
//! - **Full satisfaction**: zero capacity, no claimants, or enough capacity
//!   for every request. These return amounts directly with no rounding.
//! - **Equal-weight fallback**: every weight is zero, so capacity is split
//!   evenly in a single division.

use rust_decimal::Decimal;

use crate::engine::state::AllocationState;
use crate::types::amount::format_amount;
use crate::types::{AllocationRequest, Allocations};

/// Which guard fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    /// Capacity is zero
    NothingToDistribute,
    /// Request has no claimants
    NoClaimants,
    /// Capacity covers every request
    FullySatisfied,
}

/// A finished result produced without running the distributor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Which guard fired
    pub kind: ShortcutKind,

    /// Final allocations
    pub allocations: Allocations,

    /// Trace summary line
    pub summary: String,
}

/// Full-satisfaction check
///
/// # Returns
///
/// * `Some(Shortcut)` - Capacity is zero, there are no claimants, or
///   capacity covers the total requested amount
/// * `None` - Capacity is scarce; allocation must be prorated
///
/// # Example
///
/// ```
/// use prorata_allocator::engine::guards::{full_satisfaction, ShortcutKind};
/// use prorata_allocator::types::{AllocationRequest, Claimant};
/// use rust_decimal::Decimal;
///
/// let request = AllocationRequest::new(
///     Decimal::from(200),
///     vec![
///         Claimant::new("A", Decimal::from(100), Decimal::from(50)),
///         Claimant::new("B", Decimal::from(100), Decimal::from(50)),
///     ],
/// );
///
/// let shortcut = full_satisfaction(&request).unwrap();
/// assert_eq!(shortcut.kind, ShortcutKind::FullySatisfied);
/// assert_eq!(shortcut.allocations.get("A"), Some(Decimal::from(100)));
/// ```
pub fn full_satisfaction(request: &AllocationRequest) -> Option<Shortcut> {
    if request.capacity <= Decimal::ZERO {
        return Some(Shortcut {
            kind: ShortcutKind::NothingToDistribute,
            allocations: uniform(request, |_| Decimal::ZERO),
            summary: format!(
                "No capacity to distribute (capacity = {}).",
                format_amount(request.capacity)
            ),
        });
    }

    if request.is_empty() {
        return Some(Shortcut {
            kind: ShortcutKind::NoClaimants,
            allocations: Allocations::new(),
            summary: "No claimants provided.".to_string(),
        });
    }

    let total_requested = request.total_requested();
    if request.capacity >= total_requested {
        return Some(Shortcut {
            kind: ShortcutKind::FullySatisfied,
            allocations: uniform(request, |requested| requested),
            summary: format!(
                "Capacity ({}) >= total requested ({}). Every claimant receives its full request.",
                format_amount(request.capacity),
                format_amount(total_requested)
            ),
        });
    }

    None
}

/// Equal-weight fallback
///
/// Applies only when every claimant's weight is zero. Each claimant gets
/// `min(capacity / n, requested)`. Capacity freed by claimants whose request
/// is below the equal share is not handed to anyone else.
///
/// # Returns
///
/// * `Some(AllocationState)` - All weights are zero (and there is at least one claimant)
/// * `None` - Some claimant has a positive weight
pub fn equal_weight_fallback(request: &AllocationRequest) -> Option<AllocationState> {
    if request.is_empty() || !request.total_weight().is_zero() {
        return None;
    }

    let mut state = AllocationState::new(request.len());
    let everyone: Vec<usize> = (0..request.len()).collect();
    split_equally(request, &mut state, &everyone, request.capacity);
    Some(state)
}

/// Split `amount` evenly over `indices`, bounding each share by the request.
///
/// Claimants whose request is at or below the share are marked capped.
/// Nothing is redistributed.
///
/// # Returns
///
/// The unbounded equal share
pub fn split_equally(
    request: &AllocationRequest,
    state: &mut AllocationState,
    indices: &[usize],
    amount: Decimal,
) -> Decimal {
    if indices.is_empty() {
        return Decimal::ZERO;
    }

    let share = amount / Decimal::from(indices.len());
    for &index in indices {
        let requested = request.claimants[index].requested;
        if share >= requested {
            state.cap(index, requested);
        } else {
            state.set_tentative(index, share);
        }
    }
    share
}

fn uniform(request: &AllocationRequest, amount: impl Fn(Decimal) -> Decimal) -> Allocations {
    let mut allocations = Allocations::with_capacity(request.len());
    for claimant in &request.claimants {
        allocations.push(claimant.name.clone(), amount(claimant.requested));
    }
    allocations
}

// ============================================================================
// Unit Tests
// ============================================================================
