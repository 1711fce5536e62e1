//! Iterative capped pro-rata distributor.
//!
//! ## Algorithm
//!
//! Each pass works on the claimants that are not yet capped:
//!
//! 1. `sumW` = total weight of the uncapped claimants
//! 2. If `sumW` is zero, split the remaining capacity evenly and stop
//! 3. Otherwise each claimant's share is `remaining × (weight / sumW)`.
//!    A share at or above the request caps the claimant at its request;
//!    a smaller share is held tentatively.
//! 4. If nobody was capped, the tentative shares are final
//! 5. Otherwise `remaining = capacity − Σ capped` and the next pass runs
//!
//! Every pass that continues caps at least one claimant, so at most `n + 1`
//! passes run. Each pass is O(n), giving O(n²) in the worst case (a chain
//! of caps, one per pass).
//!
//! ## Example
//!
//! ```
//! use prorata_allocator::engine::distributor::distribute;
//! use prorata_allocator::trace::TraceRecorder;
//! use prorata_allocator::types::{AllocationRequest, Claimant};
//! use rust_decimal::Decimal;
//!
//! let request = AllocationRequest::new(
//!     Decimal::from(100),
//!     vec![
//!         Claimant::new("A", Decimal::from(10), Decimal::from(90)),
//!         Claimant::new("B", Decimal::from(200), Decimal::from(10)),
//!     ],
//! );
//!
//! let state = distribute(&request, &mut TraceRecorder::disabled());
//! assert!(state.is_capped(0));
//! assert_eq!(state.allocated(0), Decimal::from(10));
//! assert_eq!(state.allocated(1), Decimal::from(90));
//! assert_eq!(state.passes(), 2);
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::guards::split_equally;
use crate::engine::state::AllocationState;
use crate::trace::{EntryStatus, PassEntry, TraceRecorder};
use crate::types::amount::format_amount;
use crate::types::AllocationRequest;

/// How a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStep {
    /// At least one claimant was capped; capacity must be redistributed
    Redistribute,
    /// Nobody was capped; tentative shares are final
    Converged,
    /// Uncapped weights were all zero; remaining capacity was split evenly
    SplitEqually,
}

/// Run passes until the allocation converges
///
/// Expects a request that is not fully satisfied and has at least one
/// positive weight (the guards handle everything else), but terminates for
/// any request.
pub fn distribute(request: &AllocationRequest, recorder: &mut TraceRecorder) -> AllocationState {
    let mut state = AllocationState::new(request.len());
    let mut remaining = request.capacity;
    let mut step = PassStep::Redistribute;

    while needs_pass(step, &state, remaining) {
        step = run_pass(request, &mut state, remaining, recorder);
        if step == PassStep::Redistribute {
            remaining = request.capacity - state.capped_total();
        }
    }

    debug!(passes = state.passes(), ?step, "distribution converged");
    state
}

/// Loop predicate, evaluated before every pass
fn needs_pass(step: PassStep, state: &AllocationState, remaining: Decimal) -> bool {
    step == PassStep::Redistribute && state.has_uncapped() && remaining > Decimal::ZERO
}

/// Run one pass over the uncapped claimants
///
/// # Arguments
///
/// * `request` - The request being allocated
/// * `state` - Running state, updated in place
/// * `remaining` - Capacity not held by capped claimants
/// * `recorder` - Trace accumulator
pub fn run_pass(
    request: &AllocationRequest,
    state: &mut AllocationState,
    remaining: Decimal,
    recorder: &mut TraceRecorder,
) -> PassStep {
    let index = state.begin_pass();
    let mut record = recorder.begin_pass(index, remaining);

    let uncapped = state.uncapped_indices();
    let sum_w = uncapped
        .iter()
        .fold(Decimal::ZERO, |acc, &i| acc.saturating_add(request.claimants[i].weight));

    if sum_w.is_zero() {
        let share = split_equally(request, state, &uncapped, remaining);

        if let Some(record) = record.as_mut() {
            record.note = Some(
                "Remaining uncapped claimants have zero weight. Splitting equally.".to_string(),
            );
            for &i in &uncapped {
                let claimant = &request.claimants[i];
                record.push(PassEntry {
                    name: claimant.name.clone(),
                    formula: format!(
                        "{} / {} = {}",
                        format_amount(remaining),
                        uncapped.len(),
                        format_amount(share)
                    ),
                    requested: claimant.requested,
                    value: state.allocated(i),
                    status: EntryStatus::EqualSplit,
                });
            }
        }
        recorder.record_pass(record);

        debug!(pass = index, claimants = uncapped.len(), "zero uncapped weight, equal split");
        return PassStep::SplitEqually;
    }

    let mut newly_capped = 0usize;
    for &i in &uncapped {
        let claimant = &request.claimants[i];
        let proportional = proportional_share(remaining, claimant.weight, sum_w);

        let status = if proportional >= claimant.requested {
            state.cap(i, claimant.requested);
            newly_capped += 1;
            EntryStatus::Capped
        } else {
            state.set_tentative(i, proportional);
            EntryStatus::Tentative
        };

        if let Some(record) = record.as_mut() {
            record.push(PassEntry {
                name: claimant.name.clone(),
                formula: format!(
                    "{} × ({} / {}) = {}",
                    format_amount(remaining),
                    claimant.weight.normalize(),
                    sum_w.normalize(),
                    format_amount(proportional)
                ),
                requested: claimant.requested,
                value: state.allocated(i),
                status,
            });
        }
    }
    recorder.record_pass(record);

    debug!(pass = index, %remaining, newly_capped, "pass complete");

    if newly_capped == 0 {
        PassStep::Converged
    } else {
        PassStep::Redistribute
    }
}

/// `remaining × weight / sum_w`
///
/// Multiplies first so exact shares stay exact (`30 × 1 / 3 = 10`). Falls back
/// to dividing first only when the product leaves the decimal range.
fn proportional_share(remaining: Decimal, weight: Decimal, sum_w: Decimal) -> Decimal {
    match remaining.checked_mul(weight).and_then(|product| product.checked_div(sum_w)) {
        Some(share) => share,
        None => remaining * (weight / sum_w),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
