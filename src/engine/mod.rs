//! Allocation engine for capped pro-rata distribution.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same request (including claimant order) always produces the same result
//! 2. **Fixed-Point Math**: `Decimal` throughout, no floating point
//! 3. **Synchronous Execution**: No I/O, no async, no shared state between calls
//! 4. **Exact Totals**: Rounding dust is swept so allocations add up to the capacity
//!
//! ## Control Flow
//!
//! 1. [`guards::full_satisfaction`]: zero capacity, no claimants, or enough for everyone
//! 2. [`guards::equal_weight_fallback`]: every weight zero, single even split
//! 3. [`distributor::distribute`]: iterative capped pro-rata passes
//! 4. [`reconciler::reconcile`]: round to cents, sweep dust last-to-first
//!
//! ## Example
//!
//! ```
//! use prorata_allocator::engine::allocate;
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
//! let outcome = allocate(&request).unwrap();
//! assert_eq!(outcome.allocations.get("A"), Some(Decimal::from(10)));
//! assert_eq!(outcome.allocations.get("B"), Some(Decimal::from(90)));
//! ```

pub mod allocator;
pub mod distributor;
pub mod guards;
pub mod reconciler;
pub mod state;

pub use allocator::{allocate, AllocationEngine, AllocationOutcome, EngineConfig};
pub use state::{AllocationState, ClaimantState};
