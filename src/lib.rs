//! # Pro-Rata Allocator
//!
//! Distributes a fixed capacity among claimants in proportion to their
//! weights, never giving anyone more than they requested, and hands out the
//! full capacity to the cent whenever demand allows.
//!
//! ## Architecture
//!
//! - **Types**: Requests, claimants, allocations and the run receipt
//! - **Engine**: Guards, iterative capped distributor, dust reconciler
//! - **Trace**: Per-pass audit records, threaded through the engine as a value
//! - **Validation / Fixtures / Export**: Checks before, and files after, an allocation
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical requests (claimant order included) give identical results
//! 2. **No Floating Point**: All math uses `rust_decimal::Decimal`
//! 3. **Stateless Calls**: Every call owns its state; nothing survives between calls
//! 4. **Exact Totals**: Rounding dust is reconciled one cent at a time, last claimant first
//!
//! ## Complexity
//!
//! At most `n + 1` distributor passes of O(n) work each: O(n²) worst case.

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Core data types: AllocationRequest, Claimant, Allocations, AllocationReceipt
pub mod types;

/// Trace recorder: per-pass audit records
pub mod trace;

/// Allocation engine: guards, distributor, reconciler
pub mod engine;

/// Request validation ahead of the engine
pub mod validation;

/// Fixture loading and comparison
pub mod fixtures;

/// JSON and CSV export
pub mod export;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{allocate, AllocationEngine, AllocationOutcome, EngineConfig};
pub use error::{Error, InvalidInputError, Result};
pub use trace::{PassRecord, Trace};
pub use types::{AllocationReceipt, AllocationRequest, Allocations, Claimant};
