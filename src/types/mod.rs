//! Core data types for the allocation engine
//!
//! All amounts are [`rust_decimal::Decimal`]; nothing in the engine touches
//! floating point.
//!
//! ## Types
//!
//! - [`Claimant`]: A party with a requested upper bound and a weight
//! - [`AllocationRequest`]: Capacity plus ordered claimants
//! - [`Allocations`]: Final name → amount mapping, in claimant order
//! - [`AllocationReceipt`]: Fixed-size run summary with a result digest
//!
//! Cent rounding and amount text helpers live in [`amount`].

mod allocation;
mod claimant;
mod receipt;
pub mod amount;

// Re-export all types at module level
pub use allocation::{Allocation, Allocations};
pub use claimant::{AllocationRequest, Claimant};
pub use receipt::AllocationReceipt;
