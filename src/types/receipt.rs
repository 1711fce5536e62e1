//! Allocation receipt: a fixed-size summary of one engine run.
//!
//! The receipt carries the numbers a caller needs to audit a result without
//! the full trace: how many passes ran, how many cents were handed out, how
//! much rounding dust was moved, and how much could not be placed. Its
//! `digest` pins the exact allocation list so fixtures can be compared
//! bit-for-bit.

use ssz_rs::prelude::*;
use sha2::{Sha256, Digest};

use crate::types::amount::to_cents;
use crate::types::Allocations;

/// Summary of a single allocation run.
///
/// ## Digest
///
/// The 32-byte digest is a SHA-256 over the allocations in claimant order.
/// Each entry contributes its name length (LE u64), the UTF-8 name bytes and
/// the amount in cents (LE i64).
///
/// ## Example
///
/// ```
/// use prorata_allocator::types::{AllocationReceipt, Allocations};
/// use rust_decimal::Decimal;
///
/// let mut allocations = Allocations::new();
/// allocations.push("A", Decimal::new(8000, 2));
///
/// let receipt = AllocationReceipt::for_allocations(&allocations, 1, 0, 0);
/// assert_eq!(receipt.allocated_cents, 8000);
/// assert_eq!(receipt.digest_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct AllocationReceipt {
    /// Number of claimants in the request
    pub claimant_count: u64,

    /// Distributor passes executed (0 when a guard short-circuited)
    pub pass_count: u64,

    /// Sum of final allocations, in cents
    pub allocated_cents: u64,

    /// Cents moved by the dust sweep
    pub dust_applied_cents: u64,

    /// Positive residual dust left undistributed, in cents
    pub unallocated_cents: u64,

    /// Negative residual dust left in place, in cents
    pub overallocated_cents: u64,

    /// SHA-256 over the canonical allocation list
    pub digest: [u8; 32],
}

impl AllocationReceipt {
    /// Build a receipt for a finished allocation
    ///
    /// # Arguments
    ///
    /// * `allocations` - Final allocations in claimant order
    /// * `pass_count` - Distributor passes executed
    /// * `dust_applied_cents` - Cents moved by the dust sweep
    /// * `residual_cents` - Dust left over (positive: unallocated, negative: overallocated)
    pub fn for_allocations(
        allocations: &Allocations,
        pass_count: usize,
        dust_applied_cents: u64,
        residual_cents: i64,
    ) -> Self {
        let allocated_cents = to_cents(allocations.total())
            .map_or(u64::MAX, |cents| cents.max(0) as u64);

        Self {
            claimant_count: allocations.len() as u64,
            pass_count: pass_count as u64,
            allocated_cents,
            dust_applied_cents,
            unallocated_cents: residual_cents.max(0) as u64,
            overallocated_cents: residual_cents.min(0).unsigned_abs(),
            digest: Self::compute_digest(allocations),
        }
    }

    /// Compute the canonical digest of an allocation list
    pub fn compute_digest(allocations: &Allocations) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for entry in allocations {
            hasher.update((entry.name.len() as u64).to_le_bytes());
            hasher.update(entry.name.as_bytes());
            let cents = to_cents(entry.amount).unwrap_or(i64::MAX);
            hasher.update(cents.to_le_bytes());
        }
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Get the digest as a hex string
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Residual dust in cents: positive if under-allocated, negative if over
    pub fn residual_cents(&self) -> i64 {
        self.unallocated_cents as i64 - self.overallocated_cents as i64
    }

    /// Check if every cent of rounding dust was placed
    pub fn is_reconciled(&self) -> bool {
        self.unallocated_cents == 0 && self.overallocated_cents == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
