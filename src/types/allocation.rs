//! The final name → amount mapping.
//!
//! Entries keep the request's claimant order, so iteration, export and the
//! receipt digest are all deterministic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One claimant's final amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Claimant name
    pub name: String,

    /// Final allocated amount
    pub amount: Decimal,
}

/// Final allocations in claimant input order.
///
/// Serializes as a JSON object (`{"A": "80.00", "B": "20.00"}`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocations {
    entries: Vec<Allocation>,
}

impl Allocations {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapping with room for `capacity` claimants
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a claimant's amount
    pub fn push(&mut self, name: impl Into<String>, amount: Decimal) {
        self.entries.push(Allocation {
            name: name.into(),
            amount,
        });
    }

    /// Amount allocated to `name`
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.amount)
    }

    /// Iterate entries in claimant order
    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.entries.iter()
    }

    /// Number of claimants
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the mapping is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all allocated amounts
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|entry| entry.amount).sum()
    }

    /// Sorted copy keyed by name
    pub fn to_map(&self) -> BTreeMap<String, Decimal> {
        self.entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.amount))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Allocations {
    type Item = &'a Allocation;
    type IntoIter = std::slice::Iter<'a, Allocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Allocations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.amount)?;
        }
        map.end()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
