//! Pass records and the recorder that accumulates them.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::amount::format_amount;

/// What happened to a claimant in one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Proportional share reached the request; fixed at the requested amount
    Capped,
    /// Proportional share below the request; may change in a later pass
    Tentative,
    /// Remaining capacity split evenly because every uncapped weight is zero
    EqualSplit,
}

/// One claimant's line within a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassEntry {
    /// Claimant name
    pub name: String,

    /// Human-readable computation, e.g. `100.00 × (90 / 100) = 90.00`
    pub formula: String,

    /// Claimant's requested amount
    pub requested: Decimal,

    /// Amount the claimant holds after this pass
    pub value: Decimal,

    /// Capped, tentative or equal split
    pub status: EntryStatus,
}

impl PassEntry {
    /// Human-readable outcome
    pub fn outcome(&self) -> String {
        match self.status {
            EntryStatus::Capped => format!("Capped at request: {}", format_amount(self.value)),
            EntryStatus::Tentative => format!("Allocated: {}", format_amount(self.value)),
            EntryStatus::EqualSplit => format!("Equal share: {}", format_amount(self.value)),
        }
    }
}

/// Everything one distributor pass computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassRecord {
    /// Pass number, starting at 1
    pub index: usize,

    /// Remaining capacity entering the pass
    pub remaining: Decimal,

    /// Per-claimant computations, in claimant order
    pub entries: Vec<PassEntry>,

    /// Free-form note (set when the pass fell back to an equal split)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PassRecord {
    /// Start a record for pass `index`
    pub fn new(index: usize, remaining: Decimal) -> Self {
        Self {
            index,
            remaining,
            entries: Vec::new(),
            note: None,
        }
    }

    /// Append a claimant line
    pub fn push(&mut self, entry: PassEntry) {
        self.entries.push(entry);
    }

    /// Names capped in this pass
    pub fn capped_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Capped)
            .map(|entry| entry.name.as_str())
    }
}

impl fmt::Display for PassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pass {} (remaining {})", self.index, format_amount(self.remaining))?;
        if let Some(note) = &self.note {
            writeln!(f, "  {note}")?;
        }
        for entry in &self.entries {
            writeln!(f, "  {}: {} -> {}", entry.name, entry.formula, entry.outcome())?;
        }
        Ok(())
    }
}

/// The finished trace of one engine run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Trace {
    /// One-line description of the run
    pub summary: String,

    /// Pass records, in execution order
    pub passes: Vec<PassRecord>,
}

/// Accumulates pass records during a run.
///
/// A disabled recorder hands out no records, so callers skip building
/// formula strings entirely.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    enabled: bool,
    passes: Vec<PassRecord>,
}

impl TraceRecorder {
    /// Create a recording recorder
    pub fn new() -> Self {
        Self {
            enabled: true,
            passes: Vec::new(),
        }
    }

    /// Create a recorder that drops everything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Check if records are being kept
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open a record for a pass, or `None` when disabled
    pub fn begin_pass(&self, index: usize, remaining: Decimal) -> Option<PassRecord> {
        self.enabled.then(|| PassRecord::new(index, remaining))
    }

    /// Store a finished pass record
    pub fn record_pass(&mut self, record: Option<PassRecord>) {
        if let Some(record) = record {
            self.passes.push(record);
        }
    }

    /// Records kept so far
    pub fn passes(&self) -> &[PassRecord] {
        &self.passes
    }

    /// Close the recorder with the run summary
    pub fn finish(self, summary: String) -> Option<Trace> {
        self.enabled.then(|| Trace {
            summary,
            passes: self.passes,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
