//! Trace recording for auditability.
//!
//! The trace is a value threaded through the engine, never an ambient log.
//! It records what each distributor pass computed so a person can follow the
//! arithmetic, and a one-line summary of the run. Turning it off changes
//! nothing about the numbers.
//!
//! ## Example
//!
//! ```
//! use prorata_allocator::engine::{AllocationEngine, EngineConfig};
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
//! let outcome = AllocationEngine::new(EngineConfig::default()).allocate(&request).unwrap();
//! let trace = outcome.trace.unwrap();
//! assert_eq!(trace.passes.len(), 2);
//! ```

pub mod recorder;

pub use recorder::{EntryStatus, PassEntry, PassRecord, Trace, TraceRecorder};
