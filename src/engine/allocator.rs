//! The allocation engine: guards, distributor and reconciler composed into
//! one entry operation.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::engine::distributor::distribute;
use crate::engine::guards::{equal_weight_fallback, full_satisfaction};
use crate::engine::reconciler::{reconcile, round_only, Reconciliation};
use crate::error::InvalidInputError;
use crate::trace::{Trace, TraceRecorder};
use crate::types::amount::{abs_cents, format_amount, to_cents};
use crate::types::{AllocationReceipt, AllocationRequest, Allocations};

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Keep pass records and the summary line
    pub record_trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { record_trace: true }
    }
}

impl EngineConfig {
    /// Config with the trace recorder switched off
    pub fn without_trace() -> Self {
        Self {
            record_trace: false,
        }
    }
}

/// Everything one engine call produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Final name → amount mapping, in claimant order
    pub allocations: Allocations,

    /// Fixed-size summary, always present
    pub receipt: AllocationReceipt,

    /// Pass records and summary, present when tracing is enabled
    pub trace: Option<Trace>,
}

impl AllocationOutcome {
    /// Signed dust left undistributed (positive: capacity left over)
    pub fn residual_cents(&self) -> i64 {
        self.receipt.residual_cents()
    }
}

/// Capped pro-rata allocation engine.
///
/// Holds only configuration; every call builds and drops its own state, so a
/// single engine may be shared freely across threads.
///
/// ## Example
///
/// ```
/// use prorata_allocator::engine::{AllocationEngine, EngineConfig};
/// use prorata_allocator::types::{AllocationRequest, Claimant};
/// use rust_decimal::Decimal;
///
/// let engine = AllocationEngine::new(EngineConfig::default());
/// let request = AllocationRequest::new(
///     Decimal::from(100),
///     vec![
///         Claimant::new("A", Decimal::from(150), Decimal::from(100)),
///         Claimant::new("B", Decimal::from(50), Decimal::from(25)),
///     ],
/// );
///
/// let outcome = engine.allocate(&request).unwrap();
/// assert_eq!(outcome.allocations.get("A"), Some(Decimal::from(80)));
/// assert_eq!(outcome.allocations.get("B"), Some(Decimal::from(20)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine {
    config: EngineConfig,
}

impl AllocationEngine {
    /// Create an engine
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine settings
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Allocate `request.capacity` among its claimants
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidInputError`] if the request breaks a
    /// precondition (negative amounts, empty or duplicate names). No partial
    /// result is produced.
    pub fn allocate(&self, request: &AllocationRequest) -> Result<AllocationOutcome, InvalidInputError> {
        request.check_preconditions()?;

        let mut recorder = if self.config.record_trace {
            TraceRecorder::new()
        } else {
            TraceRecorder::disabled()
        };

        if let Some(shortcut) = full_satisfaction(request) {
            debug!(kind = ?shortcut.kind, claimants = request.len(), "short-circuit");
            let receipt = AllocationReceipt::for_allocations(&shortcut.allocations, 0, 0, 0);
            return Ok(AllocationOutcome {
                allocations: shortcut.allocations,
                receipt,
                trace: recorder.finish(shortcut.summary),
            });
        }

        let (passes, reconciliation, mut summary) = match equal_weight_fallback(request) {
            Some(state) => {
                debug!(claimants = request.len(), "all weights zero, equal split");
                (
                    state.passes(),
                    round_only(request, &state),
                    "All weights are zero. Splitting capacity equally among all claimants."
                        .to_string(),
                )
            }
            None => {
                let state = distribute(request, &mut recorder);
                let reconciliation = reconcile(request, &state);
                let summary = format!(
                    "Completed pro-rata distribution in {} pass(es). Total allocated: {}.",
                    state.passes(),
                    format_amount(reconciliation.allocations.total())
                );
                (state.passes(), reconciliation, summary)
            }
        };

        append_dust_summary(&mut summary, &reconciliation);

        let residual = reconciliation.sweep.residual;
        if !residual.is_zero() {
            warn!(
                residual = %format_amount(residual),
                "rounding dust left undistributed"
            );
        }

        let receipt = AllocationReceipt::for_allocations(
            &reconciliation.allocations,
            passes,
            reconciliation.sweep.applied_cents,
            residual_cents(residual),
        );

        Ok(AllocationOutcome {
            allocations: reconciliation.allocations,
            receipt,
            trace: recorder.finish(summary),
        })
    }
}

/// Allocate with the default configuration
pub fn allocate(request: &AllocationRequest) -> Result<AllocationOutcome, InvalidInputError> {
    AllocationEngine::default().allocate(request)
}

fn append_dust_summary(summary: &mut String, reconciliation: &Reconciliation) {
    let applied = reconciliation.sweep.applied_cents;
    if applied > 0 {
        summary.push_str(&format!(" Redistributed {applied} cent(s) of rounding dust."));
    }

    let residual = reconciliation.sweep.residual;
    if !residual.is_zero() {
        let direction = if residual > Decimal::ZERO {
            "undistributed"
        } else {
            "over-allocated"
        };
        summary.push_str(&format!(
            " {} cent(s) left {direction}.",
            abs_cents(residual)
        ));
    }
}

fn residual_cents(residual: Decimal) -> i64 {
    to_cents(residual).unwrap_or(if residual > Decimal::ZERO { i64::MAX } else { i64::MIN })
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

    fn request(capacity: &str, claimants: &[(&str, &str, &str)]) -> AllocationRequest {
        AllocationRequest::new(
            dec(capacity),
            claimants
                .iter()
                .map(|(name, requested, weight)| Claimant::new(*name, dec(requested), dec(weight)))
                .collect(),
        )
    }

    #[test]
    fn test_rejects_invalid_input_without_result() {
        let req = request("100", &[("A", "10", "1"), ("A", "10", "1")]);
        assert_eq!(
            allocate(&req),
            Err(InvalidInputError::DuplicateName("A".to_string()))
        );

        let req = request("-1", &[("A", "10", "1")]);
        assert!(matches!(allocate(&req), Err(InvalidInputError::NegativeCapacity(_))));
    }

    #[test]
    fn test_full_satisfaction_summary() {
        let outcome = allocate(&request("200", &[("A", "100", "50"), ("B", "100", "50")])).unwrap();
        let trace = outcome.trace.unwrap();

        assert!(trace.passes.is_empty());
        assert_eq!(
            trace.summary,
            "Capacity (200.00) >= total requested (200.00). Every claimant receives its full request."
        );
        assert_eq!(outcome.receipt.pass_count, 0);
        assert_eq!(outcome.receipt.allocated_cents, 20_000);
    }

    #[test]
    fn test_iterative_summary_mentions_dust() {
        let outcome = allocate(&request(
            "10",
            &[("A", "10", "1"), ("B", "10", "1"), ("C", "10", "1")],
        ))
        .unwrap();

        assert_eq!(outcome.allocations.get("C"), Some(dec("3.34")));
        assert_eq!(
            outcome.trace.unwrap().summary,
            "Completed pro-rata distribution in 1 pass(es). Total allocated: 10.00. \
             Redistributed 1 cent(s) of rounding dust."
        );
        assert_eq!(outcome.receipt.dust_applied_cents, 1);
        assert!(outcome.receipt.is_reconciled());
    }

    #[test]
    fn test_equal_weight_summary_reports_shortfall() {
        let outcome = allocate(&request("50", &[("A", "10", "0"), ("B", "100", "0")])).unwrap();

        assert_eq!(outcome.allocations.get("A"), Some(dec("10")));
        assert_eq!(outcome.allocations.get("B"), Some(dec("25")));
        assert_eq!(outcome.residual_cents(), 1500);

        let trace = outcome.trace.unwrap();
        assert!(trace.passes.is_empty());
        assert_eq!(
            trace.summary,
            "All weights are zero. Splitting capacity equally among all claimants. \
             1500 cent(s) left undistributed."
        );
    }

    #[test]
    fn test_disabled_trace() {
        let engine = AllocationEngine::new(EngineConfig::without_trace());
        assert!(!engine.config().record_trace);

        let req = request("100", &[("A", "10", "90"), ("B", "200", "10")]);
        let outcome = engine.allocate(&req).unwrap();

        assert!(outcome.trace.is_none());
        assert_eq!(outcome.receipt.pass_count, 2);
        assert_eq!(outcome, AllocationOutcome { trace: None, ..allocate(&req).unwrap() });
    }

    #[test]
    fn test_residual_surfaces_in_summary() {
        // B's unused equal share is lost; a single sweep cannot place 25.00
        let outcome = allocate(&request(
            "100",
            &[("A", "30", "10"), ("B", "10", "0"), ("C", "50", "0")],
        ))
        .unwrap();

        assert_eq!(outcome.allocations.get("A"), Some(dec("30")));
        assert_eq!(outcome.allocations.get("B"), Some(dec("10")));
        assert_eq!(outcome.allocations.get("C"), Some(dec("35.01")));
        assert_eq!(outcome.residual_cents(), 2499);

        let summary = outcome.trace.unwrap().summary;
        assert!(summary.contains("Redistributed 1 cent(s) of rounding dust."));
        assert!(summary.ends_with("2499 cent(s) left undistributed."));
    }
}
