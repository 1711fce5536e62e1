//! JSON and CSV export of finished allocations.
//!
//! Amounts are written with two decimals. No currency symbols, no locale
//! formatting.

use std::io::Write;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::AllocationOutcome;
use crate::error::Result;
use crate::types::amount::format_amount;
use crate::types::{AllocationRequest, Allocations, Claimant};

/// CSV header row
pub const CSV_HEADER: [&str; 4] = ["Claimant", "Requested", "Weight", "Allocated"];

/// JSON export document: the request, its result and when it was computed
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord<'a> {
    /// Capacity that was distributed
    pub capacity: Decimal,

    /// Claimants, in input order
    pub claimants: &'a [Claimant],

    /// Final allocations, in input order
    pub allocations: &'a Allocations,

    /// Receipt digest (hex)
    pub digest: String,

    /// Computation time
    pub calculated_at: DateTime<Utc>,
}

impl<'a> ExportRecord<'a> {
    /// Build a record for `request` and its outcome
    pub fn new(
        request: &'a AllocationRequest,
        outcome: &'a AllocationOutcome,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            capacity: request.capacity,
            claimants: &request.claimants,
            allocations: &outcome.allocations,
            digest: outcome.receipt.digest_hex(),
            calculated_at,
        }
    }
}

/// Write a record as pretty-printed JSON
pub fn write_json<W: Write>(writer: W, record: &ExportRecord<'_>) -> Result<()> {
    serde_json::to_writer_pretty(writer, record)?;
    Ok(())
}

/// Write a CSV table: one row per claimant, then totals
///
/// # Example
///
/// ```
/// use prorata_allocator::engine::allocate;
/// use prorata_allocator::export::write_csv;
/// use prorata_allocator::types::{AllocationRequest, Claimant};
/// use rust_decimal::Decimal;
///
/// let request = AllocationRequest::new(
///     Decimal::from(100),
///     vec![Claimant::new("A", Decimal::from(150), Decimal::from(100))],
/// );
/// let outcome = allocate(&request).unwrap();
///
/// let mut out = Vec::new();
/// write_csv(&mut out, &request, &outcome.allocations).unwrap();
///
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.starts_with("Claimant,Requested,Weight,Allocated\nA,150.00,100,100.00\n"));
/// ```
pub fn write_csv<W: Write>(
    writer: W,
    request: &AllocationRequest,
    allocations: &Allocations,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for claimant in &request.claimants {
        let allocated = allocations.get(&claimant.name).unwrap_or(Decimal::ZERO);
        csv.write_record([
            claimant.name.clone(),
            format_amount(claimant.requested),
            claimant.weight.normalize().to_string(),
            format_amount(allocated),
        ])?;
    }

    csv.write_record(["", "", "", ""])?;
    csv.write_record([
        "Total".to_string(),
        format_amount(request.total_requested()),
        request.total_weight().normalize().to_string(),
        format_amount(allocations.total()),
    ])?;
    csv.write_record([
        "Available Capacity".to_string(),
        String::new(),
        String::new(),
        format_amount(request.capacity),
    ])?;

    csv.flush()?;
    Ok(())
}

/// `<stem>_<YYYY-MM-DD_HH-MM>.<extension>`
pub fn export_filename(stem: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("{stem}_{}.{extension}", at.format("%Y-%m-%d_%H-%M"))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::allocate;
    use chrono::TimeZone;

    fn request() -> AllocationRequest {
        AllocationRequest::new(
            Decimal::from(100),
            vec![
                Claimant::new("A", Decimal::from(150), Decimal::from(100)),
                Claimant::new("B", Decimal::from(50), Decimal::from(25)),
            ],
        )
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let request = request();
        let outcome = allocate(&request).unwrap();

        let mut out = Vec::new();
        write_csv(&mut out, &request, &outcome.allocations).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Claimant,Requested,Weight,Allocated",
                "A,150.00,100,80.00",
                "B,50.00,25,20.00",
                ",,,",
                "Total,200.00,125,100.00",
                "Available Capacity,,,100.00",
            ]
        );
    }

    #[test]
    fn test_csv_quotes_names_with_commas() {
        let request = AllocationRequest::new(
            Decimal::from(10),
            vec![Claimant::new("Smith, J", Decimal::from(20), Decimal::ONE)],
        );
        let outcome = allocate(&request).unwrap();

        let mut out = Vec::new();
        write_csv(&mut out, &request, &outcome.allocations).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"Smith, J\",20.00,1,10.00"));
    }

    #[test]
    fn test_json_record() {
        let request = request();
        let outcome = allocate(&request).unwrap();
        let record = ExportRecord::new(&request, &outcome, fixed_time());

        let mut out = Vec::new();
        write_json(&mut out, &record).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["capacity"], "100");
        assert_eq!(value["claimants"][1]["name"], "B");
        assert_eq!(value["allocations"]["A"], "80.00");
        assert_eq!(value["allocations"]["B"], "20.00");
        assert_eq!(value["digest"], outcome.receipt.digest_hex());
        assert_eq!(value["calculated_at"], "2024-03-09T14:05:00Z");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("allocation_results", "csv", fixed_time()),
            "allocation_results_2024-03-09_14-05.csv"
        );
    }
}
