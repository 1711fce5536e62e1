//! Fixture loading and comparison.
//!
//! A fixture is a pair of JSON files in one directory:
//!
//! - `<id>_input.json`: an [`AllocationRequest`]
//! - `<id>_output.json`: a flat object of claimant name → expected amount.
//!   Keys starting with `_` are metadata (comments, descriptions) and are skipped.
//!
//! Amounts are compared with a one-cent tolerance.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::engine::{AllocationEngine, AllocationOutcome};
use crate::error::{Error, InvalidInputError, Result};
use crate::types::amount::{format_amount, parse_amount, CENT};
use crate::types::{AllocationRequest, Allocations};

/// Suffix of fixture input files
pub const INPUT_SUFFIX: &str = "_input.json";

/// Suffix of fixture expected-output files
pub const OUTPUT_SUFFIX: &str = "_output.json";

/// Largest difference still counted as a match
pub const TOLERANCE: Decimal = CENT;

/// A loaded fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    /// Fixture id (file name prefix)
    pub id: String,

    /// Request to allocate
    pub request: AllocationRequest,

    /// Expected amounts by claimant name
    pub expected: BTreeMap<String, Decimal>,
}

/// One way a result can disagree with a fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difference {
    /// Expected claimant absent from the result
    Missing { name: String, expected: Decimal },
    /// Result claimant absent from the fixture
    Unexpected { name: String, actual: Decimal },
    /// Amounts differ by more than the tolerance
    Mismatch {
        name: String,
        expected: Decimal,
        actual: Decimal,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { name, .. } => write!(f, "missing claimant: {name}"),
            Self::Unexpected { name, .. } => write!(f, "unexpected claimant: {name}"),
            Self::Mismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "{name}: expected {}, got {} (diff {})",
                format_amount(*expected),
                format_amount(*actual),
                format_amount((*expected - *actual).abs())
            ),
        }
    }
}

/// Result of running one fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    /// Fixture id
    pub id: String,

    /// Engine output
    pub outcome: AllocationOutcome,

    /// Disagreements with the expected output
    pub differences: Vec<Difference>,
}

impl CaseReport {
    /// Check if the result matched the fixture
    pub fn passed(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Path of a fixture's input file
pub fn input_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}{INPUT_SUFFIX}"))
}

/// Path of a fixture's expected-output file
pub fn output_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}{OUTPUT_SUFFIX}"))
}

/// Load fixture `id` from `dir`
pub fn load_case(dir: &Path, id: &str) -> Result<FixtureCase> {
    let request: AllocationRequest = serde_json::from_str(&read(&input_path(dir, id))?)?;
    let expected = parse_expected(serde_json::from_str(&read(&output_path(dir, id))?)?)?;

    Ok(FixtureCase {
        id: id.to_string(),
        request,
        expected,
    })
}

/// Turn an expected-output object into amounts, dropping `_` metadata keys
pub fn parse_expected(value: Value) -> Result<BTreeMap<String, Decimal>> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(InvalidInputError::UnparsableAmount {
                field: "expected output".to_string(),
                text: other.to_string(),
            }
            .into())
        }
    };

    let mut expected = BTreeMap::new();
    for (name, amount) in map {
        if name.starts_with('_') {
            continue;
        }
        let parsed = match &amount {
            Value::Number(number) => {
                let text = number.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map_err(|_| InvalidInputError::UnparsableAmount {
                        field: name.clone(),
                        text,
                    })?
            }
            Value::String(text) => parse_amount(&name, text)?,
            other => {
                return Err(InvalidInputError::UnparsableAmount {
                    field: name.clone(),
                    text: other.to_string(),
                }
                .into())
            }
        };
        expected.insert(name, parsed);
    }
    Ok(expected)
}

/// Compare allocations against expected amounts
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use prorata_allocator::fixtures::{compare, TOLERANCE};
/// use prorata_allocator::types::Allocations;
/// use rust_decimal::Decimal;
///
/// let mut actual = Allocations::new();
/// actual.push("A", Decimal::new(8000, 2));
///
/// let expected = BTreeMap::from([("A".to_string(), Decimal::new(8001, 2))]);
/// assert!(compare(&actual, &expected, TOLERANCE).is_empty());
/// ```
pub fn compare(
    actual: &Allocations,
    expected: &BTreeMap<String, Decimal>,
    tolerance: Decimal,
) -> Vec<Difference> {
    let mut differences = Vec::new();

    for (name, &want) in expected {
        match actual.get(name) {
            None => differences.push(Difference::Missing {
                name: name.clone(),
                expected: want,
            }),
            Some(got) if (got - want).abs() > tolerance => differences.push(Difference::Mismatch {
                name: name.clone(),
                expected: want,
                actual: got,
            }),
            Some(_) => {}
        }
    }

    for entry in actual {
        if !expected.contains_key(&entry.name) {
            differences.push(Difference::Unexpected {
                name: entry.name.clone(),
                actual: entry.amount,
            });
        }
    }

    differences
}

/// Allocate a fixture's request and compare the result
pub fn run_case(engine: &AllocationEngine, case: &FixtureCase) -> Result<CaseReport> {
    let outcome = engine.allocate(&case.request)?;
    let differences = compare(&outcome.allocations, &case.expected, TOLERANCE);

    Ok(CaseReport {
        id: case.id.clone(),
        outcome,
        differences,
    })
}

/// Fixture ids in `dir`, sorted
pub fn discover(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|err| not_found(err, dir))?;

    let mut ids = Vec::new();
    for entry in entries {
        let file_name = entry?.file_name();
        if let Some(id) = file_name.to_str().and_then(|n| n.strip_suffix(INPUT_SUFFIX)) {
            ids.push(id.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| not_found(err, path))
}

fn not_found(err: std::io::Error, path: &Path) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::FixtureNotFound(path.display().to_string())
    } else {
        Error::Io(err)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
