//! CSV loader for batch scenario files.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive. Amount cells accept a `$` sign and comma
//! thousands separators (`$250,000`).
//!
//! | Column                   | Required | Type    | Notes                                   |
//! |--------------------------|----------|---------|-----------------------------------------|
//! | `tax_year`               | yes      | integer | e.g. `2025`                             |
//! | `filing_status`          | yes      | string  | One of: `S`, `MFJ`, `MFS`, `HOH`, `QSS` |
//! | `magi`                   | yes      | amount  |                                         |
//! | `agi`                    | yes      | amount  |                                         |
//! | `total_income`           | no       | amount  | Defaults to `agi`                       |
//! | `taxable_income`         | no       | amount  | Empty for AGI less standard deduction   |
//! | `capital_gains_long`     | no       | amount  | Empty for 0                             |
//! | `capital_gains_short`    | no       | amount  | Empty for 0                             |
//! | `social_security_amount` | no       | amount  | Empty when no benefits are received     |
//! | `household_size`         | no       | integer | Needed for ACA analysis                 |
//! | `medicare_enrollment`    | no       | bool    | `true` / `false`, empty for `false`     |
//! | `aca_enrollment`         | no       | bool    | `true` / `false`, empty for `false`     |
//!
//! ### Minimal example
//!
//! ```csv
//! tax_year,filing_status,magi,agi
//! 2025,MFJ,150000.00,150000.00
//! ```
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use taxtrap_core::{FilingStatus, ScenarioInput};

use crate::amount::{parse_amount, parse_optional_amount};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    tax_year: i32,
    filing_status: String,
    #[serde(deserialize_with = "amount")]
    magi: Decimal,
    #[serde(deserialize_with = "amount")]
    agi: Decimal,
    #[serde(default, deserialize_with = "optional_amount")]
    total_income: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_amount")]
    taxable_income: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_amount")]
    capital_gains_long: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_amount")]
    capital_gains_short: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_amount")]
    social_security_amount: Option<Decimal>,
    #[serde(default)]
    household_size: Option<u32>,
    #[serde(default)]
    medicare_enrollment: Option<bool>,
    #[serde(default)]
    aca_enrollment: Option<bool>,
}

fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_amount(&raw).map_err(serde::de::Error::custom)
}

fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_optional_amount(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// Bad structure, missing required column, type mismatch, etc.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based (header = row 0).
    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<ScenarioInput, CsvLoadError> {
    let filing_status = FilingStatus::parse(&row.filing_status).ok_or_else(|| {
        CsvLoadError::InvalidFilingStatus {
            status: row.filing_status,
            row: row_number,
        }
    })?;

    let mut scenario = ScenarioInput::new(row.tax_year, filing_status, row.magi, row.agi);
    if let Some(total_income) = row.total_income {
        scenario.total_income = total_income;
    }
    scenario.taxable_income = row.taxable_income;
    scenario.capital_gains_long = row.capital_gains_long.unwrap_or_default();
    scenario.capital_gains_short = row.capital_gains_short.unwrap_or_default();
    scenario.social_security_amount = row.social_security_amount;
    scenario.household_size = row.household_size;
    scenario.medicare_enrollment = row.medicare_enrollment.unwrap_or(false);
    scenario.aca_enrollment = row.aca_enrollment.unwrap_or(false);
    Ok(scenario)
}

/// Parses CSV text into scenarios, in file order.
///
/// Amounts are not range-checked here; the analyzer validates each scenario.
///
/// # Errors
///
/// * [CsvLoadError::Parse] if the CSV is structurally invalid or a
///   required field cannot be deserialised.
/// * [CsvLoadError::InvalidFilingStatus] if any row contains an
///   unrecognised filing-status code.
pub fn load_from_str(input: &str) -> Result<Vec<ScenarioInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Reads a file from disk and delegates to [load_from_str].
///
/// # Errors
///
/// [CsvLoadError::Io] when the file cannot be read, otherwise as
/// [load_from_str].
pub fn load_from_file(path: &std::path::Path) -> Result<Vec<ScenarioInput>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const MINIMAL_CSV: &str = "\
tax_year,filing_status,magi,agi
2025,S,75000.00,72000.00
";

    const FULL_CSV: &str = "\
tax_year,filing_status,magi,agi,total_income,taxable_income,capital_gains_long,capital_gains_short,social_security_amount,household_size,medicare_enrollment,aca_enrollment
2024,MFJ,\"$210,000\",200000,205000,170800,25000,1500,36000,2,true,false
";

    const MULTI_ROW_CSV: &str = "\
tax_year,filing_status,magi,agi,household_size
2025,S,75000,75000,1
2025,MFJ,200000,200000,
2025,MFS,90000,90000,1
2025,HOH,60000,60000,
2025,QSS,110000,110000,3
";

    // -----------------------------------------------------------------------
    // 1. Minimal CSV
    // -----------------------------------------------------------------------
    #[test]
    fn test_minimal_csv_uses_scenario_defaults() {
        let scenarios = load_from_str(MINIMAL_CSV).expect("should parse minimal CSV");

        assert_eq!(
            scenarios,
            vec![ScenarioInput::new(
                2025,
                FilingStatus::Single,
                dec!(75000.00),
                dec!(72000.00)
            )]
        );
        assert_eq!(scenarios[0].total_income, dec!(72000.00));
    }

    // -----------------------------------------------------------------------
    // 2. Full CSV
    // -----------------------------------------------------------------------
    #[test]
    fn test_full_csv_all_fields_populated() {
        let scenarios = load_from_str(FULL_CSV).expect("should parse full CSV");
        let s = &scenarios[0];

        assert_eq!(s.tax_year, 2024);
        assert_eq!(s.filing_status, FilingStatus::MarriedFilingJointly);
        assert_eq!(s.magi, dec!(210000));
        assert_eq!(s.agi, dec!(200000));
        assert_eq!(s.total_income, dec!(205000));
        assert_eq!(s.taxable_income, Some(dec!(170800)));
        assert_eq!(s.capital_gains_long, dec!(25000));
        assert_eq!(s.capital_gains_short, dec!(1500));
        assert_eq!(s.social_security_amount, Some(dec!(36000)));
        assert_eq!(s.household_size, Some(2));
        assert!(s.medicare_enrollment);
        assert!(!s.aca_enrollment);
    }

    // -----------------------------------------------------------------------
    // 3. Multiple rows
    // -----------------------------------------------------------------------
    #[test]
    fn test_multi_row_keeps_file_order() {
        let scenarios = load_from_str(MULTI_ROW_CSV).expect("should parse");

        let statuses: Vec<_> = scenarios.iter().map(|s| s.filing_status).collect();
        assert_eq!(statuses, FilingStatus::ALL.to_vec());
        assert_eq!(scenarios[0].household_size, Some(1));
        assert_eq!(scenarios[1].household_size, None);
    }

    // -----------------------------------------------------------------------
    // 4. Errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_invalid_filing_status_on_second_row_reports_correct_row() {
        let csv = "\
tax_year,filing_status,magi,agi
2025,S,1.00,1.00
2025,NOPE,2.00,2.00
";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::InvalidFilingStatus { status, row } => {
                assert_eq!(status, "NOPE");
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidFilingStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column_returns_parse_error() {
        let csv = "tax_year,filing_status,magi\n2025,S,14600.00\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::Parse(_) => {}
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_amount_returns_parse_error() {
        let csv = "tax_year,filing_status,magi,agi\n2025,S,lots,1.00\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::Parse(err) => {
                assert!(err.to_string().contains("invalid amount 'lots'"));
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_returns_empty_vec() {
        let scenarios = load_from_str("tax_year,filing_status,magi,agi\n").unwrap();
        assert!(scenarios.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_from_file(std::path::Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, CsvLoadError::Io { .. }));
    }
}
