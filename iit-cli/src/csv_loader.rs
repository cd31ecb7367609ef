//! CSV loader for batch tax report input.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive. Every column except `wage` may be omitted or
//! left empty; amounts may use `,` as a thousands separator when quoted.
//!
//! | Column                  | Type    | Notes                                   |
//! |-------------------------|---------|-----------------------------------------|
//! | `label`                 | string  | Shown in the batch output               |
//! | `wage`                  | decimal | Required                                |
//! | `wage_period`           | string  | `monthly` (default) or `annual`         |
//! | `bonus`                 | decimal | Annual one-time bonus                   |
//! | `bonus_election`        | string  | `separate` (default) or `merged`        |
//! | `labor_income`          | decimal | Annual                                  |
//! | `manuscript_income`     | decimal | Annual                                  |
//! | `license_income`        | decimal | Annual                                  |
//! | `social_insurance_base` | decimal | Monthly                                 |
//! | `housing_fund_percent`  | decimal | e.g. `7` for 7%; moved into 5–12%       |
//! | `children_education`    | decimal | Monthly supplementary deduction         |
//! | `continuing_education`  | decimal | Monthly supplementary deduction         |
//! | `housing_loan_interest` | decimal | Monthly supplementary deduction         |
//! | `housing_rent`          | decimal | Monthly supplementary deduction         |
//! | `elder_support`         | decimal | Monthly supplementary deduction         |
//!
//! ### Minimal example
//!
//! ```csv
//! wage
//! 10000
//! ```
//!
//! ### Full example
//!
//! ```csv
//! label,wage,wage_period,bonus,bonus_election,social_insurance_base,housing_fund_percent,children_education,elder_support
//! alice,20000,monthly,60000,separate,10000,7,2000,3000
//! bob,"300,000",annual,"100,000",merged,,,,
//! ```
use std::collections::BTreeMap;
use std::path::Path;

use iit_core::{BonusElection, DeductionCategory, TaxInput, TaxInputError, WagePeriod};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::utils::{ParseDecimalError, parse_decimal, parse_percent};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    label: Option<String>,
    wage: String,
    wage_period: Option<String>,
    bonus: Option<String>,
    bonus_election: Option<String>,
    labor_income: Option<String>,
    manuscript_income: Option<String>,
    license_income: Option<String>,
    social_insurance_base: Option<String>,
    housing_fund_percent: Option<String>,
    children_education: Option<String>,
    continuing_education: Option<String>,
    housing_loan_interest: Option<String>,
    housing_rent: Option<String>,
    elder_support: Option<String>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One row of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// The row's `label`, or `row N` when absent.
    pub label: String,
    pub input: TaxInput,
}

/// Errors that can occur while loading or converting CSV data.
///
/// Row numbers are 1-based with the header excluded.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("cannot read batch file: {0}")]
    Io(#[from] std::io::Error),

    #[error("column '{column}' on row {row}: {source}")]
    InvalidAmount {
        column: &'static str,
        row: usize,
        #[source]
        source: ParseDecimalError,
    },

    #[error("unrecognised wage period '{value}' on row {row}")]
    InvalidWagePeriod { value: String, row: usize },

    #[error("unrecognised bonus election '{value}' on row {row}")]
    InvalidBonusElection { value: String, row: usize },

    #[error("row {row}: {source}")]
    InvalidInput {
        row: usize,
        #[source]
        source: TaxInputError,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn amount(
    cell: Option<&str>,
    column: &'static str,
    row: usize,
) -> Result<Decimal, CsvLoadError> {
    parse_decimal(cell.unwrap_or_default())
        .map_err(|source| CsvLoadError::InvalidAmount { column, row, source })
}

/// Empty cells fall back to the default.
fn choice<T: Default>(
    cell: Option<String>,
    parse: impl Fn(&str) -> Option<T>,
    error: impl Fn(String) -> CsvLoadError,
) -> Result<T, CsvLoadError> {
    match cell.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => parse(&value.to_lowercase()).ok_or_else(|| error(value.to_string())),
    }
}

/// Convert a single CSV row into a validated TaxInput.
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BatchEntry, CsvLoadError> {
    let wage_period = choice(row.wage_period, WagePeriod::parse, |value| {
        CsvLoadError::InvalidWagePeriod {
            value,
            row: row_number,
        }
    })?;
    let bonus_election = choice(row.bonus_election, BonusElection::parse, |value| {
        CsvLoadError::InvalidBonusElection {
            value,
            row: row_number,
        }
    })?;

    let deduction_cells = [
        (DeductionCategory::ChildrenEducation, &row.children_education),
        (DeductionCategory::ContinuingEducation, &row.continuing_education),
        (DeductionCategory::HousingLoanInterest, &row.housing_loan_interest),
        (DeductionCategory::HousingRent, &row.housing_rent),
        (DeductionCategory::ElderSupport, &row.elder_support),
    ];
    let mut supplementary_deductions = BTreeMap::new();
    for (category, cell) in deduction_cells {
        let value = amount(cell.as_deref(), category.as_str(), row_number)?;
        if !value.is_zero() {
            supplementary_deductions.insert(category, value);
        }
    }

    let housing_fund_rate = parse_percent(row.housing_fund_percent.as_deref().unwrap_or_default())
        .map_err(|source| CsvLoadError::InvalidAmount {
            column: "housing_fund_percent",
            row: row_number,
            source,
        })?;

    let input = TaxInput {
        wage: amount(Some(&row.wage), "wage", row_number)?,
        wage_period,
        bonus: amount(row.bonus.as_deref(), "bonus", row_number)?,
        bonus_election,
        labor_income: amount(row.labor_income.as_deref(), "labor_income", row_number)?,
        manuscript_income: amount(
            row.manuscript_income.as_deref(),
            "manuscript_income",
            row_number,
        )?,
        license_income: amount(row.license_income.as_deref(), "license_income", row_number)?,
        social_insurance_base: amount(
            row.social_insurance_base.as_deref(),
            "social_insurance_base",
            row_number,
        )?,
        housing_fund_rate,
        supplementary_deductions,
    };

    input
        .validate()
        .map_err(|source| CsvLoadError::InvalidInput {
            row: row_number,
            source,
        })?;

    let label = row
        .label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| format!("row {row_number}"));

    Ok(BatchEntry { label, input })
}

/// Parse CSV text and return one entry per row, in file order.
///
/// # Errors
///
/// * [CsvLoadError::Parse] – if the CSV is structurally invalid or the
///   `wage` column is missing.
/// * [CsvLoadError::InvalidAmount] – if a cell is not a number.
/// * [CsvLoadError::InvalidInput] – if a row carries a negative or oversized
///   amount.
pub fn load_from_str(input: &str) -> Result<Vec<BatchEntry>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
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

/// Read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<BatchEntry>, CsvLoadError> {
    let contents = std::fs::read_to_string(path)?;
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
wage
10000
";

    const FULL_CSV: &str = "\
label,wage,wage_period,bonus,bonus_election,labor_income,manuscript_income,license_income,social_insurance_base,housing_fund_percent,children_education,continuing_education,housing_loan_interest,housing_rent,elder_support
alice,20000,monthly,60000,separate,10000,5000,2000,10000,7,2000,400,1000,0,3000
";

    // -----------------------------------------------------------------------
    // 1. Minimal CSV – only the wage column
    // -----------------------------------------------------------------------
    #[test]
    fn test_minimal_csv_uses_defaults() {
        let entries = load_from_str(MINIMAL_CSV).expect("should parse minimal CSV");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "row 1");
        assert_eq!(
            entries[0].input,
            TaxInput {
                wage: dec!(10000),
                ..Default::default()
            }
        );
    }

    // -----------------------------------------------------------------------
    // 2. Full CSV – every column populated
    // -----------------------------------------------------------------------
    #[test]
    fn test_full_csv_all_fields_populated() {
        let entries = load_from_str(FULL_CSV).expect("should parse full CSV");
        let e = &entries[0];

        assert_eq!(e.label, "alice");
        assert_eq!(e.input.wage, dec!(20000));
        assert_eq!(e.input.wage_period, WagePeriod::Monthly);
        assert_eq!(e.input.bonus, dec!(60000));
        assert_eq!(e.input.bonus_election, BonusElection::Separate);
        assert_eq!(e.input.labor_income, dec!(10000));
        assert_eq!(e.input.manuscript_income, dec!(5000));
        assert_eq!(e.input.license_income, dec!(2000));
        assert_eq!(e.input.social_insurance_base, dec!(10000));
        assert_eq!(e.input.housing_fund_rate, dec!(0.07));
        assert_eq!(e.input.supplementary_monthly_total(), dec!(6400));
    }

    #[test]
    fn test_zero_deductions_are_not_stored() {
        let entries = load_from_str(FULL_CSV).expect("should parse");

        assert!(
            !entries[0]
                .input
                .supplementary_deductions
                .contains_key(&DeductionCategory::HousingRent)
        );
    }

    // -----------------------------------------------------------------------
    // 3. Formatting tolerance
    // -----------------------------------------------------------------------
    #[test]
    fn test_quoted_thousands_separators() {
        let csv = "wage,wage_period,bonus\n\"300,000\",annual,\"100,000.50\"\n";

        let entries = load_from_str(csv).expect("should parse");

        assert_eq!(entries[0].input.wage, dec!(300000));
        assert_eq!(entries[0].input.wage_period, WagePeriod::Annual);
        assert_eq!(entries[0].input.bonus, dec!(100000.50));
    }

    #[test]
    fn test_whitespace_and_case_tolerated() {
        let csv = "wage , bonus_election\n 8000 , Merged \n";

        let entries = load_from_str(csv).expect("should parse");

        assert_eq!(entries[0].input.bonus_election, BonusElection::Merged);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "elder_support,label,wage\n1000,carol,12000\n";

        let entries = load_from_str(csv).expect("column order should not matter");

        assert_eq!(entries[0].label, "carol");
        assert_eq!(entries[0].input.supplementary_monthly_total(), dec!(1000));
    }

    // -----------------------------------------------------------------------
    // 4. Errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_missing_wage_column_returns_parse_error() {
        let csv = "bonus\n1000\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::Parse(_) => {}
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_amount_reports_column_and_row() {
        let csv = "wage,bonus\n1000,0\n2000,lots\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::InvalidAmount { column, row, .. } => {
                assert_eq!(column, "bonus");
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_amount_rejected() {
        let csv = "wage,labor_income\n1000,-5\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::InvalidInput { row, source } => {
                assert_eq!(row, 1);
                assert_eq!(
                    source,
                    TaxInputError::Negative {
                        field: "labor income",
                        value: dec!(-5),
                    }
                );
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_amount_rejected() {
        let csv = "wage\n7000000000000000000000000000\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::InvalidInput { row, source } => {
                assert_eq!(row, 1);
                assert!(matches!(source, TaxInputError::TooLarge { field: "wage", .. }));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_wage_period() {
        let csv = "wage,wage_period\n1000,weekly\n";

        match load_from_str(csv).unwrap_err() {
            CsvLoadError::InvalidWagePeriod { value, row } => {
                assert_eq!(value, "weekly");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidWagePeriod, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_bonus_election() {
        let csv = "wage,bonus_election\n1000,later\n";

        assert!(matches!(
            load_from_str(csv).unwrap_err(),
            CsvLoadError::InvalidBonusElection { .. }
        ));
    }

    #[test]
    fn test_header_only_returns_empty_vec() {
        let entries = load_from_str("wage\n").expect("header-only CSV is valid");

        assert!(entries.is_empty());
    }
}
