use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use iit_core::{BracketTable, BracketTableError, TaxBracket};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading bracket data.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("No brackets found for tax year {0}")]
    YearNotFound(i32),

    #[error("Invalid bracket table for tax year {year}: {source}")]
    InvalidTable {
        year: i32,
        #[source]
        source: BracketTableError,
    },
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a bracket CSV file.
///
/// Columns:
/// - `tax_year`: the tax year (e.g., 2024)
/// - `lower_bound`: exclusive lower bound of annual taxable income
/// - `upper_bound`: inclusive upper bound (empty for the top band)
/// - `rate`: marginal rate as a fraction (e.g., 0.03 for 3%)
/// - `quick_deduction`: quick deduction for the band
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub quick_deduction: Decimal,
}

impl BracketRecord {
    pub fn to_bracket(&self) -> TaxBracket {
        TaxBracket {
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            rate: self.rate,
            quick_deduction: self.quick_deduction,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket tables stored as CSV.
///
/// A file may hold several tax years; [`table_for_year`](Self::table_for_year)
/// picks one out and validates it.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed bracket records");
        Ok(records)
    }

    /// Parse bracket records from a file on disk.
    pub fn parse_file(path: &Path) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let file = File::open(path).map_err(|e| BracketLoaderError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(file)
    }

    /// Tax years present in `records`, ascending.
    pub fn years(records: &[BracketRecord]) -> BTreeSet<i32> {
        records.iter().map(|r| r.tax_year).collect()
    }

    /// Builds the validated table for `year`.
    ///
    /// Rows are ordered by lower bound before validation, so the file order
    /// within a year does not matter.
    pub fn table_for_year(
        records: &[BracketRecord],
        year: i32,
    ) -> Result<BracketTable, BracketLoaderError> {
        let mut brackets: Vec<TaxBracket> = records
            .iter()
            .filter(|r| r.tax_year == year)
            .map(BracketRecord::to_bracket)
            .collect();

        if brackets.is_empty() {
            return Err(BracketLoaderError::YearNotFound(year));
        }

        brackets.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));

        BracketTable::new(brackets)
            .map_err(|source| BracketLoaderError::InvalidTable { year, source })
    }
}
