use iit_core::calculations::common::round_half_up;
use iit_core::{BonusElection, WagePeriod};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
/// Sign is preserved; rejecting negatives is left to [`iit_core::TaxInput::validate`].
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a percentage (e.g. `"7"` or `"7%"`) into a fraction (`0.07`).
pub fn parse_percent(s: &str) -> Result<Decimal, ParseDecimalError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    Ok(parse_decimal(number)? / Decimal::ONE_HUNDRED)
}

pub fn parse_wage_period(s: &str) -> Result<WagePeriod, String> {
    WagePeriod::parse(&s.trim().to_lowercase())
        .ok_or_else(|| format!("expected 'monthly' or 'annual', got '{s}'"))
}

pub fn parse_bonus_election(s: &str) -> Result<BonusElection, String> {
    BonusElection::parse(&s.trim().to_lowercase())
        .ok_or_else(|| format!("expected 'separate' or 'merged', got '{s}'"))
}

/// Formats money with two decimals and comma grouping (`1,234,567.89`).
pub fn format_money(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
