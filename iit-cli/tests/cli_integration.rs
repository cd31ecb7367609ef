//! Integration tests that drive the command implementations against on-disk
//! fixture files.
//!
//! These complement the unit tests inside the crate (which all use inline
//! values) by verifying the full read-from-disk path end-to-end.

use std::path::{Path, PathBuf};

use iit_cli::app::{self, BatchArgs, MonthlyArgs, ReportArgs};
use iit_cli::csv_loader;
use iit_cli::render::OutputFormat;
use iit_core::BonusElection;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn money(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
}

// =============================================================================
// batch
// =============================================================================

#[test]
fn test_load_batch_fixture() {
    let entries = csv_loader::load_from_file(&fixture("batch_inputs.csv"))
        .expect("fixture file should load without error");

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].label, "monthly-10k");
    assert_eq!(entries[2].input.wage, dec!(300000));
    assert_eq!(entries[2].input.bonus_election, BonusElection::Merged);
}

#[test]
fn test_run_batch_json() {
    let config = app::load_config(None, None).expect("default config");
    let args = BatchArgs {
        file: fixture("batch_inputs.csv"),
    };

    let json = app::run_batch(&config, &args, OutputFormat::Json).expect("batch");
    let reports: Value = serde_json::from_str(&json).expect("valid JSON");

    assert_eq!(reports[0]["label"], "monthly-10k");
    assert_eq!(money(&reports[0]["result"]["total_tax"]), dec!(3480));

    // Contributions 10000 × (8% + 2% + 0.5% + 7%) × 12 = 21000
    let mixed = &reports[1]["result"];
    assert_eq!(money(&mixed["contributions"]["housing_fund"]), dec!(8400));
    assert_eq!(money(&mixed["total_tax"]), dec!(13960));
    assert_eq!(money(&mixed["net_income"]), dec!(282040));

    // Merged: 340000 × 25% - 31920 in total, of which 22000 is the bonus's share
    let merged = &reports[2]["result"];
    assert_eq!(money(&merged["salary"]["tax"]), dec!(31080));
    assert_eq!(money(&merged["bonus"]["tax"]), dec!(22000));
    assert_eq!(money(&merged["total_tax"]), dec!(53080));
    assert_eq!(merged["bonus_plan"]["recommendation"], "separate");
    assert_eq!(money(&merged["annual_salary"]), dec!(300000));
}

#[test]
fn test_run_batch_text_has_one_section_per_row() {
    let config = app::load_config(None, None).expect("default config");
    let args = BatchArgs {
        file: fixture("batch_inputs.csv"),
    };

    let text = app::run_batch(&config, &args, OutputFormat::Text).expect("batch");

    assert_eq!(text.matches("== ").count(), 3);
    assert!(text.contains("== annual-merged =="));
    assert_eq!(text.matches("Housing fund (7%)").count(), 1);
}

#[test]
fn test_run_batch_missing_file() {
    let config = app::load_config(None, None).expect("default config");
    let args = BatchArgs {
        file: fixture("does_not_exist.csv"),
    };

    let err = app::run_batch(&config, &args, OutputFormat::Text).expect_err("missing");

    assert!(err.to_string().contains("Failed to load batch file"));
}

// =============================================================================
// configuration
// =============================================================================

#[test]
fn test_config_and_brackets_together() {
    let config = app::load_config(
        Some(&fixture("low_deduction.toml")),
        Some(&fixture("flat_brackets_2030.csv")),
    )
    .expect("config");

    assert_eq!(config.tax_year, 2030);
    assert_eq!(config.brackets.brackets().len(), 2);

    let args = ReportArgs {
        salary: dec!(10000),
        ..Default::default()
    };
    let json = app::run_report(&config, &args, OutputFormat::Json).expect("report");
    let value: Value = serde_json::from_str(&json).expect("valid JSON");

    // 120000 - 36000 = 84000 at 10%
    assert_eq!(money(&value["total_tax"]), dec!(8400));
}

#[test]
fn test_brackets_fall_back_to_latest_year() {
    let config = app::load_config(None, Some(&fixture("flat_brackets_2030.csv"))).expect("config");

    assert_eq!(config.tax_year, 2024);
    assert_eq!(config.brackets.brackets()[0].rate, dec!(0.10));
}

#[test]
fn test_missing_config_file_reports_path() {
    let err = app::load_config(Some(&fixture("nope.toml")), None).expect_err("missing");

    assert!(err.to_string().contains("nope.toml"));
}

// =============================================================================
// monthly
// =============================================================================

#[test]
fn test_monthly_schedule_json_sums_to_annual_tax() {
    let config = app::load_config(None, None).expect("default config");
    let args = MonthlyArgs {
        income: dec!(10000),
        deductions: dec!(0),
        month: None,
    };

    let json = app::run_monthly(&config, &args, OutputFormat::Json).expect("schedule");
    let rows: Value = serde_json::from_str(&json).expect("valid JSON");
    let rows = rows.as_array().expect("array");

    let total: Decimal = rows.iter().map(|row| money(&row["withheld"])).sum();
    assert_eq!(rows.len(), 12);
    assert_eq!(total, dec!(3480));
    assert_eq!(money(&rows[11]["cumulative_tax"]), dec!(3480));
}
