//! Command implementations shared by the `iit` binary and its tests.
//!
//! Each `run_*` function takes already-parsed arguments and a resolved
//! [`TaxYearConfig`], validates the figures, calls the engine and returns the
//! rendered output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use iit_core::calculations::common::annualize;
use iit_core::calculations::{BonusPlanOptimizer, CumulativeTaxCalculator, TaxReportBuilder};
use iit_core::{
    BonusElection, DeductionCategory, TaxInput, TaxResult, TaxYearConfig, WagePeriod, check_amount,
};
use iit_data::{BracketTableLoader, TaxYearConfigLoader};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::csv_loader;
use crate::render::{BonusPlanView, MonthView, OutputFormat, ReportView, ScheduleView, render};
use crate::utils::{parse_bonus_election, parse_decimal, parse_percent, parse_wage_period};

// ─── configuration ───────────────────────────────────────────────────────────

/// Resolves the tax-year configuration.
///
/// Starts from the built-in 2024 regime, replaces it with `config_path` when
/// given, then swaps in the bracket table from `brackets_path`. The CSV table
/// for the configured tax year is used; if the file has no rows for that
/// year, its latest year is used instead.
pub fn load_config(
    config_path: Option<&Path>,
    brackets_path: Option<&Path>,
) -> Result<TaxYearConfig> {
    let mut config = match config_path {
        Some(path) => TaxYearConfigLoader::parse_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => TaxYearConfig::default(),
    };

    if let Some(path) = brackets_path {
        let records = BracketTableLoader::parse_file(path)
            .with_context(|| format!("Failed to parse brackets: {}", path.display()))?;

        let years = BracketTableLoader::years(&records);
        let year = if years.contains(&config.tax_year) {
            config.tax_year
        } else {
            let latest = years
                .last()
                .copied()
                .with_context(|| format!("No brackets in: {}", path.display()))?;
            warn!(
                configured = config.tax_year,
                using = latest,
                "bracket file has no rows for the configured tax year"
            );
            latest
        };

        config.brackets = BracketTableLoader::table_for_year(&records, year)
            .with_context(|| format!("Invalid brackets in: {}", path.display()))?;
    }

    info!(
        tax_year = config.tax_year,
        brackets = config.brackets.brackets().len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Rejects negative amounts and amounts above [`iit_core::MAX_AMOUNT`].
fn check_amounts(fields: &[(&'static str, Decimal)]) -> Result<()> {
    for &(field, value) in fields {
        check_amount(field, value)?;
    }
    Ok(())
}

// ─── report ──────────────────────────────────────────────────────────────────

/// Annual report for one taxpayer.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// Wage amount, monthly or annual per --salary-period
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub salary: Decimal,

    /// Whether --salary is a monthly or annual figure
    #[arg(long, default_value = "monthly", value_parser = parse_wage_period)]
    pub salary_period: WagePeriod,

    /// Annual one-time bonus
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub bonus: Decimal,

    /// How the bonus is taxed: separate or merged
    #[arg(long, default_value = "separate", value_parser = parse_bonus_election)]
    pub bonus_election: BonusElection,

    /// Annual labor-service remuneration
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub labor: Decimal,

    /// Annual author's remuneration
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub manuscript: Decimal,

    /// Annual royalties and license fees
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub license: Decimal,

    /// Monthly base for social insurance and housing fund
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub social_insurance_base: Decimal,

    /// Housing fund contribution in percent of the base (e.g. 7); non-zero
    /// values are moved into the year's permitted band
    #[arg(long, default_value = "0", value_parser = parse_percent, allow_hyphen_values = true)]
    pub housing_fund_percent: Decimal,

    /// Monthly children's education deduction
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub children_education: Decimal,

    /// Monthly continuing education deduction
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub continuing_education: Decimal,

    /// Monthly housing loan interest deduction
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub housing_loan_interest: Decimal,

    /// Monthly housing rent deduction
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub housing_rent: Decimal,

    /// Monthly elder support deduction
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub elder_support: Decimal,
}

impl ReportArgs {
    pub fn to_input(&self) -> TaxInput {
        let supplementary_deductions: BTreeMap<_, _> = [
            (DeductionCategory::ChildrenEducation, self.children_education),
            (DeductionCategory::ContinuingEducation, self.continuing_education),
            (DeductionCategory::HousingLoanInterest, self.housing_loan_interest),
            (DeductionCategory::HousingRent, self.housing_rent),
            (DeductionCategory::ElderSupport, self.elder_support),
        ]
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .collect();

        TaxInput {
            wage: self.salary,
            wage_period: self.salary_period,
            bonus: self.bonus,
            bonus_election: self.bonus_election,
            labor_income: self.labor,
            manuscript_income: self.manuscript,
            license_income: self.license,
            social_insurance_base: self.social_insurance_base,
            housing_fund_rate: self.housing_fund_percent,
            supplementary_deductions,
        }
    }
}

pub fn run_report(
    config: &TaxYearConfig,
    args: &ReportArgs,
    format: OutputFormat,
) -> Result<String> {
    let input = args.to_input();
    input.validate().context("Invalid report input")?;

    let result = TaxReportBuilder::new(config).build(&input);
    debug!(total_tax = %result.total_tax, "report computed");

    Ok(render(format, &result, ReportView(&result))?)
}

// ─── monthly withholding ─────────────────────────────────────────────────────

/// Cumulative withholding for a constant monthly salary.
#[derive(Debug, Clone, Default, Args)]
pub struct MonthlyArgs {
    /// Monthly salary
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub income: Decimal,

    /// Monthly deductions besides the basic deduction
    /// (contributions plus supplementary deductions)
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub deductions: Decimal,

    /// Show a single month (1-12) instead of the full year
    #[arg(long)]
    pub month: Option<u32>,
}

pub fn run_monthly(
    config: &TaxYearConfig,
    args: &MonthlyArgs,
    format: OutputFormat,
) -> Result<String> {
    check_amounts(&[("income", args.income), ("deductions", args.deductions)])
        .context("Invalid monthly input")?;

    let calculator = CumulativeTaxCalculator::new(config);

    match args.month {
        Some(month) => {
            let row = calculator
                .monthly_withholding(month, args.income, args.deductions)
                .context("Invalid month")?;
            Ok(render(format, &row, MonthView(&row))?)
        }
        None => {
            let schedule = calculator.withholding_schedule(args.income, args.deductions);
            Ok(render(format, &schedule, ScheduleView(&schedule))?)
        }
    }
}

// ─── bonus comparison ────────────────────────────────────────────────────────

/// Merged vs separate comparison for an annual bonus.
#[derive(Debug, Clone, Default, Args)]
pub struct BonusArgs {
    /// Annual salary
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub salary: Decimal,

    /// Annual one-time bonus
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub bonus: Decimal,

    /// Monthly deductions besides the basic deduction
    #[arg(long, default_value = "0", value_parser = parse_decimal, allow_hyphen_values = true)]
    pub deductions: Decimal,
}

pub fn run_bonus(
    config: &TaxYearConfig,
    args: &BonusArgs,
    format: OutputFormat,
) -> Result<String> {
    check_amounts(&[
        ("salary", args.salary),
        ("bonus", args.bonus),
        ("deductions", args.deductions),
    ])
    .context("Invalid bonus input")?;

    let annual_deductions = config.basic_deduction_annual() + annualize(args.deductions);
    let plan = BonusPlanOptimizer::new(config).optimize(args.salary, args.bonus, annual_deductions);

    Ok(render(format, &plan, BonusPlanView(&plan))?)
}

// ─── batch ───────────────────────────────────────────────────────────────────

/// One report per row of a CSV file.
#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// CSV file with one taxpayer per row
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct BatchReport<'a> {
    label: &'a str,
    result: &'a TaxResult,
}

pub fn run_batch(
    config: &TaxYearConfig,
    args: &BatchArgs,
    format: OutputFormat,
) -> Result<String> {
    let entries = csv_loader::load_from_file(&args.file)
        .with_context(|| format!("Failed to load batch file: {}", args.file.display()))?;
    info!(rows = entries.len(), "batch loaded");

    let builder = TaxReportBuilder::new(config);
    let results: Vec<TaxResult> = entries.iter().map(|e| builder.build(&e.input)).collect();

    match format {
        OutputFormat::Json => {
            let reports: Vec<BatchReport<'_>> = entries
                .iter()
                .zip(&results)
                .map(|(entry, result)| BatchReport {
                    label: &entry.label,
                    result,
                })
                .collect();
            Ok(serde_json::to_string_pretty(&reports)?)
        }
        OutputFormat::Text => Ok(entries
            .iter()
            .zip(&results)
            .map(|(entry, result)| format!("== {} ==\n{}", entry.label, ReportView(result)))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
