use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use iit_data::{BracketTableLoader, TaxYearConfigLoader};

/// Validate bracket CSV files and tax-year TOML files.
///
/// The CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2024)
/// - lower_bound: Exclusive lower bound of annual taxable income
/// - upper_bound: Inclusive upper bound (empty for the top band)
/// - rate: The marginal rate as a decimal (e.g., 0.03)
/// - quick_deduction: The quick deduction for the band
#[derive(Parser, Debug)]
#[command(name = "iit-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV file containing bracket data
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Path to a TOML tax-year configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.brackets.is_none() && args.config.is_none() {
        anyhow::bail!("Nothing to check: pass --brackets and/or --config");
    }

    if let Some(path) = &args.brackets {
        println!("Checking brackets in: {}", path.display());

        let records = BracketTableLoader::parse_file(path)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;

        for year in BracketTableLoader::years(&records) {
            let table = BracketTableLoader::table_for_year(&records, year)
                .with_context(|| format!("Invalid brackets in: {}", path.display()))?;
            println!("  {}: {} brackets", year, table.brackets().len());
        }
    }

    if let Some(path) = &args.config {
        println!("Checking config in: {}", path.display());

        let config = TaxYearConfigLoader::parse_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;

        println!(
            "  {}: {} brackets, basic deduction {}/month",
            config.tax_year,
            config.brackets.brackets().len(),
            config.basic_deduction_monthly
        );
    }

    Ok(())
}
