use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use iit_cli::app::{self, BatchArgs, BonusArgs, MonthlyArgs, ReportArgs};
use iit_cli::logging;
use iit_cli::render::OutputFormat;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Individual income tax calculator.
///
/// Computes cumulative monthly withholding, separate bonus taxation, and the
/// annual composite report, and compares the two bonus elections.
#[derive(Debug, Parser)]
#[command(name = "iit", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Tax-year configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bracket table override (CSV).
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    /// Log level or EnvFilter directive; overrides `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Annual report for wages, bonus and flat-rate income
    Report(ReportArgs),
    /// Cumulative withholding for a constant monthly salary
    Monthly(MonthlyArgs),
    /// Compare merged and separate taxation of an annual bonus
    Bonus(BonusArgs),
    /// One annual report per row of a CSV file
    Batch(BatchArgs),
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;
    debug!(?cli, "starting");

    let config = app::load_config(cli.config.as_deref(), cli.brackets.as_deref())?;

    let output = match &cli.command {
        Command::Report(args) => app::run_report(&config, args, cli.output)?,
        Command::Monthly(args) => app::run_monthly(&config, args, cli.output)?,
        Command::Bonus(args) => app::run_bonus(&config, args, cli.output)?,
        Command::Batch(args) => app::run_batch(&config, args, cli.output)?,
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
