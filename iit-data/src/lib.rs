//! Loaders for bracket tables (CSV) and tax-year configuration (TOML).

mod bracket_loader;
mod config_loader;

pub use bracket_loader::{BracketLoaderError, BracketRecord, BracketTableLoader};
pub use config_loader::{ConfigLoaderError, TaxYearConfigLoader};
