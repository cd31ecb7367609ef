use std::fs;
use std::path::Path;

use iit_core::{TaxYearConfig, TaxYearConfigError};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a tax-year configuration.
#[derive(Debug, Error)]
pub enum ConfigLoaderError {
    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] TaxYearConfigError),
}

impl From<toml::de::Error> for ConfigLoaderError {
    fn from(err: toml::de::Error) -> Self {
        ConfigLoaderError::TomlParse(err.to_string())
    }
}

/// Loader for [`TaxYearConfig`] stored as TOML.
///
/// Every field is optional; missing ones take the 2024 defaults. Brackets are
/// given as an array of tables and validated as a whole:
///
/// ```toml
/// tax_year = 2024
/// basic_deduction_monthly = "5000"
/// pension_rate = "0.08"
/// housing_fund_max_rate = "0.12"
///
/// [[brackets]]
/// lower_bound = "0"
/// upper_bound = "36000"
/// rate = "0.03"
/// quick_deduction = "0"
/// ```
pub struct TaxYearConfigLoader;

impl TaxYearConfigLoader {
    /// Parse and validate a configuration from TOML text.
    pub fn parse(contents: &str) -> Result<TaxYearConfig, ConfigLoaderError> {
        let config: TaxYearConfig = toml::from_str(contents)?;
        config.validate()?;

        debug!(
            tax_year = config.tax_year,
            brackets = config.brackets.brackets().len(),
            "loaded tax-year config"
        );
        Ok(config)
    }

    /// Parse and validate a configuration file.
    pub fn parse_file(path: &Path) -> Result<TaxYearConfig, ConfigLoaderError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigLoaderError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&contents)
    }
}
