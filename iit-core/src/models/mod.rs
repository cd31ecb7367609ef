mod bracket_table;
mod scenario;
mod tax_bracket;
mod tax_input;
mod tax_result;
mod tax_year_config;

pub use bracket_table::{BracketTable, BracketTableError, STANDARD_ANNUAL_BRACKETS};
pub use scenario::{BonusPlan, Scenario};
pub use tax_bracket::TaxBracket;
pub use tax_input::{
    BonusElection, DeductionCategory, MAX_AMOUNT, TaxInput, TaxInputError, WagePeriod, check_amount,
};
pub use tax_result::{CategoryTax, Contributions, TaxResult};
pub use tax_year_config::{TaxYearConfig, TaxYearConfigError};
