//! Withholding, bonus and annual report calculations.
//!
//! Every calculator borrows a [`TaxYearConfig`](crate::TaxYearConfig) and
//! is cheap to construct; none of them hold state between calls.

pub mod common;

mod bonus;
mod cumulative;
mod optimizer;
mod report;

pub use bonus::BonusTaxCalculator;
pub use cumulative::{CumulativeTaxCalculator, MonthlyWithholding, PayPeriod, WithholdingError};
pub use optimizer::BonusPlanOptimizer;
pub use report::TaxReportBuilder;
