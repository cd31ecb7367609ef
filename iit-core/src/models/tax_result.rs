use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BonusElection, BonusPlan};

/// Taxable base and tax for one income category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTax {
    pub taxable_income: Decimal,
    pub tax: Decimal,
}

/// Employee contributions for the year, each annualized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributions {
    pub pension: Decimal,
    pub medical: Decimal,
    pub unemployment: Decimal,
    pub housing_fund: Decimal,

    /// Housing fund rate after moving it into the permitted band.
    pub housing_fund_rate: Decimal,
}

impl Contributions {
    /// Pension, medical and unemployment insurance together.
    pub fn social_insurance(&self) -> Decimal {
        self.pension + self.medical + self.unemployment
    }

    pub fn total(&self) -> Decimal {
        self.social_insurance() + self.housing_fund
    }
}

/// Composite annual report produced by
/// [`TaxReportBuilder`](crate::calculations::TaxReportBuilder).
///
/// Every field is derived from the input and config; building the same input
/// twice gives an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Gross annual wages, before any deduction.
    pub annual_salary: Decimal,

    // Income categories
    pub salary: CategoryTax,
    pub bonus: CategoryTax,
    pub labor: CategoryTax,
    pub manuscript: CategoryTax,
    pub license: CategoryTax,

    /// Election used for `bonus`. Under `Merged` the bonus tax is the
    /// increase in salary tax caused by the bonus, not a separate charge.
    pub bonus_election: BonusElection,

    // Deductions (annual)
    pub basic_deduction: Decimal,
    pub contributions: Contributions,
    pub supplementary_deductions: Decimal,
    pub total_deductions: Decimal,

    // Totals
    pub total_income: Decimal,
    pub total_taxable_income: Decimal,
    pub total_tax: Decimal,
    pub net_income: Decimal,

    /// Merged vs separate comparison, present when there is a bonus.
    pub bonus_plan: Option<BonusPlan>,
}
