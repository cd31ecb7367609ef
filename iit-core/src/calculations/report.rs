//! Annual composite report: wages, bonus and flat-rate income.
//!
//! # Report Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Annual salary (monthly wage × 12, or annual wage as given) |
//! | 2    | Contributions: base × (pension + medical + unemployment + housing fund rate) × 12 |
//! | 3    | Supplementary deductions: sum of monthly categories × 12 |
//! | 4    | Total deductions: basic deduction × 12 + line 2 + line 3 |
//! | 5    | Salary tax on the cumulative schedule |
//! | 6    | Bonus tax (separately, or as the increase when merged) |
//! | 7    | Labor, manuscript and license tax at flat rates |
//! | 8    | Total tax, total income, taxable income, net income |
//! | 9    | Merged vs separate comparison when a bonus is present |
//!
//! A non-zero housing fund rate outside the year's permitted band (5–12% by
//! default) is moved to the nearest edge before line 2.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use iit_core::{TaxInput, TaxYearConfig};
//! use iit_core::calculations::TaxReportBuilder;
//!
//! let config = TaxYearConfig::default();
//! let input = TaxInput {
//!     wage: dec!(10000),
//!     ..Default::default()
//! };
//!
//! let result = TaxReportBuilder::new(&config).build(&input);
//!
//! assert_eq!(result.salary.tax, dec!(3480));
//! assert_eq!(result.net_income, dec!(116520));
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{annualize, non_negative};
use crate::calculations::{BonusPlanOptimizer, BonusTaxCalculator, CumulativeTaxCalculator};
use crate::{BonusElection, CategoryTax, Contributions, TaxInput, TaxResult, TaxYearConfig};

/// Builds a [`TaxResult`] from a [`TaxInput`].
///
/// The builder never validates its input; negative figures are floored so
/// they contribute no tax. Adapters reject bad input with
/// [`TaxInput::validate`] before calling [`build`](Self::build).
#[derive(Debug, Clone, Copy)]
pub struct TaxReportBuilder<'a> {
    config: &'a TaxYearConfig,
    cumulative: CumulativeTaxCalculator<'a>,
    bonus: BonusTaxCalculator<'a>,
    optimizer: BonusPlanOptimizer<'a>,
}

/// Annual deduction components.
struct Deductions {
    basic: Decimal,
    contributions: Contributions,
    supplementary: Decimal,
}

impl Deductions {
    fn total(&self) -> Decimal {
        self.basic + self.contributions.total() + self.supplementary
    }
}

impl<'a> TaxReportBuilder<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self {
            config,
            cumulative: CumulativeTaxCalculator::new(config),
            bonus: BonusTaxCalculator::new(config),
            optimizer: BonusPlanOptimizer::new(config),
        }
    }

    /// Computes the full report.
    pub fn build(
        &self,
        input: &TaxInput,
    ) -> TaxResult {
        let annual_salary = non_negative(input.annual_wage());
        let bonus_amount = non_negative(input.bonus);

        let deductions = self.deductions(input);
        let total_deductions = deductions.total();

        let salary = self.salary_tax(annual_salary, total_deductions);
        let bonus = self.bonus_tax(
            annual_salary,
            bonus_amount,
            total_deductions,
            salary.tax,
            input.bonus_election,
        );

        let labor = self.flat_tax(input.labor_income, self.config.labor_rate);
        let manuscript = self.flat_tax(input.manuscript_income, self.config.manuscript_rate);
        let license = self.flat_tax(input.license_income, self.config.license_rate);

        let total_tax = salary.tax + bonus.tax + labor.tax + manuscript.tax + license.tax;
        let total_income = annual_salary
            + bonus_amount
            + labor.taxable_income
            + manuscript.taxable_income
            + license.taxable_income;
        let total_taxable_income = non_negative(total_income - total_deductions);
        let net_income = total_income - total_tax - deductions.contributions.total();

        let bonus_plan = (bonus_amount > Decimal::ZERO)
            .then(|| self.optimizer.optimize(annual_salary, bonus_amount, total_deductions));

        debug!(
            total_income = %total_income,
            total_deductions = %total_deductions,
            total_tax = %total_tax,
            election = %input.bonus_election,
            "tax report built"
        );

        TaxResult {
            annual_salary,
            salary,
            bonus,
            labor,
            manuscript,
            license,
            bonus_election: input.bonus_election,
            basic_deduction: deductions.basic,
            contributions: deductions.contributions,
            supplementary_deductions: deductions.supplementary,
            total_deductions,
            total_income,
            total_taxable_income,
            total_tax,
            net_income,
            bonus_plan,
        }
    }

    fn deductions(
        &self,
        input: &TaxInput,
    ) -> Deductions {
        let base = non_negative(input.social_insurance_base);
        let requested_rate = non_negative(input.housing_fund_rate);
        let housing_fund_rate = self.config.clamp_housing_fund_rate(requested_rate);
        if housing_fund_rate != requested_rate {
            warn!(
                requested = %requested_rate,
                applied = %housing_fund_rate,
                "housing fund rate outside permitted band"
            );
        }

        let supplementary = input
            .supplementary_deductions
            .values()
            .copied()
            .map(non_negative)
            .sum::<Decimal>();

        Deductions {
            basic: self.config.basic_deduction_annual(),
            contributions: Contributions {
                pension: annualize(base * self.config.pension_rate),
                medical: annualize(base * self.config.medical_rate),
                unemployment: annualize(base * self.config.unemployment_rate),
                housing_fund: annualize(base * housing_fund_rate),
                housing_fund_rate,
            },
            supplementary: annualize(supplementary),
        }
    }

    fn salary_tax(
        &self,
        annual_salary: Decimal,
        total_deductions: Decimal,
    ) -> CategoryTax {
        CategoryTax {
            taxable_income: non_negative(annual_salary - total_deductions),
            tax: self.cumulative.total_tax(annual_salary, total_deductions),
        }
    }

    /// Under `Merged` the bonus's share is the increase in cumulative tax it
    /// causes, so `salary.tax + bonus.tax` equals the merged total.
    fn bonus_tax(
        &self,
        annual_salary: Decimal,
        bonus: Decimal,
        total_deductions: Decimal,
        salary_tax: Decimal,
        election: BonusElection,
    ) -> CategoryTax {
        let tax = match election {
            BonusElection::Separate => self.bonus.tax(bonus),
            BonusElection::Merged => {
                let merged_total = self
                    .cumulative
                    .total_tax(annual_salary + bonus, total_deductions);
                non_negative(merged_total - salary_tax)
            }
        };

        CategoryTax {
            taxable_income: bonus,
            tax,
        }
    }

    fn flat_tax(
        &self,
        income: Decimal,
        rate: Decimal,
    ) -> CategoryTax {
        let income = non_negative(income);
        CategoryTax {
            taxable_income: income,
            tax: income * rate,
        }
    }
}
