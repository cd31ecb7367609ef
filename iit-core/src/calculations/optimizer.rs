//! Merged vs separate bonus comparison.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use iit_core::{BonusElection, TaxYearConfig};
//! use iit_core::calculations::BonusPlanOptimizer;
//!
//! let config = TaxYearConfig::default();
//! let optimizer = BonusPlanOptimizer::new(&config);
//!
//! let plan = optimizer.optimize(dec!(120000), dec!(30000), dec!(60000));
//!
//! // Separate: 3480 + 900. Merged: 90000 × 10% - 2520 = 6480.
//! assert_eq!(plan.separate.tax, dec!(4380));
//! assert_eq!(plan.merged.tax, dec!(6480));
//! assert_eq!(plan.recommendation, BonusElection::Separate);
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::{BonusTaxCalculator, CumulativeTaxCalculator};
use crate::{BonusElection, BonusPlan, Scenario, TaxYearConfig};

#[derive(Debug, Clone, Copy)]
pub struct BonusPlanOptimizer<'a> {
    cumulative: CumulativeTaxCalculator<'a>,
    bonus: BonusTaxCalculator<'a>,
}

impl<'a> BonusPlanOptimizer<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self {
            cumulative: CumulativeTaxCalculator::new(config),
            bonus: BonusTaxCalculator::new(config),
        }
    }

    /// Compares taxing `bonus` with annual wages against taxing it alone.
    ///
    /// `annual_deductions` is the full deduction for the year, basic
    /// deduction included. Merged is recommended only when its net income is
    /// strictly higher; a tie goes to separate.
    pub fn optimize(
        &self,
        annual_salary: Decimal,
        bonus: Decimal,
        annual_deductions: Decimal,
    ) -> BonusPlan {
        let gross = annual_salary + bonus;

        let merged = self.merged_scenario(annual_salary, bonus, annual_deductions);
        let separate = self.separate_scenario(annual_salary, bonus, annual_deductions);

        let recommendation = if merged.net_income > separate.net_income {
            BonusElection::Merged
        } else {
            if merged.net_income == separate.net_income {
                debug!(gross = %gross, "bonus elections tie; keeping separate");
            }
            BonusElection::Separate
        };

        debug!(
            merged_tax = %merged.tax,
            separate_tax = %separate.tax,
            recommendation = %recommendation,
            "bonus plan compared"
        );

        BonusPlan {
            merged,
            separate,
            recommendation,
        }
    }

    fn merged_scenario(
        &self,
        annual_salary: Decimal,
        bonus: Decimal,
        annual_deductions: Decimal,
    ) -> Scenario {
        let income = annual_salary + bonus;
        let tax = self.cumulative.total_tax(income, annual_deductions);
        Scenario {
            tax,
            net_income: income - tax,
        }
    }

    fn separate_scenario(
        &self,
        annual_salary: Decimal,
        bonus: Decimal,
        annual_deductions: Decimal,
    ) -> Scenario {
        let salary_tax = self.cumulative.total_tax(annual_salary, annual_deductions);
        let bonus_tax = self.bonus.tax(bonus);
        let tax = salary_tax + bonus_tax;
        Scenario {
            tax,
            net_income: annual_salary + bonus - tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // scenario tests
    // =========================================================================

    #[test]
    fn separate_tax_is_salary_tax_plus_bonus_tax() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        let plan = optimizer.optimize(dec!(300000), dec!(100000), dec!(60000));

        let salary_tax = CumulativeTaxCalculator::new(&config).total_tax(dec!(300000), dec!(60000));
        let bonus_tax = BonusTaxCalculator::new(&config).tax(dec!(100000));
        assert_eq!(plan.separate.tax, salary_tax + bonus_tax);
        // 240000 × 20% - 16920 = 31080; 100000 × 10% - 2520 = 7480
        assert_eq!(plan.separate.tax, dec!(38560));
        assert_eq!(plan.separate.net_income, dec!(361440));
    }

    #[test]
    fn merged_tax_uses_combined_income() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        let plan = optimizer.optimize(dec!(300000), dec!(100000), dec!(60000));

        // 340000 × 25% - 31920
        assert_eq!(plan.merged.tax, dec!(53080));
        assert_eq!(plan.merged.net_income, dec!(346920));
        assert_eq!(plan.recommendation, BonusElection::Separate);
    }

    #[test]
    fn merged_recommended_when_salary_below_deductions() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        // Salary leaves 40000 of deduction unused, absorbing most of the bonus.
        let plan = optimizer.optimize(dec!(20000), dec!(50000), dec!(60000));

        // Merged: 10000 × 3% = 300. Separate: 0 + 50000 × 10% - 2520 = 2480.
        assert_eq!(plan.merged.tax, dec!(300));
        assert_eq!(plan.separate.tax, dec!(2480));
        assert_eq!(plan.recommendation, BonusElection::Merged);
        assert_eq!(plan.tax_savings(), dec!(2180));
    }

    #[test]
    fn separate_pulls_ahead_once_merged_income_changes_band() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        // Salary taxable 10000. A 20000 bonus keeps merged income in the 3%
        // band, so both elections cost 900.
        let small = optimizer.optimize(dec!(70000), dec!(20000), dec!(60000));
        assert_eq!(small.merged.tax, small.separate.tax);
        assert_eq!(small.tax_savings(), dec!(0));

        // A 100000 bonus pushes merged income to 110000 in the 10% band:
        // 8480 merged vs 300 + 7480 separate.
        let large = optimizer.optimize(dec!(70000), dec!(100000), dec!(60000));
        assert_eq!(large.merged.tax, dec!(8480));
        assert_eq!(large.separate.tax, dec!(7780));
        assert_eq!(large.recommendation, BonusElection::Separate);
        assert_eq!(large.tax_savings(), dec!(700));
    }

    #[test]
    fn recommendation_flips_with_unused_deductions() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        let fully_used = optimizer.optimize(dec!(96000), dec!(40000), dec!(60000));
        let unused = optimizer.optimize(dec!(50000), dec!(40000), dec!(60000));

        assert_eq!(fully_used.recommendation, BonusElection::Separate);
        assert_eq!(unused.recommendation, BonusElection::Merged);
    }

    #[test]
    fn tie_goes_to_separate() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        // No salary tax, bonus in first band either way: both 36000 × 3%.
        let plan = optimizer.optimize(dec!(60000), dec!(36000), dec!(60000));

        assert_eq!(plan.merged.net_income, plan.separate.net_income);
        assert_eq!(plan.recommendation, BonusElection::Separate);
    }

    #[test]
    fn zero_bonus_scenarios_are_identical() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        let plan = optimizer.optimize(dec!(180000), dec!(0), dec!(60000));

        assert_eq!(plan.merged, plan.separate);
        assert_eq!(plan.tax_savings(), dec!(0));
    }

    #[test]
    fn recommended_returns_matching_scenario() {
        let config = TaxYearConfig::default();
        let optimizer = BonusPlanOptimizer::new(&config);

        let plan = optimizer.optimize(dec!(20000), dec!(50000), dec!(60000));

        assert_eq!(plan.recommended(), &plan.merged);
    }
}
