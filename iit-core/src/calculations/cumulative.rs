//! Cumulative withholding on wages.
//!
//! Each month's withholding is the tax on year-to-date taxable income minus
//! what has already been withheld this year:
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Cumulative income through month *m* |
//! | 2    | Cumulative deduction (basic deduction + other monthly deductions) × *m* |
//! | 3    | Taxable = line 1 − line 2; zero or less means no tax |
//! | 4    | Bracket with lower < taxable ≤ upper |
//! | 5    | Cumulative tax = taxable × rate − quick deduction |
//! | 6    | Withheld this month = line 5 − tax already withheld, minimum 0 |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use iit_core::TaxYearConfig;
//! use iit_core::calculations::CumulativeTaxCalculator;
//!
//! let config = TaxYearConfig::default();
//! let calculator = CumulativeTaxCalculator::new(&config);
//!
//! let schedule = calculator.withholding_schedule(dec!(10000), dec!(0));
//!
//! assert_eq!(schedule.len(), 12);
//! assert_eq!(schedule[0].withheld, dec!(150));
//! assert_eq!(schedule[11].cumulative_tax, dec!(3480));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::TaxYearConfig;
use crate::calculations::common::{MONTHS_PER_YEAR, non_negative};

/// Errors from the month-by-month withholding entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WithholdingError {
    /// Month outside 1..=12.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// More pay periods than months in the year.
    #[error("at most 12 pay periods per year, got {0}")]
    TooManyPeriods(usize),
}

/// Income and deductions for one month.
///
/// `deduction` excludes the basic deduction, which is added from the config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    pub income: Decimal,
    pub deduction: Decimal,
}

/// One row of a withholding schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyWithholding {
    /// 1-based month.
    pub month: u32,
    pub cumulative_income: Decimal,
    /// Includes the basic deduction.
    pub cumulative_deduction: Decimal,
    /// Tax on year-to-date taxable income.
    pub cumulative_tax: Decimal,
    /// Amount withheld in this month.
    pub withheld: Decimal,
}

/// Progressive tax on cumulative figures.
///
/// This is the only place bracket arithmetic for wages happens; the monthly
/// schedule, the bonus optimizer and the annual report all call [`tax`].
///
/// [`tax`]: CumulativeTaxCalculator::tax
#[derive(Debug, Clone, Copy)]
pub struct CumulativeTaxCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> CumulativeTaxCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Incremental tax due given year-to-date income, deductions and tax
    /// already paid.
    ///
    /// Returns zero when deductions cover income, and never returns a
    /// negative amount even if `prior_tax_paid` exceeds the cumulative tax.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use iit_core::TaxYearConfig;
    /// use iit_core::calculations::CumulativeTaxCalculator;
    ///
    /// let config = TaxYearConfig::default();
    /// let calculator = CumulativeTaxCalculator::new(&config);
    ///
    /// // (120000 - 60000) × 10% - 2520
    /// assert_eq!(calculator.tax(dec!(120000), dec!(60000), dec!(0)), dec!(3480));
    /// // 2980 already withheld through November
    /// assert_eq!(calculator.tax(dec!(120000), dec!(60000), dec!(2980)), dec!(500));
    /// ```
    pub fn tax(
        &self,
        cumulative_income: Decimal,
        cumulative_deduction: Decimal,
        prior_tax_paid: Decimal,
    ) -> Decimal {
        let taxable = cumulative_income - cumulative_deduction;
        if taxable <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let Some(bracket) = self.config.brackets.find(taxable) else {
            // Validated tables start at zero and end unbounded.
            warn!(taxable = %taxable, "no bracket matched taxable income; treating as untaxed");
            return Decimal::ZERO;
        };

        let total_tax = bracket.apply(taxable);
        trace!(
            taxable = %taxable,
            rate = %bracket.rate,
            total_tax = %total_tax,
            prior_tax_paid = %prior_tax_paid,
            "cumulative bracket selected"
        );

        non_negative(total_tax - prior_tax_paid)
    }

    /// Tax on cumulative figures with nothing withheld yet.
    pub fn total_tax(
        &self,
        cumulative_income: Decimal,
        cumulative_deduction: Decimal,
    ) -> Decimal {
        self.tax(cumulative_income, cumulative_deduction, Decimal::ZERO)
    }

    /// Withholding for a single `month` when income and deductions are the
    /// same every month.
    ///
    /// # Errors
    ///
    /// Returns [`WithholdingError::InvalidMonth`] unless `1 <= month <= 12`.
    pub fn monthly_withholding(
        &self,
        month: u32,
        monthly_income: Decimal,
        monthly_deduction: Decimal,
    ) -> Result<MonthlyWithholding, WithholdingError> {
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(WithholdingError::InvalidMonth(month));
        }

        let month_total = monthly_deduction + self.config.basic_deduction_monthly;
        let months = Decimal::from(month);
        let cumulative_income = monthly_income * months;
        let cumulative_deduction = month_total * months;

        let prior_tax_paid = if month > 1 {
            self.total_tax(
                cumulative_income - monthly_income,
                cumulative_deduction - month_total,
            )
        } else {
            Decimal::ZERO
        };

        Ok(MonthlyWithholding {
            month,
            cumulative_income,
            cumulative_deduction,
            cumulative_tax: self.total_tax(cumulative_income, cumulative_deduction),
            withheld: self.tax(cumulative_income, cumulative_deduction, prior_tax_paid),
        })
    }

    /// Full-year schedule for a constant monthly income and deduction.
    pub fn withholding_schedule(
        &self,
        monthly_income: Decimal,
        monthly_deduction: Decimal,
    ) -> Vec<MonthlyWithholding> {
        let periods = [PayPeriod {
            income: monthly_income,
            deduction: monthly_deduction,
        }; MONTHS_PER_YEAR as usize];

        self.accumulate(&periods)
    }

    /// Schedule for months whose income or deductions vary.
    ///
    /// Each month's withholding is reduced by the sum actually withheld in
    /// earlier months, so a low month after a high one withholds nothing
    /// rather than refunding.
    ///
    /// # Errors
    ///
    /// Returns [`WithholdingError::TooManyPeriods`] for more than twelve
    /// periods.
    pub fn schedule_for_periods(
        &self,
        periods: &[PayPeriod],
    ) -> Result<Vec<MonthlyWithholding>, WithholdingError> {
        if periods.len() > MONTHS_PER_YEAR as usize {
            return Err(WithholdingError::TooManyPeriods(periods.len()));
        }
        Ok(self.accumulate(periods))
    }

    fn accumulate(
        &self,
        periods: &[PayPeriod],
    ) -> Vec<MonthlyWithholding> {
        let mut cumulative_income = Decimal::ZERO;
        let mut cumulative_deduction = Decimal::ZERO;
        let mut withheld_so_far = Decimal::ZERO;

        periods
            .iter()
            .zip(1..)
            .map(|(period, month)| {
                cumulative_income += period.income;
                cumulative_deduction += period.deduction + self.config.basic_deduction_monthly;

                let withheld = self.tax(cumulative_income, cumulative_deduction, withheld_so_far);
                withheld_so_far += withheld;

                MonthlyWithholding {
                    month,
                    cumulative_income,
                    cumulative_deduction,
                    cumulative_tax: self.total_tax(cumulative_income, cumulative_deduction),
                    withheld,
                }
            })
            .collect()
    }
}
