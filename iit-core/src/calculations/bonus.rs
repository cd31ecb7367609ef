//! Separate taxation of a one-time annual bonus.
//!
//! The bonus is divided by twelve only to choose a marginal rate; the rate
//! and quick deduction are then applied to the whole bonus.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use iit_core::TaxYearConfig;
//! use iit_core::calculations::BonusTaxCalculator;
//!
//! let config = TaxYearConfig::default();
//! let calculator = BonusTaxCalculator::new(&config);
//!
//! // 36000 / 12 = 3000 sits on the first threshold: 3%
//! assert_eq!(calculator.tax(dec!(36000)), dec!(1080));
//! // 100000 / 12 ≈ 8333: 10%
//! assert_eq!(calculator.tax(dec!(100000)), dec!(7480));
//! ```

use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::calculations::common::MONTHS_PER_YEAR;
use crate::{TaxBracket, TaxYearConfig};

#[derive(Debug, Clone, Copy)]
pub struct BonusTaxCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> BonusTaxCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Tax on `bonus` when it is taxed on its own.
    ///
    /// Zero or negative bonuses match no bracket and owe nothing.
    pub fn tax(
        &self,
        bonus: Decimal,
    ) -> Decimal {
        if bonus <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let monthly_equivalent = self.monthly_equivalent(bonus);
        let Some(bracket) = self.select_bracket(monthly_equivalent) else {
            warn!(bonus = %bonus, "no bracket matched bonus; treating as untaxed");
            return Decimal::ZERO;
        };

        let tax = bracket.apply(bonus);
        trace!(
            bonus = %bonus,
            monthly_equivalent = %monthly_equivalent,
            rate = %bracket.rate,
            tax = %tax,
            "bonus bracket selected"
        );
        tax
    }

    /// Marginal rate the bonus would be taxed at.
    pub fn marginal_rate(
        &self,
        bonus: Decimal,
    ) -> Option<Decimal> {
        self.select_bracket(self.monthly_equivalent(bonus))
            .map(|b| b.rate)
    }

    fn monthly_equivalent(
        &self,
        bonus: Decimal,
    ) -> Decimal {
        bonus / Decimal::from(MONTHS_PER_YEAR)
    }

    /// Bracket with `lower / 12 < monthly_equivalent <= upper / 12`.
    fn select_bracket(
        &self,
        monthly_equivalent: Decimal,
    ) -> Option<&'a TaxBracket> {
        let months = Decimal::from(MONTHS_PER_YEAR);
        self.config.brackets.brackets().iter().find(|b| {
            monthly_equivalent > b.lower_bound / months
                && b.upper_bound
                    .is_none_or(|upper| monthly_equivalent <= upper / months)
        })
    }
}
