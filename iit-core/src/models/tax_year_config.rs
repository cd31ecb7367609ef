use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BracketTable, MAX_AMOUNT};

/// Errors found while validating a [`TaxYearConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxYearConfigError {
    #[error("basic deduction must be non-negative, got {0}")]
    NegativeBasicDeduction(Decimal),

    #[error("basic deduction must be at most {max}, got {0}", max = MAX_AMOUNT)]
    BasicDeductionTooLarge(Decimal),

    #[error("{name} must be between 0 and 1, got {rate}")]
    InvalidRate { name: &'static str, rate: Decimal },

    #[error("housing fund band is inverted: minimum {min} exceeds maximum {max}")]
    InvalidHousingFundBand { min: Decimal, max: Decimal },
}

/// Everything a calculation needs to know about one tax year.
///
/// Passed by reference into every calculator; there is no global default
/// instance. Scalar fields missing from a deserialized config fall back to
/// the 2024 values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxYearConfig {
    pub tax_year: i32,

    /// Annual cumulative schedule, also used for bonus rate selection.
    pub brackets: BracketTable,

    /// Basic deduction per month (5 000 since 2018-10).
    pub basic_deduction_monthly: Decimal,

    // Employee social insurance shares, as fractions of the monthly base
    pub pension_rate: Decimal,
    pub medical_rate: Decimal,
    pub unemployment_rate: Decimal,

    /// Lowest housing fund rate an employee may elect.
    pub housing_fund_min_rate: Decimal,

    /// Highest housing fund rate an employee may elect.
    pub housing_fund_max_rate: Decimal,

    /// Flat rate on labor-service remuneration.
    pub labor_rate: Decimal,

    /// Flat rate on author's remuneration. 14% is 20% on a base reduced to 70%.
    pub manuscript_rate: Decimal,

    /// Flat rate on royalties and license fees.
    pub license_rate: Decimal,
}

impl Default for TaxYearConfig {
    fn default() -> Self {
        Self {
            tax_year: 2024,
            brackets: BracketTable::standard(),
            basic_deduction_monthly: dec!(5000),
            pension_rate: dec!(0.08),
            medical_rate: dec!(0.02),
            unemployment_rate: dec!(0.005),
            housing_fund_min_rate: dec!(0.05),
            housing_fund_max_rate: dec!(0.12),
            labor_rate: dec!(0.20),
            manuscript_rate: dec!(0.14),
            license_rate: dec!(0.20),
        }
    }
}

impl TaxYearConfig {
    pub fn basic_deduction_annual(&self) -> Decimal {
        self.basic_deduction_monthly * Decimal::from(12)
    }

    /// Combined employee social insurance rate.
    pub fn social_insurance_rate(&self) -> Decimal {
        self.pension_rate + self.medical_rate + self.unemployment_rate
    }

    /// Moves a requested housing fund rate into the permitted band.
    ///
    /// Zero means the employee does not contribute and is kept as is.
    pub fn clamp_housing_fund_rate(
        &self,
        requested: Decimal,
    ) -> Decimal {
        if requested <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        requested.clamp(self.housing_fund_min_rate, self.housing_fund_max_rate)
    }

    /// Checks the scalar parameters. The bracket table validates itself on
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`TaxYearConfigError`] for a basic deduction outside
    /// `0..=MAX_AMOUNT`, any rate outside `[0, 1]`, or a housing fund band
    /// whose minimum exceeds its maximum.
    pub fn validate(&self) -> Result<(), TaxYearConfigError> {
        if self.basic_deduction_monthly < Decimal::ZERO {
            return Err(TaxYearConfigError::NegativeBasicDeduction(
                self.basic_deduction_monthly,
            ));
        }
        if self.basic_deduction_monthly > MAX_AMOUNT {
            return Err(TaxYearConfigError::BasicDeductionTooLarge(
                self.basic_deduction_monthly,
            ));
        }

        let rates = [
            ("pension rate", self.pension_rate),
            ("medical rate", self.medical_rate),
            ("unemployment rate", self.unemployment_rate),
            ("housing fund minimum rate", self.housing_fund_min_rate),
            ("housing fund maximum rate", self.housing_fund_max_rate),
            ("labor rate", self.labor_rate),
            ("manuscript rate", self.manuscript_rate),
            ("license rate", self.license_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(TaxYearConfigError::InvalidRate { name, rate });
            }
        }

        if self.housing_fund_min_rate > self.housing_fund_max_rate {
            return Err(TaxYearConfigError::InvalidHousingFundBand {
                min: self.housing_fund_min_rate,
                max: self.housing_fund_max_rate,
            });
        }

        Ok(())
    }
}
