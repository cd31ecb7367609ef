use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether the wage figure covers one month or the whole year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WagePeriod {
    #[default]
    Monthly,
    Annual,
}

impl WagePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

/// How a one-time bonus is taxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusElection {
    /// Taxed on its own with a rate chosen from one twelfth of the amount.
    #[default]
    Separate,
    /// Added to annual wages and taxed on the cumulative schedule.
    #[serde(alias = "combined")]
    Merged,
}

impl BonusElection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Separate => "separate",
            Self::Merged => "merged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "separate" => Some(Self::Separate),
            "merged" | "combined" => Some(Self::Merged),
            _ => None,
        }
    }
}

impl fmt::Display for BonusElection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplementary deduction categories, each claimed as a monthly amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    ChildrenEducation,
    ContinuingEducation,
    HousingLoanInterest,
    HousingRent,
    ElderSupport,
}

impl DeductionCategory {
    pub const ALL: [DeductionCategory; 5] = [
        Self::ChildrenEducation,
        Self::ContinuingEducation,
        Self::HousingLoanInterest,
        Self::HousingRent,
        Self::ElderSupport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChildrenEducation => "children_education",
            Self::ContinuingEducation => "continuing_education",
            Self::HousingLoanInterest => "housing_loan_interest",
            Self::HousingRent => "housing_rent",
            Self::ElderSupport => "elder_support",
        }
    }

    /// Accepts the canonical names plus the short forms used by older forms
    /// (`housing_loan`, `elderly_care`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "children_education" => Some(Self::ChildrenEducation),
            "continuing_education" => Some(Self::ContinuingEducation),
            "housing_loan_interest" | "housing_loan" => Some(Self::HousingLoanInterest),
            "housing_rent" => Some(Self::HousingRent),
            "elder_support" | "elderly_care" => Some(Self::ElderSupport),
            _ => None,
        }
    }
}

/// Largest figure accepted for any single money field.
///
/// Annualized and summed amounts derived from inputs at or below this stay
/// far inside [`Decimal`]'s range, so engine arithmetic cannot overflow.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Rejected input, reported by adapters before the engine is invoked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxInputError {
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must be at most {max}, got {value}", max = MAX_AMOUNT)]
    TooLarge { field: &'static str, value: Decimal },

    #[error("housing fund rate must be between 0 and 1, got {0}")]
    InvalidHousingFundRate(Decimal),
}

/// Checks one money field against `0..=MAX_AMOUNT`.
///
/// # Errors
///
/// Returns [`TaxInputError::Negative`] or [`TaxInputError::TooLarge`].
pub fn check_amount(
    field: &'static str,
    value: Decimal,
) -> Result<(), TaxInputError> {
    if value < Decimal::ZERO {
        return Err(TaxInputError::Negative { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(TaxInputError::TooLarge { field, value });
    }
    Ok(())
}

/// Caller-supplied figures for one annual computation.
///
/// Amounts are in the caller's convention: `wage` per `wage_period`,
/// social-insurance base and supplementary deductions per month, everything
/// else per year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInput {
    pub wage: Decimal,
    pub wage_period: WagePeriod,
    pub bonus: Decimal,
    pub bonus_election: BonusElection,

    // Flat-rate categories
    pub labor_income: Decimal,
    pub manuscript_income: Decimal,
    pub license_income: Decimal,

    /// Monthly base for social insurance and housing fund contributions.
    pub social_insurance_base: Decimal,

    /// Housing fund contribution as a fraction of the base (e.g. 0.07).
    pub housing_fund_rate: Decimal,

    /// Monthly amounts keyed by category.
    pub supplementary_deductions: BTreeMap<DeductionCategory, Decimal>,
}

impl TaxInput {
    /// Wages converted to a yearly figure.
    pub fn annual_wage(&self) -> Decimal {
        match self.wage_period {
            WagePeriod::Monthly => self.wage * Decimal::from(12),
            WagePeriod::Annual => self.wage,
        }
    }

    /// Sum of all supplementary deductions for one month.
    pub fn supplementary_monthly_total(&self) -> Decimal {
        self.supplementary_deductions.values().copied().sum()
    }

    /// Rejects negative or oversized amounts and a housing fund rate
    /// outside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxInputError`] found, checking fields in
    /// declaration order.
    pub fn validate(&self) -> Result<(), TaxInputError> {
        let fields = [
            ("wage", self.wage),
            ("bonus", self.bonus),
            ("labor income", self.labor_income),
            ("manuscript income", self.manuscript_income),
            ("license income", self.license_income),
            ("social insurance base", self.social_insurance_base),
        ];
        for (field, value) in fields {
            check_amount(field, value)?;
        }
        if self.housing_fund_rate < Decimal::ZERO {
            return Err(TaxInputError::Negative {
                field: "housing fund rate",
                value: self.housing_fund_rate,
            });
        }
        if self.housing_fund_rate > Decimal::ONE {
            return Err(TaxInputError::InvalidHousingFundRate(
                self.housing_fund_rate,
            ));
        }
        for (category, value) in &self.supplementary_deductions {
            check_amount(category.as_str(), *value)?;
        }
        Ok(())
    }
}
