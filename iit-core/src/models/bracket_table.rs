//! Progressive bracket tables.
//!
//! A [`BracketTable`] is the only way brackets reach the calculators, so every
//! table in use has passed [`BracketTable::new`]'s structural checks. The
//! built-in annual table is kept as constant data in
//! [`STANDARD_ANNUAL_BRACKETS`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxBracket;

/// Annual cumulative-withholding schedule in force since 2019.
///
/// Quick deductions are regulatory constants; they are reproduced, not derived.
pub const STANDARD_ANNUAL_BRACKETS: [TaxBracket; 7] = [
    TaxBracket {
        lower_bound: dec!(0),
        upper_bound: Some(dec!(36000)),
        rate: dec!(0.03),
        quick_deduction: dec!(0),
    },
    TaxBracket {
        lower_bound: dec!(36000),
        upper_bound: Some(dec!(144000)),
        rate: dec!(0.10),
        quick_deduction: dec!(2520),
    },
    TaxBracket {
        lower_bound: dec!(144000),
        upper_bound: Some(dec!(300000)),
        rate: dec!(0.20),
        quick_deduction: dec!(16920),
    },
    TaxBracket {
        lower_bound: dec!(300000),
        upper_bound: Some(dec!(420000)),
        rate: dec!(0.25),
        quick_deduction: dec!(31920),
    },
    TaxBracket {
        lower_bound: dec!(420000),
        upper_bound: Some(dec!(660000)),
        rate: dec!(0.30),
        quick_deduction: dec!(52920),
    },
    TaxBracket {
        lower_bound: dec!(660000),
        upper_bound: Some(dec!(960000)),
        rate: dec!(0.35),
        quick_deduction: dec!(85920),
    },
    TaxBracket {
        lower_bound: dec!(960000),
        upper_bound: None,
        rate: dec!(0.45),
        quick_deduction: dec!(181920),
    },
];

/// Structural problems found while building a [`BracketTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    /// No brackets were provided.
    #[error("bracket table is empty")]
    Empty,

    /// The first bracket does not start at zero, leaving low amounts untaxed.
    #[error("first bracket must start at 0, got {0}")]
    NonZeroStart(Decimal),

    /// Bracket `index` does not start where the previous one ends.
    #[error("bracket {index} starts at {lower_bound}, expected {expected}")]
    NotContiguous {
        index: usize,
        lower_bound: Decimal,
        expected: Decimal,
    },

    /// An unbounded bracket appears before the end of the table.
    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedNotLast(usize),

    /// The last bracket has an upper bound.
    #[error("last bracket must be unbounded, found upper bound {0}")]
    BoundedLast(Decimal),

    /// A bracket's upper bound does not exceed its lower bound.
    #[error("bracket {index} is empty: upper bound {upper_bound} <= lower bound {lower_bound}")]
    EmptyBand {
        index: usize,
        lower_bound: Decimal,
        upper_bound: Decimal,
    },

    /// A marginal rate outside `[0, 1]`.
    #[error("bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    /// A negative quick deduction.
    #[error("bracket {index} quick deduction must be non-negative, got {quick_deduction}")]
    NegativeQuickDeduction {
        index: usize,
        quick_deduction: Decimal,
    },
}

/// A validated, ascending, contiguous set of brackets that starts at zero and
/// whose last band is unbounded, so every positive amount falls in one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates `brackets` and wraps them.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the table is empty, does not start at
    /// zero, has gaps or overlaps, places an unbounded band anywhere but last, or carries a
    /// rate outside `[0, 1]` or a negative quick deduction.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let last_index = brackets.len().checked_sub(1).ok_or(BracketTableError::Empty)?;

        let start = brackets[0].lower_bound;
        if !start.is_zero() {
            return Err(BracketTableError::NonZeroStart(start));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            if bracket.quick_deduction < Decimal::ZERO {
                return Err(BracketTableError::NegativeQuickDeduction {
                    index,
                    quick_deduction: bracket.quick_deduction,
                });
            }

            match bracket.upper_bound {
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedNotLast(index));
                }
                Some(upper) if index == last_index => {
                    return Err(BracketTableError::BoundedLast(upper));
                }
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(BracketTableError::EmptyBand {
                        index,
                        lower_bound: bracket.lower_bound,
                        upper_bound: upper,
                    });
                }
                _ => {}
            }

            if index > 0 {
                let expected = brackets[index - 1].upper_bound.unwrap_or(Decimal::MAX);
                if bracket.lower_bound != expected {
                    return Err(BracketTableError::NotContiguous {
                        index,
                        lower_bound: bracket.lower_bound,
                        expected,
                    });
                }
            }
        }

        Ok(Self { brackets })
    }

    /// The built-in annual table.
    pub fn standard() -> Self {
        Self {
            brackets: STANDARD_ANNUAL_BRACKETS.to_vec(),
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Finds the bracket with `lower_bound < value <= upper_bound`.
    ///
    /// Returns `None` for values at or below the first lower bound.
    pub fn find(
        &self,
        value: Decimal,
    ) -> Option<&TaxBracket> {
        self.brackets.iter().find(|b| b.contains(value))
    }
}

impl Default for BracketTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}
