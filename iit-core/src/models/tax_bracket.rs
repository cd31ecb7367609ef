use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of a progressive schedule.
///
/// `upper_bound` is `None` for the top band. Membership is exclusive at the
/// lower bound and inclusive at the upper bound, so a value sitting exactly
/// on a threshold belongs to the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub quick_deduction: Decimal,
}

impl TaxBracket {
    /// Returns true if `lower_bound < value <= upper_bound`.
    pub fn contains(
        &self,
        value: Decimal,
    ) -> bool {
        value > self.lower_bound && self.upper_bound.is_none_or(|upper| value <= upper)
    }

    /// Tax on `amount` using the quick-deduction shortcut.
    pub fn apply(
        &self,
        amount: Decimal,
    ) -> Decimal {
        amount * self.rate - self.quick_deduction
    }
}
