//! Small arithmetic helpers shared by the calculators.

use rust_decimal::Decimal;

/// Number of months in a tax year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Rounds to whole fen (two decimal places), half away from zero.
///
/// Calculators keep full precision; rounding is for display and reporting.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use iit_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1080.001)), dec!(1080.00));
/// assert_eq!(round_half_up(dec!(2562.525)), dec!(2562.53));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps negative values to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use iit_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(-250)), dec!(0));
/// assert_eq!(non_negative(dec!(250)), dec!(250));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// `value × 12` as a decimal.
pub fn annualize(monthly: Decimal) -> Decimal {
    monthly * Decimal::from(MONTHS_PER_YEAR)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(3480.004)), dec!(3480.00));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(3480.005)), dec!(3480.01));
    }

    #[test]
    fn round_half_up_rounds_negative_away_from_zero() {
        assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
    }

    // =========================================================================
    // non_negative tests
    // =========================================================================

    #[test]
    fn non_negative_floors_at_zero() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
    }

    #[test]
    fn non_negative_keeps_zero_and_positive() {
        assert_eq!(non_negative(dec!(0)), dec!(0));
        assert_eq!(non_negative(dec!(1080)), dec!(1080));
    }

    #[test]
    fn annualize_multiplies_by_twelve() {
        assert_eq!(annualize(dec!(5000)), dec!(60000));
    }
}
