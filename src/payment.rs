use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

/// Rounds to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an annual percentage rate into the monthly decimal factor
/// (4.5 -> 0.00375). Nominal, not compounded.
pub fn monthly_rate(annual_rate: Rate) -> Decimal {
    annual_rate / dec!(12) / dec!(100)
}

/// Turns a failed checked operation into [`AmortizationError::Overflow`].
pub(crate) fn checked(value: Option<Decimal>, context: &str) -> AmortizationResult<Decimal> {
    value.ok_or_else(|| AmortizationError::Overflow {
        context: context.to_string(),
    })
}

/// Calculates the level monthly installment of a loan.
///
/// The annuity formula is: PMT = P * [r(1 + r)^n] / [(1 + r)^n - 1], rounded
/// to cents. A zero rate pays the principal off in equal slices, unrounded so
/// the last slice clears the balance exactly.
///
/// # Errors
///
/// Returns [`AmortizationError::InvalidTerm`] if `term_months` is zero and
/// [`AmortizationError::Overflow`] if any intermediate does not fit a `Decimal`.
pub fn calculate_monthly_payment(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> AmortizationResult<Money> {
    if term_months == 0 {
        return Err(AmortizationError::InvalidTerm { months: term_months });
    }

    if annual_rate.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    let rate = monthly_rate(annual_rate);
    let growth = (Decimal::ONE + rate)
        .checked_powu(term_months.into())
        .ok_or_else(|| AmortizationError::Overflow {
            context: format!("(1 + {rate})^{term_months}"),
        })?;

    let payment = checked(
        rate.checked_mul(growth)
            .and_then(|factor| principal.checked_mul(factor))
            .and_then(|numerator| numerator.checked_div(growth - Decimal::ONE)),
        "annuity payment",
    )?;

    Ok(round_money(payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(dec!(300000), dec!(4.5), 360, dec!(1520.06))]
    #[case(dec!(300000), dec!(4.5), 180, dec!(2294.98))]
    #[case(dec!(100000), dec!(6), 12, dec!(8606.64))]
    #[case(dec!(12000), dec!(0), 12, dec!(1000))]
    fn test_calculate_monthly_payment(
        #[case] principal: Money,
        #[case] annual_rate: Rate,
        #[case] term_months: u32,
        #[case] expected: Money,
    ) {
        let payment = calculate_monthly_payment(principal, annual_rate, term_months).unwrap();
        assert_eq!(payment, expected);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = calculate_monthly_payment(dec!(300000), dec!(0), 360).unwrap();
        assert_eq!(round_money(payment), dec!(833.33));
        assert_eq!(round_money(payment * dec!(360)), dec!(300000));
    }

    #[test]
    fn test_same_inputs_same_payment() {
        let first = calculate_monthly_payment(dec!(250000), dec!(7.25), 240).unwrap();
        let second = calculate_monthly_payment(dec!(250000), dec!(7.25), 240).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_months_error() {
        let result = calculate_monthly_payment(dec!(100000), dec!(10), 0);
        assert_eq!(result, Err(AmortizationError::InvalidTerm { months: 0 }));
    }

    #[rstest]
    #[case(dec!(1), dec!(1200000000), 4)]
    #[case(dec!(50000000000000000000000000000), dec!(1200), 1)]
    fn test_overflow_is_an_error(
        #[case] principal: Money,
        #[case] annual_rate: Rate,
        #[case] term_months: u32,
    ) {
        let result = calculate_monthly_payment(principal, annual_rate, term_months);
        assert!(matches!(result, Err(AmortizationError::Overflow { .. })));
    }

    #[rstest]
    #[case(dec!(1.005), dec!(1.01))]
    #[case(dec!(-1.005), dec!(-1.01))]
    #[case(dec!(2.004), dec!(2.00))]
    fn test_round_money_half_away_from_zero(#[case] amount: Decimal, #[case] expected: Money) {
        assert_eq!(round_money(amount), expected);
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(4.5)), dec!(0.00375));
    }
}
