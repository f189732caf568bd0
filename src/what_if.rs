//! Helpers behind the interactive playground: comparing a loan with its
//! intervention-free baseline and turning "pay X more from month N" into a
//! rate change.

use rust_decimal::Decimal;

use crate::schedule::generate_amortization_schedule;
use crate::summary::calculate_savings;
use crate::types::{Loan, Money, PaymentSchedule, RateAdjustment, RateChange, Savings};
use crate::AmortizationResult;

/// Savings of `loan` against the same loan with no extra payments or rate
/// changes.
pub fn baseline_savings(loan: &Loan) -> AmortizationResult<Savings> {
    let baseline = generate_amortization_schedule(&loan.without_interventions())?;
    let modified = generate_amortization_schedule(loan)?;
    Ok(calculate_savings(&baseline, &modified))
}

/// Balance left after the given payment, or zero if the schedule has no such
/// payment.
pub fn remaining_balance_at(schedule: &[PaymentSchedule], payment_number: u32) -> Money {
    schedule
        .iter()
        .find(|row| row.payment_number == payment_number)
        .map_or(Decimal::ZERO, |row| row.remaining_balance)
}

/// Builds an EMI override that raises the installment paid at
/// `payment_number` by `increase_by`.
///
/// Returns `None` when the schedule has no such payment.
pub fn emi_increase(
    schedule: &[PaymentSchedule],
    payment_number: u32,
    increase_by: Money,
) -> Option<RateChange> {
    let row = schedule
        .iter()
        .find(|row| row.payment_number == payment_number)?;
    let current_emi = row.principal_amount.max(Decimal::ZERO) + row.interest_amount;

    Some(
        RateChange::new(
            payment_number,
            RateAdjustment::EmiOverride {
                new_emi: current_emi + increase_by,
            },
        )
        .with_emi_increase(increase_by),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtraPayment, PaymentFrequency};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn sample_loan() -> Loan {
        Loan::new(
            dec!(300000),
            dec!(4.5),
            30,
            0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            PaymentFrequency::Monthly,
        )
    }

    #[rstest]
    fn test_baseline_savings_without_interventions(sample_loan: Loan) {
        assert_eq!(baseline_savings(&sample_loan).unwrap(), Savings::default());
    }

    #[rstest]
    fn test_baseline_savings_with_extra_payment(sample_loan: Loan) {
        let loan = sample_loan.with_extra_payment(ExtraPayment::new(12, dec!(10000)));
        let savings = baseline_savings(&loan).unwrap();

        assert_eq!(savings.interest_saved, dec!(25277.56));
        assert_eq!(savings.time_saved, 23);
    }

    #[rstest]
    #[case(1, dec!(299604.94))]
    #[case(12, dec!(295160.27))]
    #[case(360, dec!(0))]
    #[case(361, dec!(0))]
    fn test_remaining_balance_at(sample_loan: Loan, #[case] payment_number: u32, #[case] expected: Money) {
        let schedule = generate_amortization_schedule(&sample_loan).unwrap();
        assert_eq!(remaining_balance_at(&schedule, payment_number), expected);
    }

    #[rstest]
    fn test_emi_increase_builds_override(sample_loan: Loan) {
        let schedule = generate_amortization_schedule(&sample_loan).unwrap();
        let change = emi_increase(&schedule, 13, dec!(979.94)).unwrap();

        assert_eq!(change.month, 13);
        assert_eq!(change.adjustment, RateAdjustment::EmiOverride { new_emi: dec!(2500.00) });
        assert_eq!(change.emi_increase_by, Some(dec!(979.94)));

        let faster = generate_amortization_schedule(&sample_loan.with_rate_change(change)).unwrap();
        assert_eq!(faster.len(), 169);
    }

    #[rstest]
    fn test_emi_increase_outside_schedule(sample_loan: Loan) {
        let schedule = generate_amortization_schedule(&sample_loan).unwrap();
        assert!(emi_increase(&schedule, 400, dec!(100)).is_none());
    }
}
