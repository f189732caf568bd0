use rust_decimal::Decimal;

use crate::payment::round_money;
use crate::types::{ComparisonResult, Loan, LoanSummary, PaymentSchedule, Savings, Scenario};

/// Reduces a schedule to its top-line totals.
///
/// `total_principal` is the loan's nominal principal, not a sum over rows.
/// An empty schedule yields zero totals and a payoff date equal to the loan's
/// start date.
pub fn calculate_loan_summary(schedule: &[PaymentSchedule], loan: &Loan) -> LoanSummary {
    let total_interest = schedule
        .last()
        .map_or(Decimal::ZERO, |row| row.cumulative_interest);
    let monthly_payment = schedule
        .first()
        .map_or(Decimal::ZERO, |row| row.payment_amount);
    let payoff_date = schedule.last().map_or(loan.start_date, |row| row.date);

    LoanSummary {
        total_payments: schedule.len() as u32,
        total_interest,
        total_principal: loan.principal,
        monthly_payment,
        payoff_date,
        total_cost: loan.principal + total_interest,
    }
}

/// Compares a baseline schedule with a modified one.
///
/// Every delta is `original - modified`, so positive values favour the
/// modified schedule. Empty schedules count as zero interest and payment.
pub fn calculate_savings(original: &[PaymentSchedule], modified: &[PaymentSchedule]) -> Savings {
    let total_interest = |schedule: &[PaymentSchedule]| {
        schedule
            .last()
            .map_or(Decimal::ZERO, |row| row.cumulative_interest)
    };
    let first_payment = |schedule: &[PaymentSchedule]| {
        schedule
            .first()
            .map_or(Decimal::ZERO, |row| row.payment_amount)
    };

    Savings {
        interest_saved: round_money(total_interest(original) - total_interest(modified)),
        time_saved: original.len() as i64 - modified.len() as i64,
        payment_reduced: round_money(first_payment(original) - first_payment(modified)),
    }
}

/// Puts two saved scenarios side by side.
pub fn compare_scenarios(original: &Scenario, modified: &Scenario) -> ComparisonResult {
    let savings = calculate_savings(&original.schedule, &modified.schedule);
    ComparisonResult {
        original_scenario: original.clone(),
        modified_scenario: modified.clone(),
        interest_saved: savings.interest_saved,
        time_saved: savings.time_saved,
        payment_reduced: savings.payment_reduced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::generate_amortization_schedule;
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

    fn scenario(name: &str, loan: Loan) -> Scenario {
        let schedule = generate_amortization_schedule(&loan).unwrap();
        let summary = calculate_loan_summary(&schedule, &loan);
        Scenario {
            id: name.to_lowercase(),
            name: name.to_string(),
            loan,
            schedule,
            summary,
            is_modified: false,
        }
    }

    #[rstest]
    fn test_summary_of_thirty_year_loan(sample_loan: Loan) {
        let schedule = generate_amortization_schedule(&sample_loan).unwrap();
        let summary = calculate_loan_summary(&schedule, &sample_loan);

        assert_eq!(
            summary,
            LoanSummary {
                total_payments: 360,
                total_interest: dec!(247218.51),
                total_principal: dec!(300000),
                monthly_payment: dec!(1520.06),
                payoff_date: NaiveDate::from_ymd_opt(2053, 12, 1).unwrap(),
                total_cost: dec!(547218.51),
            }
        );
    }

    #[rstest]
    fn test_summary_of_empty_schedule(sample_loan: Loan) {
        let summary = calculate_loan_summary(&[], &sample_loan);

        assert_eq!(summary.total_payments, 0);
        assert_eq!(summary.total_interest, dec!(0));
        assert_eq!(summary.monthly_payment, dec!(0));
        assert_eq!(summary.payoff_date, sample_loan.start_date);
        assert_eq!(summary.total_cost, dec!(300000));
    }

    #[rstest]
    fn test_savings_against_itself_is_zero(sample_loan: Loan) {
        let schedule = generate_amortization_schedule(&sample_loan).unwrap();
        assert_eq!(calculate_savings(&schedule, &schedule), Savings::default());
    }

    #[rstest]
    fn test_savings_from_extra_payment(sample_loan: Loan) {
        let original = generate_amortization_schedule(&sample_loan).unwrap();
        let modified_loan = sample_loan.with_extra_payment(ExtraPayment::new(12, dec!(10000)));
        let modified = generate_amortization_schedule(&modified_loan).unwrap();

        let savings = calculate_savings(&original, &modified);
        assert_eq!(savings.interest_saved, dec!(25277.56));
        assert_eq!(savings.time_saved, 23);
        assert_eq!(savings.payment_reduced, dec!(0));

        let reversed = calculate_savings(&modified, &original);
        assert_eq!(reversed.interest_saved, dec!(-25277.56));
        assert_eq!(reversed.time_saved, -23);
    }

    #[test]
    fn test_savings_of_empty_schedules() {
        assert_eq!(calculate_savings(&[], &[]), Savings::default());
    }

    #[rstest]
    fn test_compare_scenarios(sample_loan: Loan) {
        let original = scenario("Original", sample_loan.clone());
        let modified = scenario(
            "Bonus",
            sample_loan.with_extra_payment(ExtraPayment::new(12, dec!(10000))),
        );

        let comparison = compare_scenarios(&original, &modified);
        assert_eq!(comparison.original_scenario.name, "Original");
        assert_eq!(comparison.modified_scenario.name, "Bonus");
        assert_eq!(comparison.interest_saved, dec!(25277.56));
        assert_eq!(comparison.time_saved, 23);
        assert_eq!(comparison.payment_reduced, dec!(0));
    }
}
