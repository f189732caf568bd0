//! Period-by-period amortization of a [`Loan`] with its interventions.
//!
//! The generator walks payment numbers `1..=total_months`, carrying an
//! immutable [`Accumulator`] from one period to the next. Each step:
//!
//! 1. applies the rate changes scheduled for that payment number;
//! 2. splits the installment into interest and principal;
//! 3. adds the first extra payment scheduled for that payment number;
//! 4. clamps principal to the outstanding balance and emits a rounded row.
//!
//! The walk stops at the first row whose balance reaches zero, so early
//! payoff yields a shorter schedule. Rounding only happens on emitted rows;
//! the carried balance keeps full precision.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::payment::{calculate_monthly_payment, checked, monthly_rate, round_money};
use crate::types::{ExtraPayment, Loan, Money, PaymentFrequency, PaymentSchedule, Rate, RateChange};
use crate::AmortizationResult;

/// Loan-wide inputs shared by every step.
struct ScheduleContext<'a> {
    total_months: u32,
    frequency: PaymentFrequency,
    multiplier: Decimal,
    extra_payments: Vec<&'a ExtraPayment>,
    rate_changes: Vec<&'a RateChange>,
}

impl<'a> ScheduleContext<'a> {
    fn new(loan: &'a Loan) -> Self {
        // `sort_by_key` is stable, so records for the same month keep their
        // insertion order.
        let mut extra_payments: Vec<&ExtraPayment> = loan.extra_payments.iter().collect();
        extra_payments.sort_by_key(|payment| payment.month);
        let mut rate_changes: Vec<&RateChange> = loan.rate_changes.iter().collect();
        rate_changes.sort_by_key(|change| change.month);

        Self {
            total_months: loan.total_months(),
            frequency: loan.payment_frequency,
            multiplier: loan.payment_frequency.multiplier(),
            extra_payments,
            rate_changes,
        }
    }

    fn rate_changes_at(&self, month: u32) -> impl Iterator<Item = &'a RateChange> + '_ {
        self.rate_changes
            .iter()
            .copied()
            .filter(move |change| change.month == month)
    }

    /// Only the first extra payment of a month counts.
    fn extra_payment_at(&self, month: u32) -> Option<&'a ExtraPayment> {
        self.extra_payments
            .iter()
            .copied()
            .find(|payment| payment.month == month)
    }

    /// Installment that clears `balance` over the months left from `month` on.
    fn reamortize(&self, balance: Money, rate: Rate, month: u32) -> AmortizationResult<Money> {
        let months_left = self.total_months - month + 1;
        let payment = calculate_monthly_payment(balance, rate, months_left)?;
        checked(payment.checked_mul(self.multiplier), "re-amortized installment")
    }
}

/// Running state between periods.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    balance: Money,
    cumulative_interest: Money,
    cumulative_principal: Money,
    date: NaiveDate,
    rate: Rate,
    emi: Money,
}

impl Accumulator {
    fn opening(loan: &Loan, installment: Money) -> Self {
        Self {
            balance: loan.principal,
            cumulative_interest: Decimal::ZERO,
            cumulative_principal: Decimal::ZERO,
            date: loan.start_date,
            rate: loan.annual_rate,
            emi: installment,
        }
    }

    fn apply_rate_change(
        self,
        change: &RateChange,
        month: u32,
        ctx: &ScheduleContext<'_>,
    ) -> AmortizationResult<Self> {
        let rate = change
            .adjustment
            .new_rate()
            .filter(|rate| *rate > Decimal::ZERO)
            .unwrap_or(self.rate);
        let emi = match change.adjustment.new_emi().filter(|emi| *emi > Decimal::ZERO) {
            Some(emi) => emi,
            None => ctx.reamortize(self.balance, rate, month)?,
        };

        debug!(month, %rate, %emi, change_id = %change.id, "applied rate change");
        Ok(Self { rate, emi, ..self })
    }

    fn step(
        self,
        month: u32,
        ctx: &ScheduleContext<'_>,
    ) -> AmortizationResult<(Self, PaymentSchedule)> {
        let mut state = self;
        for change in ctx.rate_changes_at(month) {
            state = state.apply_rate_change(change, month, ctx)?;
        }

        let interest_amount = checked(
            state.balance.checked_mul(monthly_rate(state.rate)),
            "interest",
        )?;
        let mut principal_amount = checked(state.emi.checked_sub(interest_amount), "principal")?;
        if principal_amount < Decimal::ZERO {
            warn!(
                month,
                emi = %state.emi,
                interest = %interest_amount,
                "installment does not cover interest"
            );
        }

        if let Some(extra) = ctx.extra_payment_at(month) {
            principal_amount = checked(principal_amount.checked_add(extra.amount), "extra payment")?;
        }

        if principal_amount > state.balance {
            principal_amount = state.balance;
        }

        let payment_amount = checked(principal_amount.checked_add(interest_amount), "payment")?;
        let balance = checked(state.balance.checked_sub(principal_amount), "balance")?
            .max(Decimal::ZERO);
        let cumulative_interest = checked(
            state.cumulative_interest.checked_add(interest_amount),
            "cumulative interest",
        )?;
        let cumulative_principal = checked(
            state.cumulative_principal.checked_add(principal_amount),
            "cumulative principal",
        )?;

        let row = PaymentSchedule {
            payment_number: month,
            date: state.date,
            payment_amount: round_money(payment_amount),
            principal_amount: round_money(principal_amount),
            interest_amount: round_money(interest_amount),
            remaining_balance: round_money(balance),
            cumulative_interest: round_money(cumulative_interest),
            cumulative_principal: round_money(cumulative_principal),
        };

        let next = Self {
            balance,
            cumulative_interest,
            cumulative_principal,
            ..state
        };
        Ok((next, row))
    }

    /// Moves the state to the due date of the following payment.
    fn advance(self, frequency: PaymentFrequency) -> AmortizationResult<Self> {
        Ok(Self {
            date: frequency.advance(self.date)?,
            ..self
        })
    }

    fn is_paid_off(&self) -> bool {
        self.balance <= Decimal::ZERO
    }
}

/// Generates the full payment ledger of a loan.
///
/// The opening installment is the monthly annuity payment on the whole term,
/// scaled by the payment frequency multiplier. The schedule is recomputed from
/// scratch on every call and the loan is never modified.
///
/// # Errors
///
/// Returns [`crate::AmortizationError::InvalidTerm`] if the loan has a zero
/// term, and propagates overflow or date range errors.
pub fn generate_amortization_schedule(loan: &Loan) -> AmortizationResult<Vec<PaymentSchedule>> {
    let ctx = ScheduleContext::new(loan);
    let base_payment = calculate_monthly_payment(loan.principal, loan.annual_rate, ctx.total_months)?;
    let installment = checked(base_payment.checked_mul(ctx.multiplier), "installment")?;

    debug!(
        loan_id = %loan.id,
        total_months = ctx.total_months,
        %installment,
        extra_payments = ctx.extra_payments.len(),
        rate_changes = ctx.rate_changes.len(),
        "generating amortization schedule"
    );

    let mut schedule = Vec::with_capacity(ctx.total_months as usize);
    let mut state = Accumulator::opening(loan, installment);
    for month in 1..=ctx.total_months {
        let (next, row) = state.step(month, &ctx)?;
        schedule.push(row);
        // The next due date is only needed when another payment follows.
        if next.is_paid_off() || month == ctx.total_months {
            break;
        }
        state = next.advance(ctx.frequency)?;
    }

    debug!(loan_id = %loan.id, payments = schedule.len(), "amortization schedule generated");
    Ok(schedule)
}
