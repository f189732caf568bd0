use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Loan, Money, Rate};

pub const PRINCIPAL_REQUIRED: &str = "Principal amount must be greater than 0";
pub const RATE_NOT_NEGATIVE: &str = "Annual rate must be 0 or greater";
pub const TERM_REQUIRED: &str = "Loan term must be specified";
pub const YEARS_NOT_NEGATIVE: &str = "Years must be 0 or greater";
pub const MONTHS_NOT_NEGATIVE: &str = "Months must be 0 or greater";
pub const TERM_NOT_EMPTY: &str = "Loan term must be greater than 0";

/// A loan as it stands while a form is being edited: any field may be
/// missing and terms may be negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDraft {
    pub principal: Option<Money>,
    pub annual_rate: Option<Rate>,
    pub term_years: Option<i64>,
    pub term_months: Option<i64>,
}

impl From<&Loan> for LoanDraft {
    fn from(loan: &Loan) -> Self {
        Self {
            principal: Some(loan.principal),
            annual_rate: Some(loan.annual_rate),
            term_years: Some(loan.term_years.into()),
            term_months: Some(loan.term_months.into()),
        }
    }
}

/// Checks loan parameters, returning one message per problem found.
///
/// An empty list means the loan can be scheduled. A zero rate is valid.
pub fn validate_loan(draft: &LoanDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.principal.is_none_or(|principal| principal <= Decimal::ZERO) {
        errors.push(PRINCIPAL_REQUIRED.to_string());
    }

    if draft.annual_rate.is_none_or(|rate| rate < Decimal::ZERO) {
        errors.push(RATE_NOT_NEGATIVE.to_string());
    }

    if draft.term_years.is_none() && draft.term_months.is_none() {
        errors.push(TERM_REQUIRED.to_string());
    }

    if draft.term_years.is_some_and(|years| years < 0) {
        errors.push(YEARS_NOT_NEGATIVE.to_string());
    }

    if draft.term_months.is_some_and(|months| months < 0) {
        errors.push(MONTHS_NOT_NEGATIVE.to_string());
    }

    if draft.term_years.unwrap_or(0) == 0 && draft.term_months.unwrap_or(0) == 0 {
        errors.push(TERM_NOT_EMPTY.to_string());
    }

    errors
}

/// Checks a loan's extra payments and rate changes against its term.
pub fn validate_interventions(loan: &Loan) -> Vec<String> {
    let total_months = loan.total_months();
    let in_term = |month: u32| (1..=total_months).contains(&month);
    let mut errors = Vec::new();

    for payment in &loan.extra_payments {
        if !in_term(payment.month) {
            errors.push(format!(
                "Extra payment month {} must be between 1 and {total_months}",
                payment.month
            ));
        }
        if payment.amount <= Decimal::ZERO {
            errors.push(format!(
                "Extra payment in month {} must be greater than 0",
                payment.month
            ));
        }
    }

    for change in &loan.rate_changes {
        if !in_term(change.month) {
            errors.push(format!(
                "Rate change month {} must be between 1 and {total_months}",
                change.month
            ));
        }
        if change.adjustment.new_rate().is_some_and(|rate| rate < Decimal::ZERO) {
            errors.push(format!(
                "Rate in month {} must be 0 or greater",
                change.month
            ));
        }
        if change.adjustment.new_emi().is_some_and(|emi| emi <= Decimal::ZERO) {
            errors.push(format!(
                "EMI in month {} must be greater than 0",
                change.month
            ));
        }
    }

    errors
}
