use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;
use crate::AmortizationResult;

/// Monetary amounts. The currency is a display label only.
pub type Money = Decimal;

/// Annual rates expressed in percent (4.5 = 4.5%).
pub type Rate = Decimal;

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// How often an installment is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    BiWeekly,
    Weekly,
}

impl PaymentFrequency {
    /// Scale applied to the monthly-equivalent installment.
    ///
    /// The term is still amortized in months; only the installment is scaled
    /// (26 or 52 payments per year spread over 12 months).
    pub fn multiplier(self) -> Decimal {
        match self {
            PaymentFrequency::Monthly => Decimal::ONE,
            PaymentFrequency::BiWeekly => dec!(26) / dec!(12),
            PaymentFrequency::Weekly => dec!(52) / dec!(12),
        }
    }

    /// Date of the payment following `date`.
    ///
    /// Monthly steps clamp to the end of shorter months (Jan 31 -> Feb 28).
    pub fn advance(self, date: NaiveDate) -> AmortizationResult<NaiveDate> {
        let next = match self {
            PaymentFrequency::Monthly => date.checked_add_months(Months::new(1)),
            PaymentFrequency::BiWeekly => date.checked_add_days(Days::new(14)),
            PaymentFrequency::Weekly => date.checked_add_days(Days::new(7)),
        };
        next.ok_or(AmortizationError::DateOutOfRange { date })
    }
}

/// A one-time additional principal contribution at a payment number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPayment {
    pub id: String,
    /// 1-based payment number, not a calendar month.
    pub month: u32,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExtraPayment {
    pub fn new(month: u32, amount: Money) -> Self {
        Self {
            id: new_id(),
            month,
            amount,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What a [`RateChange`] does to the running rate and installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RateAdjustment {
    /// New rate; the installment is re-amortized over the remaining term.
    #[serde(rename_all = "camelCase")]
    RateOnly { new_rate: Rate },
    /// Keep the rate, force a new installment.
    #[serde(rename_all = "camelCase")]
    EmiOverride { new_emi: Money },
    /// New rate and a forced installment.
    #[serde(rename_all = "camelCase")]
    RateAndEmi { new_rate: Rate, new_emi: Money },
    /// Re-amortize at the rate already in effect.
    Reamortize,
}

impl RateAdjustment {
    /// Classifies raw form inputs.
    ///
    /// A rate `<= 0` means "no rate given" and an EMI `<= 0` means "no EMI
    /// given", matching how the form submits empty fields.
    pub fn from_inputs(new_rate: Rate, new_emi: Option<Money>) -> Self {
        let new_emi = new_emi.filter(|emi| *emi > Decimal::ZERO);
        match (new_rate > Decimal::ZERO, new_emi) {
            (true, Some(new_emi)) => RateAdjustment::RateAndEmi { new_rate, new_emi },
            (true, None) => RateAdjustment::RateOnly { new_rate },
            (false, Some(new_emi)) => RateAdjustment::EmiOverride { new_emi },
            (false, None) => RateAdjustment::Reamortize,
        }
    }

    pub fn new_rate(&self) -> Option<Rate> {
        match self {
            RateAdjustment::RateOnly { new_rate } | RateAdjustment::RateAndEmi { new_rate, .. } => {
                Some(*new_rate)
            }
            RateAdjustment::EmiOverride { .. } | RateAdjustment::Reamortize => None,
        }
    }

    pub fn new_emi(&self) -> Option<Money> {
        match self {
            RateAdjustment::EmiOverride { new_emi } | RateAdjustment::RateAndEmi { new_emi, .. } => {
                Some(*new_emi)
            }
            RateAdjustment::RateOnly { .. } | RateAdjustment::Reamortize => None,
        }
    }
}

/// A rate and/or installment intervention starting at a payment number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateChange {
    pub id: String,
    pub month: u32,
    pub adjustment: RateAdjustment,
    /// Increase that produced an EMI override. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emi_increase_by: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RateChange {
    pub fn new(month: u32, adjustment: RateAdjustment) -> Self {
        Self {
            id: new_id(),
            month,
            adjustment,
            emi_increase_by: None,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_emi_increase(mut self, increase_by: Money) -> Self {
        self.emi_increase_by = Some(increase_by);
        self
    }
}

/// The input of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub payment_frequency: PaymentFrequency,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,
}

impl Loan {
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        term_years: u32,
        term_months: u32,
        start_date: NaiveDate,
        payment_frequency: PaymentFrequency,
    ) -> Self {
        Self {
            id: new_id(),
            principal,
            annual_rate,
            term_years,
            term_months,
            start_date,
            payment_frequency,
            extra_payments: Vec::new(),
            rate_changes: Vec::new(),
        }
    }

    /// Combined term in months. Saturates rather than wrapping on absurd input.
    pub fn total_months(&self) -> u32 {
        self.term_years
            .saturating_mul(12)
            .saturating_add(self.term_months)
    }

    pub fn with_extra_payment(&self, payment: ExtraPayment) -> Self {
        let mut loan = self.clone();
        loan.extra_payments.push(payment);
        loan
    }

    pub fn without_extra_payment(&self, payment_id: &str) -> Self {
        let mut loan = self.clone();
        loan.extra_payments.retain(|payment| payment.id != payment_id);
        loan
    }

    pub fn with_rate_change(&self, change: RateChange) -> Self {
        let mut loan = self.clone();
        loan.rate_changes.push(change);
        loan
    }

    pub fn without_rate_change(&self, change_id: &str) -> Self {
        let mut loan = self.clone();
        loan.rate_changes.retain(|change| change.id != change_id);
        loan
    }

    /// The same loan with every extra payment and rate change dropped.
    pub fn without_interventions(&self) -> Self {
        Self {
            extra_payments: Vec::new(),
            rate_changes: Vec::new(),
            ..self.clone()
        }
    }
}

/// One ledger row of a schedule. Money fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSchedule {
    pub payment_number: u32,
    pub date: NaiveDate,
    pub payment_amount: Money,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Top-line totals of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub total_payments: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    /// Installment of the first period, whatever the frequency.
    pub monthly_payment: Money,
    pub payoff_date: NaiveDate,
    pub total_cost: Money,
}

/// Deltas between a baseline schedule and a modified one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    pub interest_saved: Money,
    /// In periods; positive when the modified schedule pays off sooner.
    pub time_saved: i64,
    pub payment_reduced: Money,
}

/// A named, frozen snapshot of a loan and what it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub loan: Loan,
    pub schedule: Vec<PaymentSchedule>,
    pub summary: LoanSummary,
    pub is_modified: bool,
}

/// Two scenarios side by side with their savings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub original_scenario: Scenario,
    pub modified_scenario: Scenario,
    pub interest_saved: Money,
    pub time_saved: i64,
    pub payment_reduced: Money,
}
