//! Application state around the engine.
//!
//! [`LoanStore`] owns the live loan and the saved scenarios. Every mutation
//! replaces the loan with a new value and re-validates it; schedules and
//! summaries are computed from the loan when asked for, never stored.

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::error::AmortizationError;
use crate::schedule::generate_amortization_schedule;
use crate::storage::StateStorage;
use crate::summary::calculate_loan_summary;
use crate::types::{
    ExtraPayment, Loan, LoanSummary, Money, PaymentFrequency, PaymentSchedule, Rate, RateAdjustment,
    RateChange, Savings, Scenario, new_id,
};
use crate::validation::{LoanDraft, validate_loan};
use crate::what_if::{baseline_savings, emi_increase};
use crate::AmortizationResult;

/// Field-wise edit of the live loan. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanUpdate {
    pub principal: Option<Money>,
    pub annual_rate: Option<Rate>,
    pub term_years: Option<u32>,
    pub term_months: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub payment_frequency: Option<PaymentFrequency>,
}

impl LoanUpdate {
    fn apply_to(&self, loan: &Loan) -> Loan {
        Loan {
            principal: self.principal.unwrap_or(loan.principal),
            annual_rate: self.annual_rate.unwrap_or(loan.annual_rate),
            term_years: self.term_years.unwrap_or(loan.term_years),
            term_months: self.term_months.unwrap_or(loan.term_months),
            start_date: self.start_date.unwrap_or(loan.start_date),
            payment_frequency: self.payment_frequency.unwrap_or(loan.payment_frequency),
            ..loan.clone()
        }
    }
}

/// The part of the store that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub current_loan: Loan,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub active_scenario_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoanStore {
    config: StoreConfig,
    current_loan: Loan,
    scenarios: Vec<Scenario>,
    active_scenario_id: Option<String>,
    errors: Vec<String>,
    selected_currency: String,
}

impl LoanStore {
    pub fn new(config: StoreConfig) -> Self {
        let current_loan = config.default_loan();
        let selected_currency = config.currency.clone();
        Self {
            errors: validate_loan(&LoanDraft::from(&current_loan)),
            config,
            current_loan,
            scenarios: Vec::new(),
            active_scenario_id: None,
            selected_currency,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn current_loan(&self) -> &Loan {
        &self.current_loan
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn active_scenario_id(&self) -> Option<&str> {
        self.active_scenario_id.as_deref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn selected_currency(&self) -> &str {
        &self.selected_currency
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn update_currency(&mut self, currency: impl Into<String>) {
        self.selected_currency = currency.into();
    }

    fn replace_loan(&mut self, loan: Loan) {
        self.errors = validate_loan(&LoanDraft::from(&loan));
        self.current_loan = loan;
    }

    pub fn update_loan(&mut self, update: LoanUpdate) {
        let loan = update.apply_to(&self.current_loan);
        self.replace_loan(loan);
    }

    /// Adds a lump-sum payment and returns its id.
    pub fn add_extra_payment(&mut self, month: u32, amount: Money, description: Option<String>) -> String {
        let mut payment = ExtraPayment::new(month, amount);
        payment.description = description;
        let id = payment.id.clone();

        debug!(month, %amount, payment_id = %id, "adding extra payment");
        let loan = self.current_loan.with_extra_payment(payment);
        self.replace_loan(loan);
        id
    }

    pub fn remove_extra_payment(&mut self, payment_id: &str) {
        let loan = self.current_loan.without_extra_payment(payment_id);
        self.replace_loan(loan);
    }

    /// Adds a rate change from raw form inputs and returns its id.
    ///
    /// A `new_rate <= 0` keeps the current rate; a missing or non-positive
    /// `new_emi` re-amortizes the installment.
    pub fn add_rate_change(
        &mut self,
        month: u32,
        new_rate: Rate,
        description: Option<String>,
        new_emi: Option<Money>,
    ) -> String {
        let mut change = RateChange::new(month, RateAdjustment::from_inputs(new_rate, new_emi));
        change.description = description;
        self.push_rate_change(change)
    }

    /// Raises the installment paid at `month` by `increase_by` from that
    /// month on. Returns `None` if the current schedule has no such payment.
    pub fn increase_emi(&mut self, month: u32, increase_by: Money) -> Option<String> {
        let schedule = self.current_schedule();
        let change = emi_increase(&schedule, month, increase_by)?;
        Some(self.push_rate_change(change))
    }

    fn push_rate_change(&mut self, change: RateChange) -> String {
        let id = change.id.clone();
        debug!(month = change.month, adjustment = ?change.adjustment, change_id = %id, "adding rate change");
        let loan = self.current_loan.with_rate_change(change);
        self.replace_loan(loan);
        id
    }

    pub fn remove_rate_change(&mut self, change_id: &str) {
        let loan = self.current_loan.without_rate_change(change_id);
        self.replace_loan(loan);
    }

    /// The schedule of the live loan. Generation errors are logged and give an
    /// empty schedule.
    pub fn current_schedule(&self) -> Vec<PaymentSchedule> {
        generate_amortization_schedule(&self.current_loan).unwrap_or_else(|e| {
            error!(loan_id = %self.current_loan.id, error = %e, "error generating schedule");
            Vec::new()
        })
    }

    pub fn current_summary(&self) -> LoanSummary {
        calculate_loan_summary(&self.current_schedule(), &self.current_loan)
    }

    /// Savings of the live loan against itself without interventions.
    pub fn savings_against_baseline(&self) -> Savings {
        baseline_savings(&self.current_loan).unwrap_or_else(|e| {
            error!(loan_id = %self.current_loan.id, error = %e, "error comparing with baseline");
            Savings::default()
        })
    }

    /// Snapshots the live loan under `name`, makes it active and returns its id.
    pub fn create_scenario(&mut self, name: impl Into<String>) -> String {
        let schedule = self.current_schedule();
        let summary = calculate_loan_summary(&schedule, &self.current_loan);
        let is_modified = !self.current_loan.extra_payments.is_empty()
            || !self.current_loan.rate_changes.is_empty();
        let scenario = Scenario {
            id: new_id(),
            name: name.into(),
            loan: self.current_loan.clone(),
            schedule,
            summary,
            is_modified,
        };
        let id = scenario.id.clone();

        info!(scenario_id = %id, name = %scenario.name, "scenario created");
        self.scenarios.push(scenario);
        self.active_scenario_id = Some(id.clone());
        id
    }

    /// Makes a saved scenario's loan the live loan.
    pub fn switch_scenario(&mut self, scenario_id: &str) -> AmortizationResult<()> {
        let loan = self
            .scenarios
            .iter()
            .find(|scenario| scenario.id == scenario_id)
            .map(|scenario| scenario.loan.clone())
            .ok_or_else(|| AmortizationError::ScenarioNotFound(scenario_id.to_string()))?;

        self.replace_loan(loan);
        self.active_scenario_id = Some(scenario_id.to_string());
        Ok(())
    }

    /// Removes a scenario. Deleting the active one activates the first
    /// remaining scenario, if any.
    pub fn delete_scenario(&mut self, scenario_id: &str) {
        self.scenarios.retain(|scenario| scenario.id != scenario_id);
        if self.active_scenario_id.as_deref() == Some(scenario_id) {
            self.active_scenario_id = self.scenarios.first().map(|scenario| scenario.id.clone());
        }
    }

    /// Goes back to the configured default loan. Scenarios are kept.
    pub fn reset_loan(&mut self) {
        self.current_loan = self.config.default_loan();
        self.active_scenario_id = None;
        self.errors.clear();
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn to_state(&self) -> PersistedState {
        PersistedState {
            current_loan: self.current_loan.clone(),
            scenarios: self.scenarios.clone(),
            active_scenario_id: self.active_scenario_id.clone(),
        }
    }

    pub fn from_state(config: StoreConfig, state: PersistedState) -> Self {
        let selected_currency = config.currency.clone();
        Self {
            errors: validate_loan(&LoanDraft::from(&state.current_loan)),
            config,
            current_loan: state.current_loan,
            scenarios: state.scenarios,
            active_scenario_id: state.active_scenario_id,
            selected_currency,
        }
    }

    pub fn to_json(&self) -> AmortizationResult<String> {
        Ok(serde_json::to_string(&self.to_state())?)
    }

    pub fn from_json(config: StoreConfig, json: &str) -> AmortizationResult<Self> {
        let state: PersistedState = serde_json::from_str(json)?;
        Ok(Self::from_state(config, state))
    }

    /// Saves the persisted part of the store under the configured key.
    pub fn persist(&self, storage: &mut impl StateStorage) -> anyhow::Result<()> {
        let blob = self.to_json().context("serializing loan state")?;
        storage.save(&self.config.storage_key, &blob)?;
        debug!(key = %self.config.storage_key, bytes = blob.len(), "loan state persisted");
        Ok(())
    }

    /// Loads a store saved by [`LoanStore::persist`], or a fresh one if the
    /// storage has nothing under the configured key.
    pub fn restore(config: StoreConfig, storage: &impl StateStorage) -> anyhow::Result<Self> {
        match storage.load(&config.storage_key)? {
            Some(blob) => {
                let key = config.storage_key.clone();
                Self::from_json(config, &blob)
                    .with_context(|| format!("restoring loan state from {key}"))
            }
            None => {
                info!(key = %config.storage_key, "no saved loan state, starting fresh");
                Ok(Self::new(config))
            }
        }
    }
}
