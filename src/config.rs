use std::path::Path;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Loan, Money, PaymentFrequency, Rate};

/// Defaults for the state container: the loan a fresh or reset store starts
/// from, the currency label and the persistence key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub default_principal: Money,
    pub default_annual_rate: Rate,
    pub default_term_years: u32,
    pub default_term_months: u32,
    pub default_frequency: PaymentFrequency,
    /// First payment date of the default loan; today when unset.
    pub default_start_date: Option<NaiveDate>,
    /// Display label only, never used in arithmetic.
    pub currency: String,
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_principal: dec!(300000),
            default_annual_rate: dec!(4.5),
            default_term_years: 30,
            default_term_months: 0,
            default_frequency: PaymentFrequency::Monthly,
            default_start_date: None,
            currency: "INR".to_string(),
            storage_key: "loan-visualizer-storage".to_string(),
        }
    }
}

impl StoreConfig {
    /// Parses a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid store configuration")
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading store configuration from {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("parsing store configuration from {}", path.display()))
    }

    /// Builds the loan a new or reset store starts with.
    pub fn default_loan(&self) -> Loan {
        Loan::new(
            self.default_principal,
            self.default_annual_rate,
            self.default_term_years,
            self.default_term_months,
            self.default_start_date
                .unwrap_or_else(|| Local::now().date_naive()),
            self.default_frequency,
        )
    }
}
