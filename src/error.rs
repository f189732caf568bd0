use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the amortization engine and the state container around it.
#[derive(Debug, Error, PartialEq)]
pub enum AmortizationError {
    #[error("Invalid term: a loan needs at least one month, got {months}")]
    InvalidTerm { months: u32 },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Date out of range when stepping past {date}")]
    DateOutOfRange { date: NaiveDate },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::Serialization(e.to_string())
    }
}
