//! `loan_amortization` is a Rust library for exploring loan amortization schedules.
//!
//! It turns a loan definition and the interventions a borrower plans into a
//! period-by-period payment ledger, and answers "what if" questions about it:
//! - **Extra payments**: one-time lump sums applied to principal at a given payment.
//! - **Rate changes**: a new rate, a forced installment (EMI), or both, from a given
//!   payment onwards.
//! - **Savings**: interest, time and installment differences against the loan
//!   without interventions.
//! - **Scenarios**: named snapshots kept by a state container that can be persisted.
//!
//! ## Usage
//!
//! Add `loan_amortization` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! loan_amortization = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then build a [`Loan`], add interventions and generate its schedule:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use loan_amortization::{
//!     baseline_savings, calculate_loan_summary, generate_amortization_schedule, ExtraPayment,
//!     Loan, PaymentFrequency,
//! };
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let loan = Loan::new(
//!         dec!(300_000),
//!         dec!(4.5),
//!         30,
//!         0,
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         PaymentFrequency::Monthly,
//!     )
//!     .with_extra_payment(ExtraPayment::new(12, dec!(10_000)));
//!
//!     match generate_amortization_schedule(&loan) {
//!         Ok(schedule) => {
//!             let summary = calculate_loan_summary(&schedule, &loan);
//!             println!("First payment:  {:.2}", summary.monthly_payment);
//!             println!("Payments:       {}", summary.total_payments);
//!             println!("Total interest: {:.2}", summary.total_interest);
//!             println!("Paid off on:    {}", summary.payoff_date);
//!
//!             let savings = baseline_savings(&loan).unwrap();
//!             println!("Interest saved: {:.2}", savings.interest_saved);
//!             println!("Payments saved: {}", savings.time_saved);
//!         }
//!         Err(e) => {
//!             eprintln!("Error generating schedule: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod payment;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod summary;
pub mod types;
pub mod validation;
pub mod what_if;

pub use config::StoreConfig;
pub use error::AmortizationError;
pub use payment::{calculate_monthly_payment, monthly_rate, round_money};
pub use schedule::generate_amortization_schedule;
pub use storage::{FileStorage, MemoryStorage, StateStorage};
pub use store::{LoanStore, LoanUpdate, PersistedState};
pub use summary::{calculate_loan_summary, calculate_savings, compare_scenarios};
pub use types::*;
pub use validation::{validate_interventions, validate_loan, LoanDraft};
pub use what_if::{baseline_savings, emi_increase, remaining_balance_at};

/// Result type of every fallible engine operation.
pub type AmortizationResult<T> = Result<T, AmortizationError>;
