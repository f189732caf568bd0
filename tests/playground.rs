use chrono::NaiveDate;
use loan_amortization::{
    FileStorage, LoanStore, LoanUpdate, PaymentFrequency, StoreConfig, calculate_savings,
    compare_scenarios, generate_amortization_schedule, validate_interventions,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;

#[fixture]
fn config() -> StoreConfig {
    StoreConfig {
        default_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        currency: "USD".to_string(),
        ..StoreConfig::default()
    }
}

#[rstest]
fn test_what_if_session(config: StoreConfig) {
    let mut store = LoanStore::new(config);
    let baseline = store.current_schedule();
    assert_eq!(baseline.len(), 360);

    store.create_scenario("Baseline");
    store.add_extra_payment(12, dec!(10000), Some("Bonus".to_string()));
    store.increase_emi(24, dec!(500));
    let modified = store.create_scenario("Bonus and higher EMI");

    let schedule = store.current_schedule();
    assert!(schedule.len() < 337);
    assert!(validate_interventions(store.current_loan()).is_empty());

    let savings = calculate_savings(&baseline, &schedule);
    assert_eq!(savings, store.savings_against_baseline());
    assert!(savings.interest_saved > dec!(25277.56));
    assert_eq!(savings.time_saved, 360 - schedule.len() as i64);
    assert_eq!(savings.payment_reduced, dec!(0));

    let scenarios = store.scenarios();
    let comparison = compare_scenarios(&scenarios[0], &scenarios[1]);
    assert_eq!(comparison.modified_scenario.id, modified);
    assert_eq!(comparison.interest_saved, savings.interest_saved);
}

#[rstest]
fn test_frequency_change_keeps_interventions(config: StoreConfig) {
    let mut store = LoanStore::new(config);
    store.add_extra_payment(12, dec!(10000), None);
    store.update_loan(LoanUpdate {
        payment_frequency: Some(PaymentFrequency::BiWeekly),
        ..LoanUpdate::default()
    });

    let schedule = store.current_schedule();
    assert_eq!(store.current_loan().extra_payments.len(), 1);
    assert_eq!(schedule[0].payment_amount, dec!(3293.46));
    assert_eq!(schedule[1].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert!(schedule.len() < 112);
}

#[rstest]
fn test_state_survives_restart(config: StoreConfig) {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path());

    let mut store = LoanStore::new(config.clone());
    store.add_rate_change(13, dec!(6), None, None);
    let scenario = store.create_scenario("Rate reset");
    store.persist(&mut storage).unwrap();

    let restored = LoanStore::restore(config, &storage).unwrap();
    assert_eq!(restored.active_scenario_id(), Some(scenario.as_str()));
    assert_eq!(restored.current_schedule(), store.current_schedule());
    assert_eq!(restored.current_summary().total_interest, dec!(341728.13));
    assert_eq!(restored.selected_currency(), "USD");

    let blob = std::fs::read_to_string(dir.path().join("loan-visualizer-storage.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(json["currentLoan"]["startDate"], "2024-01-01");
    assert_eq!(json["currentLoan"]["paymentFrequency"], "monthly");
    assert_eq!(json["currentLoan"]["rateChanges"][0]["adjustment"]["kind"], "rateOnly");
    assert_eq!(json["activeScenarioId"], scenario.as_str());
}

#[test]
fn test_schedule_is_independent_of_store() {
    let config = StoreConfig {
        default_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        default_term_years: 15,
        ..StoreConfig::default()
    };
    let store = LoanStore::new(config);
    let schedule = generate_amortization_schedule(store.current_loan()).unwrap();

    assert_eq!(schedule, store.current_schedule());
    assert_eq!(schedule[0].payment_amount, dec!(2294.98));
    assert_eq!(schedule.len(), 180);
}
