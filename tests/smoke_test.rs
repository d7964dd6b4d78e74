mod common;

use common::{assert_consistent, date};
use ledger_core::{
    config::{Config, ConfigManager},
    core::services::{BudgetSyncPolicy, SearchMode},
    domain::{Month, TransactionKind},
    init, LedgerStore,
};

#[test]
fn ledger_store_smoke() {
    init();

    let base = common::temp_base();
    let manager = ConfigManager::with_base_dir(base).unwrap();
    let config = Config {
        search_mode: SearchMode::TitleOnly,
        budget_sync: BudgetSyncPolicy::AddOnly,
        ..Config::default()
    };
    manager.save(&config).unwrap();

    let mut store = LedgerStore::from_config(&manager.load().unwrap());
    assert_eq!(store.options().budget_sync, BudgetSyncPolicy::AddOnly);

    let salary = store
        .record(TransactionKind::Income, "Salary", 15_000_000, date("2025-04-01"), None)
        .unwrap();
    let rent = store
        .record(
            TransactionKind::Expense,
            "Rent",
            5_000_000,
            date("2025-04-02"),
            Some("Housing".into()),
        )
        .unwrap();
    assert_ne!(salary, rent);

    store
        .create_budget("Housing", 6_000_000, date("2025-04-01"), date("2025-04-30"))
        .unwrap();
    assert_eq!(store.remaining_amount(), 1_000_000);

    // Title-only search ignores amounts.
    assert!(store.filtered_transactions("5000000").is_empty());

    let april: Month = "2025-04".parse().unwrap();
    assert_eq!(store.monthly_expense_total(april), 5_000_000);
    assert_eq!(store.transactions_in_month(april)[0].title, "Rent");
    assert_eq!(store.transactions_on(date("2025-04-01")).len(), 1);

    store.set_selected_expense_type(Some("Housing".into()));
    store.set_selected_date(Some(date("2025-04-02")));
    assert_eq!(store.selection().expense_type.as_deref(), Some("Housing"));

    assert_consistent(&store);
}
