#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use ledger_core::{
    core::{services::BudgetSyncPolicy, FixedClock, SequentialIdGenerator},
    Ledger, LedgerStore, StoreOptions,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that survives until the test binary exits.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

/// Store with deterministic `id-N` ids and a clock pinned to 2025-04-18.
pub fn store_with(policy: BudgetSyncPolicy) -> LedgerStore {
    LedgerStore::with_collaborators(
        Ledger::new(),
        StoreOptions {
            budget_sync: policy,
            ..StoreOptions::default()
        },
        Box::new(SequentialIdGenerator::new("id")),
        Box::new(FixedClock::on(date("2025-04-18"))),
    )
}

pub fn store() -> LedgerStore {
    store_with(BudgetSyncPolicy::Strict)
}

/// Serialized state, for byte-for-byte comparisons.
pub fn state_json(store: &LedgerStore) -> String {
    serde_json::to_string(store.ledger()).expect("serialize ledger")
}

/// Asserts the aggregate invariants against a full recomputation.
pub fn assert_consistent(store: &LedgerStore) {
    let ledger = store.ledger();
    assert_eq!(Some(ledger.running_totals()), ledger.summed_totals(), "running totals drifted");
    assert_eq!(store.balance(), store.income() - store.expense());
    for budget in store.budgets() {
        assert_eq!(
            budget.spent_amount,
            budget.spend_in(store.transactions()),
            "budget {} spent amount drifted",
            budget.id
        );
    }
}
