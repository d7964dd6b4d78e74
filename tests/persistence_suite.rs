mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::{assert_consistent, date, state_json, store, temp_base};
use ledger_core::{
    domain::{Plan, Transaction},
    storage::{
        json_backend::{load_ledger_from_path, save_ledger_to_path},
        JsonSnapshotStore, MemorySnapshotStore, SnapshotStore,
    },
    LedgerError,
};
use serde_json::Value;

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension("json.tmp");
    tmp
}

fn populated() -> ledger_core::LedgerStore {
    let mut store = store();
    store
        .add_transaction(Transaction::income("1", "Salary", 1_000, date("2025-04-01")))
        .unwrap();
    store
        .add_transaction(
            Transaction::expense("2", "Market", 120, date("2025-04-03")).with_category("Food"),
        )
        .unwrap();
    store
        .create_budget("Food", 500, date("2025-04-01"), date("2025-04-30"))
        .unwrap();
    store
        .add_plan(Plan::new("p1", "Laptop", 200, 1_500, date("2025-12-31")))
        .unwrap();
    store.set_search_query("market");
    store
}

#[test]
fn json_snapshot_round_trips_full_state() {
    let base = temp_base();
    let snapshots = JsonSnapshotStore::new(&base, Some(3)).unwrap();
    let original = populated();
    original.save_to(&snapshots, "household").unwrap();

    let mut restored = store();
    let warnings = restored.load_from(&snapshots, "household").unwrap();
    assert!(warnings.is_empty());
    assert_eq!(state_json(&restored), state_json(&original));
    assert_eq!(restored.search_results().len(), 1);
    assert_eq!(snapshots.keys().unwrap(), vec!["household".to_string()]);
}

#[test]
fn memory_store_round_trips_and_deletes() {
    let snapshots = MemorySnapshotStore::new();
    let original = populated();
    original.save_to(&snapshots, "mem").unwrap();

    let mut restored = store();
    restored.load_from(&snapshots, "mem").unwrap();
    assert_eq!(restored.ledger(), original.ledger());

    snapshots.delete("mem").unwrap();
    assert!(matches!(
        restored.load_from(&snapshots, "mem"),
        Err(LedgerError::Storage(_))
    ));
}

#[test]
fn tampered_totals_are_repaired_with_warnings() {
    let base = temp_base();
    let snapshots = JsonSnapshotStore::new(&base, None).unwrap();
    populated().save_to(&snapshots, "tampered").unwrap();

    let path = snapshots.snapshot_path("tampered");
    let mut json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["balance"] = Value::from(5);
    json["budgets"][0]["spent_amount"] = Value::from(999);
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let mut restored = store();
    let warnings = restored.load_from(&snapshots, "tampered").unwrap();
    assert!(warnings.len() >= 2, "{:?}", warnings);
    assert_eq!(restored.balance(), 880);
    assert_eq!(restored.budgets()[0].spent_amount, 120);
    assert_consistent(&restored);
}

#[test]
fn duplicate_ids_reject_snapshot_and_keep_current_state() {
    let base = temp_base();
    let snapshots = JsonSnapshotStore::new(&base, None).unwrap();
    populated().save_to(&snapshots, "dupes").unwrap();

    let path = snapshots.snapshot_path("dupes");
    let mut json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["transactions"][1]["id"] = Value::from("1");
    fs::write(&path, json.to_string()).unwrap();

    let mut current = store();
    current
        .add_transaction(Transaction::income("x", "Gift", 50, date("2025-04-05")))
        .unwrap();
    let before = state_json(&current);
    assert!(matches!(
        current.load_from(&snapshots, "dupes"),
        Err(LedgerError::Storage(_))
    ));
    assert_eq!(state_json(&current), before);
}

#[test]
fn snapshot_with_overflowing_amounts_is_rejected() {
    let base = temp_base();
    let snapshots = JsonSnapshotStore::new(&base, None).unwrap();
    populated().save_to(&snapshots, "huge").unwrap();

    let path = snapshots.snapshot_path("huge");
    let mut json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    for txn in json["transactions"].as_array_mut().unwrap() {
        txn["type"] = Value::from("income");
        txn["amount"] = Value::from(i64::MAX);
    }
    fs::write(&path, json.to_string()).unwrap();

    let mut current = store();
    let before = state_json(&current);
    assert!(matches!(
        current.load_from(&snapshots, "huge"),
        Err(LedgerError::Storage(_))
    ));
    assert_eq!(state_json(&current), before);
}

#[test]
fn newer_schema_is_rejected() {
    let base = temp_base();
    let path = base.join("future.json");
    save_ledger_to_path(populated().ledger(), &path).unwrap();

    let mut json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["schema_version"] = Value::from(99);
    fs::write(&path, json.to_string()).unwrap();

    assert!(matches!(
        load_ledger_from_path(&path),
        Err(LedgerError::Storage(_))
    ));
}

#[test]
fn overwriting_snapshot_keeps_bounded_backups() {
    let base = temp_base();
    let snapshots = JsonSnapshotStore::new(&base, Some(2)).unwrap();
    let mut store = populated();
    for idx in 0..4 {
        store
            .add_transaction(Transaction::income(
                format!("extra-{}", idx),
                "Bonus",
                10,
                date("2025-04-10"),
            ))
            .unwrap();
        store.save_to(&snapshots, "rolling").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let backups = snapshots.list_backups("rolling").unwrap();
    assert_eq!(backups.len(), 2);

    // Newest backup is the state before the last save: three bonuses.
    let restored = snapshots.restore_backup("rolling", &backups[0]).unwrap();
    assert_eq!(restored.income, 1_030);
    assert!(!tmp_path_for(&snapshots.snapshot_path("rolling")).exists());
}

#[test]
fn missing_snapshot_is_a_storage_error() {
    let base = temp_base();
    let snapshots = JsonSnapshotStore::new(&base, None).unwrap();
    let mut store = store();
    assert!(matches!(
        store.load_from(&snapshots, "absent"),
        Err(LedgerError::Storage(_))
    ));
    assert!(matches!(
        snapshots.restore_backup("absent", "nothing.json"),
        Err(LedgerError::Storage(_))
    ));
}
