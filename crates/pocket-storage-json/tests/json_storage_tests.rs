use chrono::NaiveDate;
use pocket_core::{storage::LedgerStorage, CoreError};
use pocket_domain::{Income, IncomeKind, Ledger};
use pocket_storage_json::{JsonLedgerStorage, StoragePaths};
use rust_decimal::Decimal;
use std::fs;
use tempfile::tempdir;

fn sample_ledger(name: &str) -> Ledger {
    let mut ledger = Ledger::new(name);
    ledger.incomes.push(Income::new(
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        IncomeKind::Salary,
        "March pay",
        Decimal::new(125_050, 2),
    ));
    ledger
}

#[test]
fn json_storage_can_save_and_load_ledger() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");

    let ledger = sample_ledger("Household");
    storage.save_ledger("Household", &ledger).expect("save ledger");
    let loaded = storage.load_ledger("Household").expect("load ledger");

    assert_eq!(loaded, ledger);
    let path = storage.ledger_path("Household");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
    assert_eq!(storage.list_ledgers().unwrap(), vec!["household".to_string()]);
}

#[test]
fn loading_a_missing_ledger_reports_not_found() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    let err = storage.load_ledger("nothing").expect_err("missing ledger");
    assert!(matches!(err, CoreError::LedgerNotFound(_)));
}

#[test]
fn saving_over_an_existing_ledger_keeps_a_backup() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");

    let mut ledger = sample_ledger("Home");
    storage.save_ledger("home", &ledger).expect("first save");
    assert!(storage.list_backups("home").unwrap().is_empty());

    ledger.incomes.clear();
    storage.save_ledger("home", &ledger).expect("second save");

    let backups = storage.list_backups("home").expect("list backups");
    assert_eq!(backups.len(), 1);
    let previous = storage.restore_backup(&backups[0]).expect("restore");
    assert_eq!(previous.incomes.len(), 1);
    assert_eq!(storage.load_ledger("home").unwrap().incomes.len(), 1);
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::with_retention(StoragePaths::under(dir.path()), 2)
        .expect("create storage");
    let ledger = sample_ledger("Rolling");

    let mut created = Vec::new();
    for note in ["one", "two", "three"] {
        created.push(
            storage
                .backup_ledger("rolling", &ledger, Some(note))
                .expect("backup"),
        );
    }

    let backups = storage.list_backups("rolling").expect("list backups");
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|entry| entry.id != created[0].id));
    assert!(backups[0].id.ends_with("_three.json"));
}

#[test]
fn find_backup_accepts_prefixes() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    let info = storage
        .backup_ledger("home", &sample_ledger("Home"), Some("before import"))
        .expect("backup");
    assert!(info.id.ends_with("_before-import.json"));

    let found = storage
        .find_backup("home", &info.id[..info.id.len() - 5])
        .expect("find by prefix");
    assert_eq!(found.id, info.id);
    assert!(storage.find_backup("home", "zzz").is_err());
}

#[test]
fn corrupt_files_surface_as_serde_errors() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    fs::write(storage.ledger_path("broken"), "{ not json").expect("write");
    let err = storage.load_ledger("broken").expect_err("corrupt ledger");
    assert!(matches!(err, CoreError::Serde(_)));
}
