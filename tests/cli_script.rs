mod common;

use std::fs;

use predicates::prelude::*;
use predicates::str::contains;

use common::{script_command, test_home};

const SETUP: &str = r#"ledger new Demo
entity add name="North Bank" kind=bank
debt add entity="North Bank" description="Car loan" total=5000 installment=250 remaining=20
income add date=2024-03-15 kind=salary description=Pay amount=1000 confirmed=yes
expense add date=2024-03-15 kind=fixed category=rent description=Rent amount=200 paid=yes method=cash
due add date=2024-03-25 concept="Card bill" amount=120
"#;

#[test]
fn script_mode_builds_and_saves_a_ledger() {
    let home = test_home();
    let input = format!("{SETUP}ledger save\nexit\n");

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("New ledger `Demo` created"))
        .stdout(contains("Ledger `Demo` saved"));

    let json = fs::read_to_string(home.join("ledgers").join("demo.json")).unwrap();
    assert!(json.contains("\"North Bank\""));
    assert!(json.contains("\"Car loan\""));
}

#[test]
fn dashboard_reports_month_balance_and_upcoming_dues() {
    let home = test_home();
    let input = format!("{SETUP}dashboard 2024-03\nexit\n");

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Dashboard 2024-03"))
        .stdout(contains("Month balance       : 800.00 USD"))
        .stdout(contains("Monthly installments: 250.00 USD (25.00% of income)"))
        .stdout(contains("Card bill"));
}

#[test]
fn dashboard_accepts_the_month_as_a_key() {
    let home = test_home();
    let input = format!("{SETUP}dashboard month=2024-03\nexit\n");

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Dashboard 2024-03"))
        .stdout(contains("Month balance       : 800.00 USD"))
        .stdout(contains("Could not read month").not());
}

#[test]
fn command_errors_do_not_end_the_session() {
    let home = test_home();
    script_command(&home)
        .write_stdin("income list\nversion\nexit\n")
        .assert()
        .success()
        .stdout(contains("No ledger open"))
        .stdout(contains("Pocketbook"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = test_home();
    script_command(&home)
        .write_stdin("ledgr list\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `ledgr`"))
        .stdout(contains("Did you mean `ledger`?"));
}

#[test]
fn unknown_toggle_id_leaves_flags_alone() {
    let home = test_home();
    let input = format!("{SETUP}income confirm ffffffff\nincome list\nexit\n");

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Income not found: ffffffff"))
        .stdout(contains("No income to show."));
}

#[test]
fn unsaved_changes_are_reported_on_exit() {
    let home = test_home();
    script_command(&home)
        .write_stdin("ledger new Scratch\nentity add name=Acme\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unsaved changes to `Scratch` were discarded."));
}

#[test]
fn export_then_import_reproduces_records() {
    let home = test_home();
    let bundle = home.join("bundle");
    let input = format!(
        "{SETUP}export {dir}\nledger new Copy\nimport {dir}\nincome list --all\ndebt list\nexit\n",
        dir = bundle.display()
    );

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Exported 5 rows"))
        .stdout(contains("Imported 5 new and 0 updated record(s); 0 row(s) skipped."))
        .stdout(contains("Pay"))
        .stdout(contains("Car loan"));

    assert!(bundle.join("entities.csv").exists());
    assert!(bundle.join("due_items.csv").exists());
}

#[test]
fn export_writes_an_archive_that_imports_back() {
    let home = test_home();
    let bundle = home.join("bundle");
    let archive = home.join("bundle.zip");
    let input = format!(
        "{SETUP}export {dir}\nledger new Copy\nimport {zip}\ndebt list\nexit\n",
        dir = bundle.display(),
        zip = archive.display()
    );

    script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("bundle.zip"))
        .stdout(contains("Imported 5 new and 0 updated record(s); 0 row(s) skipped."))
        .stdout(contains("Car loan"));

    assert!(archive.is_file());
}

#[test]
fn config_set_persists_between_sessions() {
    let home = test_home();
    script_command(&home)
        .write_stdin("config set currency eur\nexit\n")
        .assert()
        .success()
        .stdout(contains("Set currency."));

    script_command(&home)
        .write_stdin("config show\nexit\n")
        .assert()
        .success()
        .stdout(contains("EUR"))
        .stdout(contains("show_completed").and(contains("false")));
}

#[test]
fn dashboard_json_lists_every_day_of_the_month() {
    let home = test_home();
    let input = format!("{SETUP}dashboard 2024-02 --json\nexit\n");

    let output = script_command(&home)
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("\"month\""));
    assert_eq!(stdout.matches("\"balance\"").count(), 29);
}

#[test]
fn deleted_ledgers_disappear_from_the_list() {
    let home = test_home();
    script_command(&home)
        .write_stdin("ledger new Keep\nledger new Drop\nledger delete Drop\nledger list\nexit\n")
        .assert()
        .success()
        .stdout(contains("Ledger `Drop` deleted."))
        .stdout(contains("keep"))
        .stdout(contains("No ledger open").not());
    assert!(!home.join("ledgers").join("drop.json").exists());
}
