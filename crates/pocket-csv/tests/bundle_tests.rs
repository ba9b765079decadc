use std::fs;

use chrono::NaiveDate;
use pocket_core::{CoreError, DebtService, DueItemService, EntityService, ExpenseService, IncomeService};
use pocket_csv::{archive_path, export_archive, export_bundle, import_bundle, BUNDLE_FILES};
use pocket_domain::{
    Debt, DebtKind, DueItem, Entity, EntityKind, Expense, ExpenseKind, Income, IncomeKind,
    Ledger, PaymentMethod, Priority,
};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn populated_ledger() -> Ledger {
    let mut ledger = Ledger::new("Household");
    let bank = EntityService::add(&mut ledger, Entity::new("North Bank", EntityKind::Bank), today())
        .unwrap();
    EntityService::add(&mut ledger, Entity::new("Academy", EntityKind::School), today()).unwrap();

    let mut loan = Debt::new(Some(bank), DebtKind::Loan, "Car loan", Decimal::new(850_000, 2))
        .with_installment(Decimal::new(25_000, 2), Some(34));
    loan.priority = Priority::High;
    loan.due_date = Some(date(28));
    loan.notes = "fixed rate, 12%".into();
    let loan = DebtService::add(&mut ledger, loan, today()).unwrap();

    IncomeService::add(
        &mut ledger,
        Income::new(date(1), IncomeKind::Salary, "March pay", Decimal::new(120_000, 2)).confirmed(),
        today(),
    )
    .unwrap();
    let mut payment = Expense::new(
        date(5),
        ExpenseKind::DebtPayment,
        "loans",
        "Car installment",
        Decimal::new(25_000, 2),
    )
    .with_method(PaymentMethod::Debit)
    .paid();
    payment.debt_id = Some(loan);
    ExpenseService::add(&mut ledger, payment, today()).unwrap();
    DueItemService::add(
        &mut ledger,
        DueItem::new(date(28), "Car installment", Decimal::new(25_000, 2)).for_debt(loan),
        today(),
    )
    .unwrap();
    ledger
}

#[test]
fn export_writes_every_file_with_its_header() {
    let dir = tempdir().expect("tempdir");
    let report = export_bundle(&populated_ledger(), dir.path()).expect("export");

    assert_eq!(report.files.len(), 5);
    assert_eq!(report.total_rows(), 6);
    for file in BUNDLE_FILES {
        let contents = fs::read_to_string(dir.path().join(file.name)).expect("read file");
        let header = contents.lines().next().expect("header row");
        assert_eq!(header, file.columns.join(","));
    }

    let debts = fs::read_to_string(dir.path().join("debts.csv")).unwrap();
    assert!(debts.contains("North Bank,loan,Car loan,8500.00,0.00,2024-03-28,,current,high,250.00,34,\"fixed rate, 12%\""));
    let expenses = fs::read_to_string(dir.path().join("expenses.csv")).unwrap();
    assert!(expenses.contains("2024-03-05,debt_payment,loans,Car installment,250.00,true,debit,Car loan"));
}

#[test]
fn export_of_an_empty_ledger_still_writes_headers() {
    let dir = tempdir().expect("tempdir");
    let report = export_bundle(&Ledger::new("Empty"), dir.path()).expect("export");
    assert_eq!(report.total_rows(), 0);
    let incomes = fs::read_to_string(dir.path().join("incomes.csv")).unwrap();
    assert_eq!(incomes.trim_end(), "date,kind,description,amount,confirmed");
}

#[test]
fn export_then_import_reproduces_the_records() {
    let source = populated_ledger();
    let root = tempdir().expect("tempdir");
    let dir = root.path().join("household-2024-03");
    let archive = archive_path(&dir);
    assert_eq!(archive, root.path().join("household-2024-03.zip"));
    export_bundle(&source, &dir).expect("export directory");
    let written = export_archive(&source, &archive).expect("export archive");
    assert_eq!(written.path, archive);
    assert_eq!(written.total_rows(), 6);

    let mut from_dir = Ledger::new("Copy");
    import_bundle(&mut from_dir, &dir, today()).expect("import directory");

    let mut target = Ledger::new("Copy");
    let report = import_bundle(&mut target, &archive, today()).expect("import archive");
    assert_eq!(report.created(), 6);
    assert_eq!(report.skipped(), 0);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(target.record_count(), from_dir.record_count());

    assert_eq!(target.entities.len(), 2);
    let loan = target.debt_by_description("Car loan").expect("debt imported");
    assert_eq!(target.entity_name_for(loan), "North Bank");
    assert_eq!(loan.total_amount, Decimal::new(850_000, 2));
    assert_eq!(loan.monthly_installment, Some(Decimal::new(25_000, 2)));
    assert_eq!(loan.remaining_installments, Some(34));
    assert_eq!(loan.priority, Priority::High);
    assert_eq!(loan.notes, "fixed rate, 12%");

    let expense = &target.expenses[0];
    assert!(expense.paid);
    assert_eq!(expense.payment_method, PaymentMethod::Debit);
    assert_eq!(expense.debt_id, Some(loan.id));
    assert_eq!(target.due_items[0].debt_id, Some(loan.id));
    assert!(target.incomes[0].confirmed);
}

#[test]
fn empty_archive_reads_every_file_and_changes_nothing() {
    let root = tempdir().expect("tempdir");
    let archive = root.path().join("nested").join("empty.zip");
    export_archive(&Ledger::new("Empty"), &archive).expect("export archive");

    let mut ledger = populated_ledger();
    let before = ledger.record_count();
    let report = import_bundle(&mut ledger, &archive, today()).expect("import");
    assert_eq!(report.files.len(), 5);
    assert!(report.files.iter().all(|file| file.read));
    assert_eq!(ledger.record_count(), before);
}

#[test]
fn files_that_are_not_archives_are_rejected() {
    let root = tempdir().expect("tempdir");
    let bogus = root.path().join("bundle.zip");
    fs::write(&bogus, "date,kind\n").unwrap();

    let mut ledger = populated_ledger();
    let before = ledger.clone();
    import_bundle(&mut ledger, &bogus, today()).expect_err("not a zip archive");
    assert_eq!(ledger, before);
}

#[test]
fn importing_twice_updates_instead_of_duplicating() {
    let dir = tempdir().expect("tempdir");
    export_bundle(&populated_ledger(), dir.path()).expect("export");

    let mut target = Ledger::new("Copy");
    import_bundle(&mut target, dir.path(), today()).expect("first import");
    let report = import_bundle(&mut target, dir.path(), today()).expect("second import");

    assert_eq!(report.created(), 0);
    assert_eq!(report.updated(), 6);
    assert_eq!(target.record_count(), 6);
}

#[test]
fn bad_rows_are_skipped_and_the_rest_imported() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("incomes.csv"),
        "date,kind,description,amount,confirmed\n\
         2024-03-01,salary,March pay,1200,sí\n\
         not-a-date,salary,Broken,10,true\n\
         2024-03-02,bonus,Zero bonus,0,true\n\
         2024-03-03,lottery,Unknown kind,5,no\n\
         2024-03-04,bonus,Too large,50000000000000000000000000000,yes\n",
    )
    .unwrap();

    let mut ledger = Ledger::new("Rows");
    let report = import_bundle(&mut ledger, dir.path(), today()).expect("import");

    let incomes = report.file("incomes.csv").expect("incomes counted");
    assert_eq!(incomes.created, 1);
    assert_eq!(incomes.skipped, 4);
    assert!(report.warnings.iter().any(|w| w.starts_with("incomes.csv row 2")));
    assert!(report.warnings.iter().any(|w| w.starts_with("incomes.csv row 3")));
    assert!(report
        .warnings
        .iter()
        .any(|w| w.starts_with("incomes.csv row 5") && w.contains("must not exceed")));
    assert_eq!(ledger.incomes.len(), 1);
    assert!(ledger.incomes[0].confirmed);
}

#[test]
fn missing_files_and_wrong_headers_are_skipped() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("entities.csv"),
        "nombre,tipo\nNorth Bank,bank\n",
    )
    .unwrap();

    let mut ledger = Ledger::new("Headers");
    let report = import_bundle(&mut ledger, dir.path(), today()).expect("import");

    assert!(ledger.entities.is_empty());
    assert!(!report.file("entities.csv").unwrap().read);
    assert!(!report.file("debts.csv").unwrap().read);
    assert!(report.warnings.iter().any(|w| w.contains("expected columns")));
    assert_eq!(
        report
            .warnings
            .iter()
            .filter(|w| w.contains("file not found"))
            .count(),
        4
    );
}

#[test]
fn unresolved_references_become_empty() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("debts.csv"),
        "entity,kind,description,total_amount,minimum_payment,due_date,next_payment,status,priority,monthly_installment,remaining_installments,notes\n\
         Ghost Bank,card,Visa,300,,,,current,low,,,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("due_items.csv"),
        "date,concept,amount,debt,status,notes\n2024-03-25,Phone,30,Missing debt,pending,\n",
    )
    .unwrap();

    let mut ledger = Ledger::new("Refs");
    import_bundle(&mut ledger, dir.path(), today()).expect("import");

    assert_eq!(ledger.debts.len(), 1);
    assert_eq!(ledger.debts[0].entity_id, None);
    assert_eq!(ledger.debts[0].minimum_payment, Decimal::ZERO);
    assert_eq!(ledger.due_items.len(), 1);
    assert_eq!(ledger.due_items[0].debt_id, None);
}

#[test]
fn missing_directory_fails_without_touching_the_ledger() {
    let dir = tempdir().expect("tempdir");
    let mut ledger = populated_ledger();
    let before = ledger.clone();

    let err = import_bundle(&mut ledger, &dir.path().join("absent"), today())
        .expect_err("missing directory");
    assert!(matches!(err, CoreError::Io(_)));
    assert_eq!(ledger, before);
}
