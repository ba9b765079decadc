use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use pocket_core::{
    CoreError, DebtService, DueItemService, EntityService, ExpenseService, IncomeService,
};
use pocket_domain::{Debt, DueItem, Entity, Expense, Income, Ledger};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use zip::{result::ZipError, ZipArchive};

use crate::{
    bundle::{
        csv_error, ensure_dir, parse_amount, parse_bool, parse_choice, parse_date,
        parse_optional_count, parse_optional_date, parse_optional_decimal, zip_error, BundleFile,
        DEBTS, DUE_ITEMS, ENTITIES, EXPENSES, INCOMES,
    },
    report::{FileImport, ImportReport},
};

#[derive(Debug, Deserialize)]
struct EntityRow {
    name: String,
    kind: String,
}

#[derive(Debug, Deserialize)]
struct DebtRow {
    entity: String,
    kind: String,
    description: String,
    total_amount: String,
    minimum_payment: String,
    due_date: String,
    next_payment: String,
    status: String,
    priority: String,
    monthly_installment: String,
    remaining_installments: String,
    notes: String,
}

#[derive(Debug, Deserialize)]
struct IncomeRow {
    date: String,
    kind: String,
    description: String,
    amount: String,
    confirmed: String,
}

#[derive(Debug, Deserialize)]
struct ExpenseRow {
    date: String,
    kind: String,
    category: String,
    description: String,
    amount: String,
    paid: String,
    payment_method: String,
    debt: String,
}

#[derive(Debug, Deserialize)]
struct DueItemRow {
    date: String,
    concept: String,
    amount: String,
    debt: String,
    status: String,
    notes: String,
}

/// Whether a row inserted a new record or refreshed an existing one.
enum Upsert {
    Created,
    Updated,
}

/// Where bundle files are read from.
enum BundleSource {
    Directory(PathBuf),
    Archive(ZipArchive<File>),
}

impl BundleSource {
    /// A regular file is read as a zip archive, anything else as a directory.
    fn open(path: &Path) -> Result<Self, CoreError> {
        if path.is_file() {
            let archive = ZipArchive::new(File::open(path)?).map_err(zip_error)?;
            return Ok(Self::Archive(archive));
        }
        ensure_dir(path)?;
        Ok(Self::Directory(path.to_path_buf()))
    }

    /// Contents of one bundle file, or `None` when the bundle lacks it.
    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, CoreError> {
        match self {
            Self::Directory(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                Ok(Some(fs::read(path)?))
            }
            Self::Archive(archive) => match archive.by_name(name) {
                Ok(mut entry) => {
                    let mut bytes = Vec::new();
                    entry.read_to_end(&mut bytes)?;
                    Ok(Some(bytes))
                }
                Err(ZipError::FileNotFound) => Ok(None),
                Err(err) => Err(zip_error(err)),
            },
        }
    }
}

/// Imports a bundle from `path` into `ledger`.
///
/// `path` is either a bundle directory or a zip archive written by
/// [`export_archive`](crate::export_archive). Records are matched on their
/// natural key and updated in place, or inserted when no match exists. Rows
/// that fail to parse or validate are skipped with a warning. The ledger is
/// only replaced once every file has been processed; any I/O error leaves it
/// untouched.
pub fn import_bundle(
    ledger: &mut Ledger,
    path: &Path,
    today: NaiveDate,
) -> Result<ImportReport, CoreError> {
    let mut source = BundleSource::open(path)?;
    let mut working = ledger.clone();
    let mut report = ImportReport::default();

    import_file(&mut source, ENTITIES, &mut report, |row: EntityRow| {
        upsert_entity(&mut working, row, today)
    })?;
    import_file(&mut source, DEBTS, &mut report, |row: DebtRow| {
        upsert_debt(&mut working, row, today)
    })?;
    import_file(&mut source, INCOMES, &mut report, |row: IncomeRow| {
        upsert_income(&mut working, row, today)
    })?;
    import_file(&mut source, EXPENSES, &mut report, |row: ExpenseRow| {
        upsert_expense(&mut working, row, today)
    })?;
    import_file(&mut source, DUE_ITEMS, &mut report, |row: DueItemRow| {
        upsert_due_item(&mut working, row, today)
    })?;

    *ledger = working;
    info!(
        bundle = %path.display(),
        created = report.created(),
        updated = report.updated(),
        skipped = report.skipped(),
        "imported bundle"
    );
    Ok(report)
}

fn import_file<R, F>(
    source: &mut BundleSource,
    file: BundleFile,
    report: &mut ImportReport,
    mut apply: F,
) -> Result<(), CoreError>
where
    R: for<'de> Deserialize<'de>,
    F: FnMut(R) -> Result<Upsert, String>,
{
    let mut counts = FileImport::new(file.name);
    let Some(bytes) = source.read(file.name)? else {
        let message = format!("{}: file not found, skipped", file.name);
        warn!(file = file.name, "bundle file missing");
        report.warnings.push(message);
        report.files.push(counts);
        return Ok(());
    };

    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(bytes.as_slice());
    let headers = reader.headers().map_err(csv_error)?.clone();
    if !headers_match(&headers, file.columns) {
        let found: Vec<&str> = headers.iter().collect();
        warn!(file = file.name, ?found, "unexpected columns");
        report.warnings.push(format!(
            "{}: expected columns `{}`, found `{}`; skipped",
            file.name,
            file.columns.join(","),
            found.join(",")
        ));
        report.files.push(counts);
        return Ok(());
    }
    counts.read = true;

    for (index, record) in reader.records().enumerate() {
        let row_number = index + 1;
        let outcome = match record {
            Ok(record) => record
                .deserialize::<R>(Some(&headers))
                .map_err(|err| err.to_string())
                .and_then(&mut apply),
            Err(err) if err.is_io_error() => return Err(csv_error(err)),
            Err(err) => Err(err.to_string()),
        };
        match outcome {
            Ok(Upsert::Created) => counts.created += 1,
            Ok(Upsert::Updated) => counts.updated += 1,
            Err(reason) => {
                counts.skipped += 1;
                warn!(file = file.name, row = row_number, %reason, "skipped row");
                report
                    .warnings
                    .push(format!("{} row {}: {}", file.name, row_number, reason));
            }
        }
    }

    info!(
        file = file.name,
        created = counts.created,
        updated = counts.updated,
        skipped = counts.skipped,
        "imported bundle file"
    );
    report.files.push(counts);
    Ok(())
}

fn headers_match(headers: &StringRecord, expected: &[&str]) -> bool {
    headers.len() == expected.len()
        && headers
            .iter()
            .zip(expected)
            .all(|(found, wanted)| found.trim_start_matches('\u{feff}') == *wanted)
}

/// Resolves a debt by description; unknown or blank references become `None`.
fn debt_reference(ledger: &Ledger, description: &str) -> Option<Uuid> {
    let description = description.trim();
    if description.is_empty() {
        return None;
    }
    ledger.debt_by_description(description).map(|debt| debt.id)
}

fn upsert_entity(ledger: &mut Ledger, row: EntityRow, today: NaiveDate) -> Result<Upsert, String> {
    let name = row.name.trim().to_string();
    let kind = parse_choice(&row.kind)?;
    let outcome = match ledger.entity_by_name(&name).map(|entity| entity.id) {
        Some(id) => EntityService::update(ledger, id, today, |entity| entity.kind = kind)
            .map(|_| Upsert::Updated),
        None => EntityService::add(ledger, Entity::new(name, kind), today).map(|_| Upsert::Created),
    };
    outcome.map_err(|err| err.to_string())
}

fn upsert_debt(ledger: &mut Ledger, row: DebtRow, today: NaiveDate) -> Result<Upsert, String> {
    let description = row.description.trim().to_string();
    let entity_name = row.entity.trim();
    let entity_id = if entity_name.is_empty() {
        None
    } else {
        ledger.entity_by_name(entity_name).map(|entity| entity.id)
    };

    let mut draft = Debt::new(
        entity_id,
        parse_choice(&row.kind)?,
        description.clone(),
        parse_amount("total_amount", &row.total_amount)?,
    );
    draft.minimum_payment = parse_amount("minimum_payment", &row.minimum_payment)?;
    draft.due_date = parse_optional_date("due_date", &row.due_date)?;
    draft.next_payment = parse_optional_date("next_payment", &row.next_payment)?;
    draft.status = parse_choice(&row.status)?;
    draft.priority = parse_choice(&row.priority)?;
    draft.monthly_installment =
        parse_optional_decimal("monthly_installment", &row.monthly_installment)?;
    draft.remaining_installments =
        parse_optional_count("remaining_installments", &row.remaining_installments)?;
    draft.notes = row.notes;

    let outcome = match ledger.debt_by_description(&description).map(|debt| debt.id) {
        Some(id) => {
            DebtService::update(ledger, id, today, |debt| *debt = draft).map(|_| Upsert::Updated)
        }
        None => DebtService::add(ledger, draft, today).map(|_| Upsert::Created),
    };
    outcome.map_err(|err| err.to_string())
}

fn upsert_income(ledger: &mut Ledger, row: IncomeRow, today: NaiveDate) -> Result<Upsert, String> {
    let date = parse_date("date", &row.date)?;
    let mut draft = Income::new(
        date,
        parse_choice(&row.kind)?,
        row.description,
        parse_amount("amount", &row.amount)?,
    );
    draft.confirmed = parse_bool(&row.confirmed);

    let existing = ledger
        .incomes
        .iter()
        .find(|income| income.description == draft.description && income.date == date)
        .map(|income| income.id);
    let outcome = match existing {
        Some(id) => {
            IncomeService::update(ledger, id, today, |income| *income = draft)
                .map(|_| Upsert::Updated)
        }
        None => IncomeService::add(ledger, draft, today).map(|_| Upsert::Created),
    };
    outcome.map_err(|err| err.to_string())
}

fn upsert_expense(
    ledger: &mut Ledger,
    row: ExpenseRow,
    today: NaiveDate,
) -> Result<Upsert, String> {
    let date = parse_date("date", &row.date)?;
    let mut draft = Expense::new(
        date,
        parse_choice(&row.kind)?,
        row.category.trim(),
        row.description,
        parse_amount("amount", &row.amount)?,
    );
    draft.paid = parse_bool(&row.paid);
    draft.payment_method = parse_choice(&row.payment_method)?;
    draft.debt_id = debt_reference(ledger, &row.debt);

    let existing = ledger
        .expenses
        .iter()
        .find(|expense| expense.description == draft.description && expense.date == date)
        .map(|expense| expense.id);
    let outcome = match existing {
        Some(id) => ExpenseService::update(ledger, id, today, |expense| *expense = draft)
            .map(|_| Upsert::Updated),
        None => ExpenseService::add(ledger, draft, today).map(|_| Upsert::Created),
    };
    outcome.map_err(|err| err.to_string())
}

fn upsert_due_item(
    ledger: &mut Ledger,
    row: DueItemRow,
    today: NaiveDate,
) -> Result<Upsert, String> {
    let date = parse_date("date", &row.date)?;
    let mut draft = DueItem::new(date, row.concept, parse_amount("amount", &row.amount)?);
    draft.status = parse_choice(&row.status)?;
    draft.debt_id = debt_reference(ledger, &row.debt);
    draft.notes = row.notes;

    let existing = ledger
        .due_items
        .iter()
        .find(|item| item.date == date && item.concept == draft.concept)
        .map(|item| item.id);
    let outcome = match existing {
        Some(id) => DueItemService::update(ledger, id, today, |item| *item = draft)
            .map(|_| Upsert::Updated),
        None => DueItemService::add(ledger, draft, today).map(|_| Upsert::Created),
    };
    outcome.map_err(|err| err.to_string())
}
