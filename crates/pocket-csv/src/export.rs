use std::{
    fs::{self, File},
    io::{self, Write},
    path::Path,
};

use csv::WriterBuilder;
use pocket_core::{
    CoreError, DebtService, DueItemService, EntityService, ExpenseService, IncomeService,
    ListFilter,
};
use pocket_domain::{Ledger, YearMonth};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    bundle::{
        csv_error, format_amount, format_date, format_decimal, zip_error, BundleFile, DEBTS,
        DUE_ITEMS, ENTITIES, EXPENSES, INCOMES,
    },
    report::ExportReport,
};

#[derive(Serialize)]
struct EntityRow<'a> {
    name: &'a str,
    kind: &'static str,
}

#[derive(Serialize)]
struct DebtRow<'a> {
    entity: &'a str,
    kind: &'static str,
    description: &'a str,
    total_amount: String,
    minimum_payment: String,
    due_date: String,
    next_payment: String,
    status: &'static str,
    priority: &'static str,
    monthly_installment: String,
    remaining_installments: String,
    notes: &'a str,
}

#[derive(Serialize)]
struct IncomeRow<'a> {
    date: String,
    kind: &'static str,
    description: &'a str,
    amount: String,
    confirmed: bool,
}

#[derive(Serialize)]
struct ExpenseRow<'a> {
    date: String,
    kind: &'static str,
    category: &'a str,
    description: &'a str,
    amount: String,
    paid: bool,
    payment_method: &'static str,
    debt: &'a str,
}

#[derive(Serialize)]
struct DueItemRow<'a> {
    date: String,
    concept: &'a str,
    amount: String,
    debt: &'a str,
    status: &'static str,
    notes: &'a str,
}

/// One bundle file rendered in memory.
struct RenderedFile {
    file: BundleFile,
    bytes: Vec<u8>,
    rows: usize,
}

/// Writes every record of `ledger` into a bundle under `dir`.
///
/// The directory is created when missing. Existing bundle files are
/// overwritten.
pub fn export_bundle(ledger: &Ledger, dir: &Path) -> Result<ExportReport, CoreError> {
    let rendered = render_bundle(ledger)?;
    fs::create_dir_all(dir)?;
    for file in &rendered {
        fs::write(dir.join(file.file.name), &file.bytes)?;
        info!(file = file.file.name, rows = file.rows, "wrote bundle file");
    }

    let report = ExportReport::new(dir, &rendered);
    info!(
        directory = %dir.display(),
        rows = report.total_rows(),
        "exported bundle"
    );
    Ok(report)
}

/// Writes the same bundle as [`export_bundle`] into a single zip archive.
///
/// Parent directories are created when missing and an existing archive is
/// replaced.
pub fn export_archive(ledger: &Ledger, path: &Path) -> Result<ExportReport, CoreError> {
    let rendered = render_bundle(ledger)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut archive = ZipWriter::new(File::create(path)?);
    for file in &rendered {
        archive
            .start_file(file.file.name, archive_entry_options())
            .map_err(zip_error)?;
        archive.write_all(&file.bytes)?;
    }
    archive.finish().map_err(zip_error)?.sync_all()?;

    let report = ExportReport::new(path, &rendered);
    info!(
        archive = %path.display(),
        rows = report.total_rows(),
        "exported bundle archive"
    );
    Ok(report)
}

fn archive_entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn render_bundle(ledger: &Ledger) -> Result<Vec<RenderedFile>, CoreError> {
    let mut rendered = Vec::with_capacity(5);

    let entities = EntityService::list(ledger).into_iter().map(|entity| EntityRow {
        name: &entity.name,
        kind: entity.kind.code(),
    });
    rendered.push(render_file(ENTITIES, entities)?);

    let debts = DebtService::list(ledger, ListFilter::All)
        .into_iter()
        .map(|debt| DebtRow {
            entity: ledger.entity_name_for(debt),
            kind: debt.kind.code(),
            description: &debt.description,
            total_amount: format_amount(debt.total_amount),
            minimum_payment: format_amount(debt.minimum_payment),
            due_date: format_date(debt.due_date),
            next_payment: format_date(debt.next_payment),
            status: debt.status.code(),
            priority: debt.priority.code(),
            monthly_installment: format_decimal(debt.monthly_installment),
            remaining_installments: debt
                .remaining_installments
                .map(|count| count.to_string())
                .unwrap_or_default(),
            notes: &debt.notes,
        });
    rendered.push(render_file(DEBTS, debts)?);

    let incomes = IncomeService::list(ledger, ListFilter::All)
        .into_iter()
        .map(|income| IncomeRow {
            date: format_date(Some(income.date)),
            kind: income.kind.code(),
            description: &income.description,
            amount: format_amount(income.amount),
            confirmed: income.confirmed,
        });
    rendered.push(render_file(INCOMES, incomes)?);

    let expenses = ExpenseService::list(ledger, ListFilter::All)
        .into_iter()
        .map(|expense| ExpenseRow {
            date: format_date(Some(expense.date)),
            kind: expense.kind.code(),
            category: &expense.category,
            description: &expense.description,
            amount: format_amount(expense.amount),
            paid: expense.paid,
            payment_method: expense.payment_method.code(),
            debt: debt_description(ledger, expense.debt_id),
        });
    rendered.push(render_file(EXPENSES, expenses)?);

    let due_items = DueItemService::list(ledger, ListFilter::All)
        .into_iter()
        .map(|item| DueItemRow {
            date: format_date(Some(item.date)),
            concept: &item.concept,
            amount: format_amount(item.amount),
            debt: debt_description(ledger, item.debt_id),
            status: item.status.code(),
            notes: &item.notes,
        });
    rendered.push(render_file(DUE_ITEMS, due_items)?);

    Ok(rendered)
}

/// Default bundle directory name for an export taken during `month`.
pub fn bundle_name(ledger: &Ledger, month: YearMonth) -> String {
    let slug: String = ledger
        .name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{slug}-{month}")
}

fn debt_description(ledger: &Ledger, debt_id: Option<Uuid>) -> &str {
    debt_id
        .and_then(|id| ledger.debt(id))
        .map(|debt| debt.description.as_str())
        .unwrap_or("")
}

fn render_file<S, I>(file: BundleFile, rows: I) -> Result<RenderedFile, CoreError>
where
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(file.columns).map_err(csv_error)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
        count += 1;
    }
    let bytes = writer.into_inner().map_err(|err| {
        let cause = err.error();
        CoreError::Io(io::Error::new(cause.kind(), cause.to_string()))
    })?;
    Ok(RenderedFile {
        file,
        bytes,
        rows: count,
    })
}

impl ExportReport {
    fn new(path: &Path, rendered: &[RenderedFile]) -> Self {
        Self {
            path: path.to_path_buf(),
            files: rendered
                .iter()
                .map(|file| (file.file.name, file.rows))
                .collect(),
        }
    }
}
