use chrono::NaiveDate;
use pocket_core::{days_until, status_of, DueItemService};
use pocket_domain::{DueItem, DueStatus, Ledger};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::commands::{
    confirm_removal, record_id, record_label, resolve_debt, split_subcommand, toggle_ids,
};
use crate::cli::format::{self, short_id};
use crate::cli::forms::{Form, CLEAR};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

const USAGE: &str = "due <list [--all]|add date=<date> concept=<text> amount=<amount> [debt=<debt>] [status=pending|paid] [notes=..]|edit <id> <field=value..>|remove <id>|pay <id..>|--none>";
const PAY_USAGE: &str = "due pay <id..> | due pay --none";
const FIELDS: &[&str] = &["date", "concept", "amount", "debt", "status", "notes"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "due",
        "Track payment due-dates",
        USAGE,
        cmd_due,
    )]
}

fn cmd_due(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "list" | "ls" => handle_list(context, rest),
        "add" => handle_add(context, rest),
        "edit" => handle_edit(context, rest),
        "remove" | "rm" => handle_remove(context, rest),
        "pay" => handle_pay(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown due subcommand `{other}`. Available: list, add, edit, remove, pay"
        ))),
    }
}

#[derive(Debug, Default)]
struct DueChanges {
    date: Option<NaiveDate>,
    concept: Option<String>,
    amount: Option<Decimal>,
    debt: Option<Option<Uuid>>,
    status: Option<DueStatus>,
    notes: Option<String>,
}

impl DueChanges {
    fn read(form: &mut Form, ledger: &Ledger) -> Result<Self, CommandError> {
        let debt = match form.clearable("debt", |form, key| Ok::<_, CommandError>(form.text(key)))? {
            Some(Some(reference)) => Some(Some(resolve_debt(ledger, &reference)?)),
            Some(None) => Some(None),
            None => None,
        };
        Ok(Self {
            date: form.date("date")?,
            concept: form.text("concept"),
            amount: form.decimal("amount")?,
            debt,
            status: form.choice("status")?,
            notes: form
                .text("notes")
                .map(|notes| if notes == CLEAR { String::new() } else { notes }),
        })
    }

    fn apply(self, item: &mut DueItem) {
        if let Some(date) = self.date {
            item.date = date;
        }
        if let Some(concept) = self.concept {
            item.concept = concept;
        }
        if let Some(amount) = self.amount {
            item.amount = amount;
        }
        if let Some(debt) = self.debt {
            item.debt_id = debt;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
    }
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = context.list_filter(args);
    let today = context.today();
    let ledger = context.ledger()?;
    let items = DueItemService::list(ledger, filter);
    if items.is_empty() {
        output::info("No due items to show.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::left("Concept"),
        TableColumn::right("Amount"),
        TableColumn::left("Debt"),
        TableColumn::left("Status"),
        TableColumn::right("Days"),
    ]);
    for item in items {
        let debt = item
            .debt_id
            .and_then(|id| ledger.debt(id))
            .map(|debt| debt.description.clone())
            .unwrap_or_default();
        table.push(vec![
            short_id(item.id),
            format::date(item.date),
            item.concept.clone(),
            format::amount(item.amount),
            debt,
            format::state(status_of(item, today)),
            days_until(item.date, today).to_string(),
        ]);
    }
    output::section("Due items");
    output::info(table.render());
    Ok(())
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut form = Form::parse(args, context.today())?;
    let changes = DueChanges::read(&mut form, context.ledger()?)?;
    form.finish(FIELDS)?;
    let date = changes
        .date
        .ok_or_else(|| CommandError::InvalidArguments("`date` is required".into()))?;
    let amount = changes
        .amount
        .ok_or_else(|| CommandError::InvalidArguments("`amount` is required".into()))?;

    let mut item = DueItem::new(date, "", amount);
    changes.apply(&mut item);
    let id = context.mutate(|ledger, today| Ok(DueItemService::add(ledger, item, today)?))?;
    output::success(format!("Due item added ({}).", short_id(id)));
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "due edit <id> <field=value..>";
    let (_, fields) = args
        .split_first()
        .filter(|(_, fields)| !fields.is_empty())
        .ok_or_else(|| CommandError::usage(usage))?;
    let ledger = context.ledger()?;
    let id = record_id(&ledger.due_items, "Due item", args, usage)?;
    let mut form = Form::parse(fields, context.today())?;
    let changes = DueChanges::read(&mut form, ledger)?;
    form.finish(FIELDS)?;

    context.mutate(|ledger, today| {
        Ok(DueItemService::update(ledger, id, today, |item| changes.apply(item))?)
    })?;
    output::success(format!("Due item {} updated.", short_id(id)));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context.ledger()?;
    let id = record_id(&ledger.due_items, "Due item", args, "due remove <id>")?;
    let item = DueItemService::get(ledger, id)?;
    let label = format!("due item {}", record_label(item));
    if !confirm_removal(context, &label)? {
        return Ok(());
    }

    context.mutate(|ledger, _| Ok(DueItemService::remove(ledger, id)?))?;
    output::success(format!("Due item {} removed.", short_id(id)));
    Ok(())
}

/// Replaces the paid set with exactly the listed due items.
fn handle_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ids = toggle_ids(&context.ledger()?.due_items, "Due item", args, PAY_USAGE)?;
    let paid = context.mutate(|ledger, _| Ok(DueItemService::set_paid(ledger, &ids)?))?;
    output::success(format!("{paid} due item(s) now paid."));
    Ok(())
}
