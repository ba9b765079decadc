use chrono::NaiveDate;
use pocket_core::{status_of, IncomeService};
use pocket_domain::{Income, IncomeKind};
use rust_decimal::Decimal;

use crate::cli::commands::{
    confirm_removal, record_id, record_label, split_subcommand, toggle_ids,
};
use crate::cli::format::{self, short_id};
use crate::cli::forms::Form;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

const USAGE: &str = "income <list [--all]|add date=<date> amount=<amount> [kind=salary|bonus|rent|extraordinary] [description=..] [confirmed=yes|no]|edit <id> <field=value..>|remove <id>|confirm <id..>|--none>";
const CONFIRM_USAGE: &str = "income confirm <id..> | income confirm --none";
const FIELDS: &[&str] = &["date", "kind", "description", "amount", "confirmed"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "income",
        "Record income and confirm what was received",
        USAGE,
        cmd_income,
    )]
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "list" | "ls" => handle_list(context, rest),
        "add" => handle_add(context, rest),
        "edit" => handle_edit(context, rest),
        "remove" | "rm" => handle_remove(context, rest),
        "confirm" => handle_confirm(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown income subcommand `{other}`. Available: list, add, edit, remove, confirm"
        ))),
    }
}

#[derive(Debug, Default)]
struct IncomeChanges {
    date: Option<NaiveDate>,
    kind: Option<IncomeKind>,
    description: Option<String>,
    amount: Option<Decimal>,
    confirmed: Option<bool>,
}

impl IncomeChanges {
    fn read(form: &mut Form) -> Result<Self, CommandError> {
        Ok(Self {
            date: form.date("date")?,
            kind: form.choice("kind")?,
            description: form.text("description"),
            amount: form.decimal("amount")?,
            confirmed: form.flag("confirmed")?,
        })
    }

    fn apply(self, income: &mut Income) {
        if let Some(date) = self.date {
            income.date = date;
        }
        if let Some(kind) = self.kind {
            income.kind = kind;
        }
        if let Some(description) = self.description {
            income.description = description;
        }
        if let Some(amount) = self.amount {
            income.amount = amount;
        }
        if let Some(confirmed) = self.confirmed {
            income.confirmed = confirmed;
        }
    }
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = context.list_filter(args);
    let today = context.today();
    let currency = context.currency().to_string();
    let incomes = IncomeService::list(context.ledger()?, filter);
    if incomes.is_empty() {
        output::info("No income to show.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::left("Kind"),
        TableColumn::left("Description"),
        TableColumn::right("Amount"),
        TableColumn::left("Confirmed"),
        TableColumn::left("Status"),
    ]);
    let mut total = Decimal::ZERO;
    for income in incomes {
        total = total.saturating_add(income.amount);
        table.push(vec![
            short_id(income.id),
            format::date(income.date),
            income.kind.label().to_string(),
            income.description.clone(),
            format::amount(income.amount),
            format::yes_no(income.confirmed).to_string(),
            format::state(status_of(income, today)),
        ]);
    }
    output::section("Income");
    output::info(table.render());
    output::info(format!("Total: {}", format::money(total, &currency)));
    Ok(())
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut form = Form::parse(args, context.today())?;
    let changes = IncomeChanges::read(&mut form)?;
    form.finish(FIELDS)?;
    let date = changes
        .date
        .ok_or_else(|| CommandError::InvalidArguments("`date` is required".into()))?;
    let amount = changes
        .amount
        .ok_or_else(|| CommandError::InvalidArguments("`amount` is required".into()))?;

    let mut income = Income::new(date, IncomeKind::default(), "", amount);
    changes.apply(&mut income);
    let id = context.mutate(|ledger, today| Ok(IncomeService::add(ledger, income, today)?))?;
    output::success(format!("Income added ({}).", short_id(id)));
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "income edit <id> <field=value..>";
    let (_, fields) = args
        .split_first()
        .filter(|(_, fields)| !fields.is_empty())
        .ok_or_else(|| CommandError::usage(usage))?;
    let id = record_id(&context.ledger()?.incomes, "Income", args, usage)?;
    let mut form = Form::parse(fields, context.today())?;
    let changes = IncomeChanges::read(&mut form)?;
    form.finish(FIELDS)?;

    context.mutate(|ledger, today| {
        Ok(IncomeService::update(ledger, id, today, |income| changes.apply(income))?)
    })?;
    output::success(format!("Income {} updated.", short_id(id)));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context.ledger()?;
    let id = record_id(&ledger.incomes, "Income", args, "income remove <id>")?;
    let income = IncomeService::get(ledger, id)?;
    let label = format!("income {}", record_label(income));
    if !confirm_removal(context, &label)? {
        return Ok(());
    }

    context.mutate(|ledger, _| Ok(IncomeService::remove(ledger, id)?))?;
    output::success(format!("Income {} removed.", short_id(id)));
    Ok(())
}

/// Replaces the confirmed set with exactly the listed records.
fn handle_confirm(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ids = toggle_ids(&context.ledger()?.incomes, "Income", args, CONFIRM_USAGE)?;
    let confirmed = context.mutate(|ledger, _| Ok(IncomeService::set_confirmed(ledger, &ids)?))?;
    output::success(format!("{confirmed} income record(s) now confirmed."));
    Ok(())
}
