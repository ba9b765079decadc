use chrono::NaiveDate;
use pocket_core::{status_of, ExpenseService};
use pocket_domain::{Expense, ExpenseKind, Ledger, PaymentMethod};
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

const USAGE: &str = "expense <list [--all]|add date=<date> amount=<amount> [kind=fixed|variable|debt_payment|other] [category=..] [description=..] [method=cash|debit|card] [paid=yes|no] [debt=<debt>]|edit <id> <field=value..>|remove <id>|pay <id..>|--none>";
const PAY_USAGE: &str = "expense pay <id..> | expense pay --none";
const FIELDS: &[&str] = &[
    "date",
    "kind",
    "category",
    "description",
    "amount",
    "paid",
    "method",
    "debt",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Record expenses and mark them paid",
        USAGE,
        cmd_expense,
    )]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "list" | "ls" => handle_list(context, rest),
        "add" => handle_add(context, rest),
        "edit" => handle_edit(context, rest),
        "remove" | "rm" => handle_remove(context, rest),
        "pay" => handle_pay(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown expense subcommand `{other}`. Available: list, add, edit, remove, pay"
        ))),
    }
}

#[derive(Debug, Default)]
struct ExpenseChanges {
    date: Option<NaiveDate>,
    kind: Option<ExpenseKind>,
    category: Option<String>,
    description: Option<String>,
    amount: Option<Decimal>,
    paid: Option<bool>,
    method: Option<PaymentMethod>,
    debt: Option<Option<Uuid>>,
}

impl ExpenseChanges {
    fn read(form: &mut Form, ledger: &Ledger) -> Result<Self, CommandError> {
        let debt = match form.clearable("debt", |form, key| Ok::<_, CommandError>(form.text(key)))? {
            Some(Some(reference)) => Some(Some(resolve_debt(ledger, &reference)?)),
            Some(None) => Some(None),
            None => None,
        };
        let cleared = |value: String| if value == CLEAR { String::new() } else { value };
        Ok(Self {
            date: form.date("date")?,
            kind: form.choice("kind")?,
            category: form.text("category").map(cleared),
            description: form.text("description").map(cleared),
            amount: form.decimal("amount")?,
            paid: form.flag("paid")?,
            method: form.choice("method")?,
            debt,
        })
    }

    fn apply(self, expense: &mut Expense) {
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(kind) = self.kind {
            expense.kind = kind;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(paid) = self.paid {
            expense.paid = paid;
        }
        if let Some(method) = self.method {
            expense.payment_method = method;
        }
        if let Some(debt) = self.debt {
            expense.debt_id = debt;
        }
    }
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = context.list_filter(args);
    let today = context.today();
    let currency = context.currency().to_string();
    let ledger = context.ledger()?;
    let expenses = ExpenseService::list(ledger, filter);
    if expenses.is_empty() {
        output::info("No expenses to show.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::left("Kind"),
        TableColumn::left("Category"),
        TableColumn::left("Description"),
        TableColumn::right("Amount"),
        TableColumn::left("Method"),
        TableColumn::left("Paid"),
        TableColumn::left("Debt"),
        TableColumn::left("Status"),
    ]);
    let mut total = Decimal::ZERO;
    for expense in expenses {
        total = total.saturating_add(expense.amount);
        let debt = expense
            .debt_id
            .and_then(|id| ledger.debt(id))
            .map(|debt| debt.description.clone())
            .unwrap_or_default();
        table.push(vec![
            short_id(expense.id),
            format::date(expense.date),
            expense.kind.label().to_string(),
            expense.category.clone(),
            expense.description.clone(),
            format::amount(expense.amount),
            expense.payment_method.label().to_string(),
            format::yes_no(expense.paid).to_string(),
            debt,
            format::state(status_of(expense, today)),
        ]);
    }
    output::section("Expenses");
    output::info(table.render());
    output::info(format!("Total: {}", format::money(total, &currency)));
    Ok(())
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut form = Form::parse(args, context.today())?;
    let changes = ExpenseChanges::read(&mut form, context.ledger()?)?;
    form.finish(FIELDS)?;
    let date = changes
        .date
        .ok_or_else(|| CommandError::InvalidArguments("`date` is required".into()))?;
    let amount = changes
        .amount
        .ok_or_else(|| CommandError::InvalidArguments("`amount` is required".into()))?;

    let mut expense = Expense::new(date, ExpenseKind::default(), "", "", amount);
    changes.apply(&mut expense);
    if !expense.affects_cash_flow() {
        output::hint("Card expenses are left out of the running balance.");
    }
    let id = context.mutate(|ledger, today| Ok(ExpenseService::add(ledger, expense, today)?))?;
    output::success(format!("Expense added ({}).", short_id(id)));
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "expense edit <id> <field=value..>";
    let (_, fields) = args
        .split_first()
        .filter(|(_, fields)| !fields.is_empty())
        .ok_or_else(|| CommandError::usage(usage))?;
    let ledger = context.ledger()?;
    let id = record_id(&ledger.expenses, "Expense", args, usage)?;
    let mut form = Form::parse(fields, context.today())?;
    let changes = ExpenseChanges::read(&mut form, ledger)?;
    form.finish(FIELDS)?;

    context.mutate(|ledger, today| {
        Ok(ExpenseService::update(ledger, id, today, |expense| changes.apply(expense))?)
    })?;
    output::success(format!("Expense {} updated.", short_id(id)));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context.ledger()?;
    let id = record_id(&ledger.expenses, "Expense", args, "expense remove <id>")?;
    let expense = ExpenseService::get(ledger, id)?;
    let label = format!("expense {}", record_label(expense));
    if !confirm_removal(context, &label)? {
        return Ok(());
    }

    context.mutate(|ledger, _| Ok(ExpenseService::remove(ledger, id)?))?;
    output::success(format!("Expense {} removed.", short_id(id)));
    Ok(())
}

/// Replaces the paid set with exactly the listed expenses.
fn handle_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ids = toggle_ids(&context.ledger()?.expenses, "Expense", args, PAY_USAGE)?;
    let paid = context.mutate(|ledger, _| Ok(ExpenseService::set_paid(ledger, &ids)?))?;
    output::success(format!("{paid} expense(s) now paid."));
    Ok(())
}
