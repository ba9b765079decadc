use chrono::NaiveDate;
use pocket_core::{DebtService, SummaryService};
use pocket_domain::{Debt, DebtKind, DebtStatus, Ledger, Priority};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::commands::{
    confirm_removal, record_id, record_label, resolve_entity, split_subcommand,
};
use crate::cli::format::{self, short_id};
use crate::cli::forms::{Form, CLEAR};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

const USAGE: &str = "debt <list [--all]|add description=<text> total=<amount> [entity=<name>] [kind=..] [minimum=..] [due_date=..] [next_payment=..] [status=..] [priority=..] [installment=..] [remaining=..] [notes=..]|edit <id> <field=value..>|remove <id>>";
const FIELDS: &[&str] = &[
    "entity",
    "kind",
    "description",
    "total",
    "minimum",
    "due_date",
    "next_payment",
    "status",
    "priority",
    "installment",
    "remaining",
    "notes",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "debt",
        "Manage debts, installments and priorities",
        USAGE,
        cmd_debt,
    )]
}

fn cmd_debt(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "list" | "ls" => handle_list(context, rest),
        "add" => handle_add(context, rest),
        "edit" => handle_edit(context, rest),
        "remove" | "rm" => handle_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown debt subcommand `{other}`. Available: list, add, edit, remove"
        ))),
    }
}

/// Field changes read from a form; `Some(None)` clears an optional field.
#[derive(Debug, Default)]
struct DebtChanges {
    entity: Option<Option<Uuid>>,
    kind: Option<DebtKind>,
    description: Option<String>,
    total: Option<Decimal>,
    minimum: Option<Decimal>,
    due_date: Option<Option<NaiveDate>>,
    next_payment: Option<Option<NaiveDate>>,
    status: Option<DebtStatus>,
    priority: Option<Priority>,
    installment: Option<Option<Decimal>>,
    remaining: Option<Option<u32>>,
    notes: Option<String>,
}

impl DebtChanges {
    fn read(form: &mut Form, ledger: &Ledger) -> Result<Self, CommandError> {
        let entity = match form.clearable("entity", |form, key| {
            Ok::<_, CommandError>(form.text(key))
        })? {
            Some(Some(reference)) => Some(Some(resolve_entity(ledger, &reference)?)),
            Some(None) => Some(None),
            None => None,
        };
        Ok(Self {
            entity,
            kind: form.choice("kind")?,
            description: form.text("description"),
            total: form.decimal("total")?,
            minimum: form.decimal("minimum")?,
            due_date: form.clearable("due_date", Form::date)?,
            next_payment: form.clearable("next_payment", Form::date)?,
            status: form.choice("status")?,
            priority: form.choice("priority")?,
            installment: form.clearable("installment", Form::decimal)?,
            remaining: form.clearable("remaining", Form::count)?,
            notes: form
                .text("notes")
                .map(|notes| if notes == CLEAR { String::new() } else { notes }),
        })
    }

    fn apply(self, debt: &mut Debt) {
        if let Some(entity) = self.entity {
            debt.entity_id = entity;
        }
        if let Some(kind) = self.kind {
            debt.kind = kind;
        }
        if let Some(description) = self.description {
            debt.description = description;
        }
        if let Some(total) = self.total {
            debt.total_amount = total;
        }
        if let Some(minimum) = self.minimum {
            debt.minimum_payment = minimum;
        }
        if let Some(due_date) = self.due_date {
            debt.due_date = due_date;
        }
        if let Some(next_payment) = self.next_payment {
            debt.next_payment = next_payment;
        }
        if let Some(status) = self.status {
            debt.status = status;
        }
        if let Some(priority) = self.priority {
            debt.priority = priority;
        }
        if let Some(installment) = self.installment {
            debt.monthly_installment = installment;
        }
        if let Some(remaining) = self.remaining {
            debt.remaining_installments = remaining;
        }
        if let Some(notes) = self.notes {
            debt.notes = notes;
        }
    }
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = context.list_filter(args);
    let currency = context.currency().to_string();
    let ledger = context.ledger()?;
    let debts = DebtService::list(ledger, filter);
    if debts.is_empty() {
        output::info("No debts to show.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Entity"),
        TableColumn::left("Kind"),
        TableColumn::left("Description"),
        TableColumn::right("Total"),
        TableColumn::right("Installment"),
        TableColumn::right("Left"),
        TableColumn::left("Next payment"),
        TableColumn::left("Status"),
        TableColumn::left("Priority"),
    ]);
    for debt in debts {
        table.push(vec![
            short_id(debt.id),
            ledger.entity_name_for(debt).to_string(),
            debt.kind.label().to_string(),
            debt.description.clone(),
            format::amount(debt.total_amount),
            debt.monthly_installment
                .map(format::amount)
                .unwrap_or_else(|| "-".into()),
            debt.remaining_installments
                .map(|left| left.to_string())
                .unwrap_or_else(|| "-".into()),
            format::optional_date(debt.next_payment),
            debt.status.label().to_string(),
            debt.priority.label().to_string(),
        ]);
    }
    let active = ledger
        .debts
        .iter()
        .filter(|debt| debt.status.is_active())
        .map(|debt| debt.total_amount)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    output::section("Debts");
    output::info(table.render());
    output::info(format!("Active debt: {}", format::money(active, &currency)));
    output::info(format!(
        "Monthly installments: {}",
        format::money(SummaryService::installment_total(ledger), &currency)
    ));
    Ok(())
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut form = Form::parse(args, context.today())?;
    let changes = DebtChanges::read(&mut form, context.ledger()?)?;
    form.finish(FIELDS)?;
    if changes.description.as_deref().map_or(true, str::is_empty) {
        return Err(CommandError::InvalidArguments("`description` is required".into()));
    }
    if changes.total.is_none() {
        return Err(CommandError::InvalidArguments("`total` is required".into()));
    }

    let mut debt = Debt::new(None, DebtKind::default(), "", Decimal::ZERO);
    changes.apply(&mut debt);
    let description = debt.description.clone();
    let id = context.mutate(|ledger, today| Ok(DebtService::add(ledger, debt, today)?))?;
    output::success(format!("Debt `{description}` added ({}).", short_id(id)));
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "debt edit <id> <field=value..>";
    let (_, fields) = args
        .split_first()
        .filter(|(_, fields)| !fields.is_empty())
        .ok_or_else(|| CommandError::usage(usage))?;
    let ledger = context.ledger()?;
    let id = record_id(&ledger.debts, "Debt", args, usage)?;
    let mut form = Form::parse(fields, context.today())?;
    let changes = DebtChanges::read(&mut form, ledger)?;
    form.finish(FIELDS)?;

    context.mutate(|ledger, today| {
        Ok(DebtService::update(ledger, id, today, |debt| changes.apply(debt))?)
    })?;
    output::success(format!("Debt {} updated.", short_id(id)));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context.ledger()?;
    let id = record_id(&ledger.debts, "Debt", args, "debt remove <id>")?;
    let debt = DebtService::get(ledger, id)?;
    let label = format!("debt {}", record_label(debt));
    if !confirm_removal(context, &label)? {
        return Ok(());
    }

    let removed = context.mutate(|ledger, _| Ok(DebtService::remove(ledger, id)?))?;
    output::success(format!(
        "Debt `{}` removed; linked expenses and due items were kept.",
        removed.description
    ));
    Ok(())
}
