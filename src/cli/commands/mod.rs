//! Command handlers grouped by the record type they work on.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod debt;
pub mod due;
pub mod entity;
pub mod expense;
pub mod income;
pub mod ledger;
pub mod system;

use pocket_core::{resolve_id, CoreError};
use pocket_domain::{Amounted, Displayable, Identifiable, Ledger};
use uuid::Uuid;

use crate::cli::registry::CommandRegistry;
use crate::cli::shell_context::ShellContext;
use crate::errors::CommandError;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        system::definitions(),
        ledger::definitions(),
        entity::definitions(),
        debt::definitions(),
        income::definitions(),
        expense::definitions(),
        due::definitions(),
        dashboard::definitions(),
        data::definitions(),
        config::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
}

/// Splits `<subcommand> rest...`, lower-casing the subcommand.
pub(crate) fn split_subcommand<'a, 'b>(
    args: &'a [&'b str],
    usage: &str,
) -> Result<(String, &'a [&'b str]), CommandError> {
    match args.split_first() {
        Some((first, rest)) => Ok((first.to_ascii_lowercase(), rest)),
        None => Err(CommandError::usage(usage)),
    }
}

/// The first argument, read as a record id or unique id prefix.
pub(crate) fn record_id<'a, T, I>(
    records: I,
    kind: &'static str,
    args: &[&str],
    usage: &str,
) -> Result<Uuid, CommandError>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = args.first().ok_or_else(|| CommandError::usage(usage))?;
    Ok(resolve_id(records, kind, needle)?)
}

/// Resolves the id set handed to a bulk toggle. `--none` clears every flag.
pub(crate) fn toggle_ids<'a, T, I>(
    records: I,
    kind: &'static str,
    args: &[&str],
    usage: &str,
) -> Result<Vec<Uuid>, CommandError>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T> + Clone,
{
    match args {
        [] => Err(CommandError::usage(usage)),
        ["--none"] => Ok(Vec::new()),
        needles => needles
            .iter()
            .map(|needle| resolve_id(records.clone(), kind, needle).map_err(CommandError::from))
            .collect(),
    }
}

/// Finds an entity by exact name, falling back to an id prefix.
pub(crate) fn resolve_entity(ledger: &Ledger, reference: &str) -> Result<Uuid, CoreError> {
    match ledger.entity_by_name(reference) {
        Some(entity) => Ok(entity.id),
        None => resolve_id(&ledger.entities, "Entity", reference),
    }
}

/// Finds a debt by exact description, falling back to an id prefix.
pub(crate) fn resolve_debt(ledger: &Ledger, reference: &str) -> Result<Uuid, CoreError> {
    match ledger.debt_by_description(reference) {
        Some(debt) => Ok(debt.id),
        None => resolve_id(&ledger.debts, "Debt", reference),
    }
}

/// Label plus amount, as shown in removal prompts.
pub(crate) fn record_label<T: Displayable + Amounted>(record: &T) -> String {
    format!(
        "{} ({})",
        record.display_label(),
        crate::cli::format::amount(record.amount())
    )
}

/// Asks before deleting; declining is not an error.
pub(crate) fn confirm_removal(context: &ShellContext, label: &str) -> Result<bool, CommandError> {
    let proceed = context.confirm(&format!("Remove {label}?"))?;
    if !proceed {
        crate::cli::output::info("Operation cancelled.");
    }
    Ok(proceed)
}
