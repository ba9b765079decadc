use pocket_core::EntityService;
use pocket_domain::{Displayable, Entity, EntityKind};

use crate::cli::commands::{confirm_removal, resolve_entity, split_subcommand};
use crate::cli::format::short_id;
use crate::cli::forms::Form;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

const USAGE: &str = "entity <list|add name=<name> [kind=bank|school|fintech|other]|edit <entity> [name=..] [kind=..]|remove <entity>>";
const FIELDS: &[&str] = &["name", "kind"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "entity",
        "Manage counterparties (banks, schools, fintechs)",
        USAGE,
        cmd_entity,
    )]
}

fn cmd_entity(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "list" | "ls" => handle_list(context),
        "add" => handle_add(context, rest),
        "edit" => handle_edit(context, rest),
        "remove" | "rm" => handle_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown entity subcommand `{other}`. Available: list, add, edit, remove"
        ))),
    }
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let ledger = context.ledger()?;
    let entities = EntityService::list(ledger);
    if entities.is_empty() {
        output::info("No entities recorded.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Name"),
        TableColumn::left("Kind"),
        TableColumn::right("Debts"),
    ]);
    for entity in entities {
        let debts = ledger
            .debts
            .iter()
            .filter(|debt| debt.entity_id == Some(entity.id))
            .count();
        table.push(vec![
            short_id(entity.id),
            entity.name.clone(),
            entity.kind.label().to_string(),
            debts.to_string(),
        ]);
    }
    output::section("Entities");
    output::info(table.render());
    Ok(())
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut form = Form::parse(args, context.today())?;
    let name = form.required_text("name")?;
    let kind: EntityKind = form.choice("kind")?.unwrap_or_default();
    form.finish(FIELDS)?;

    let entity = Entity::new(name.clone(), kind);
    let id = context.mutate(|ledger, today| Ok(EntityService::add(ledger, entity, today)?))?;
    output::success(format!("Entity `{name}` added ({}).", short_id(id)));
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (target, fields) = args
        .split_first()
        .filter(|(_, fields)| !fields.is_empty())
        .ok_or_else(|| CommandError::usage("entity edit <entity> [name=..] [kind=..]"))?;
    let id = resolve_entity(context.ledger()?, target)?;

    let mut form = Form::parse(fields, context.today())?;
    let name = form.text("name");
    let kind: Option<EntityKind> = form.choice("kind")?;
    form.finish(FIELDS)?;

    context.mutate(|ledger, today| {
        Ok(EntityService::update(ledger, id, today, |entity| {
            if let Some(name) = name {
                entity.name = name;
            }
            if let Some(kind) = kind {
                entity.kind = kind;
            }
        })?)
    })?;
    output::success(format!("Entity {} updated.", short_id(id)));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = args
        .first()
        .ok_or_else(|| CommandError::usage("entity remove <entity>"))?;
    let ledger = context.ledger()?;
    let id = resolve_entity(ledger, target)?;
    let entity = EntityService::get(ledger, id)?;
    let debts = ledger
        .debts
        .iter()
        .filter(|debt| debt.entity_id == Some(id))
        .count();
    let label = format!("entity `{}` and its {debts} debt(s)", entity.display_label());
    if !confirm_removal(context, &label)? {
        return Ok(());
    }

    let removed = context.mutate(|ledger, _| Ok(EntityService::remove(ledger, id)?))?;
    output::success(format!("Entity `{}` removed.", removed.name));
    Ok(())
}
