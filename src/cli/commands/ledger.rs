//! Ledger lifecycle: create, open, save, and rolling backups.

use pocket_core::storage::{ledger_warnings, LedgerStorage};
use pocket_domain::Ledger;
use pocket_storage_json::canonical_name;

use crate::cli::commands::split_subcommand;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::{OpenLedger, ShellContext};
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

const USAGE: &str =
    "ledger <new <name>|open <name>|save|list|delete <name>|backup [note]|backups|restore <backup>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "ledger",
        "Create, open, save and back up ledgers",
        USAGE,
        cmd_ledger,
    )]
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "new" => handle_new(context, rest),
        "open" | "load" => handle_open(context, rest),
        "save" => save_current(context),
        "list" => handle_list(context),
        "delete" => handle_delete(context, rest),
        "backup" => handle_backup(context, rest),
        "backups" => handle_backups(context),
        "restore" => handle_restore(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown ledger subcommand `{other}`. Available: new, open, save, list, delete, backup, backups, restore"
        ))),
    }
}

fn ledger_name(args: &[&str], usage: &str) -> Result<String, CommandError> {
    let name = args.join(" ");
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::usage(usage));
    }
    Ok(name.to_string())
}

/// Guards against silently dropping unsaved work when switching ledgers.
fn release_current(context: &ShellContext) -> Result<bool, CommandError> {
    match context.current.as_ref().filter(|open| open.dirty) {
        Some(open) => context.confirm(&format!("Discard unsaved changes to `{}`?", open.name)),
        None => Ok(true),
    }
}

fn handle_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = ledger_name(args, "ledger new <name>")?;
    if context.storage.ledger_exists(&name) {
        return Err(CommandError::Message(format!(
            "Ledger `{name}` already exists. Use `ledger open {name}`."
        )));
    }
    if !release_current(context)? {
        output::info("Operation cancelled.");
        return Ok(());
    }

    let ledger = Ledger::new(&name);
    context.storage.save_ledger(&name, &ledger)?;
    tracing::info!(ledger = %name, "created ledger");
    context.current = Some(OpenLedger {
        name: name.clone(),
        ledger,
        dirty: false,
    });
    context.set_last_opened(Some(&name))?;
    output::success(format!("New ledger `{name}` created."));
    Ok(())
}

fn handle_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = ledger_name(args, "ledger open <name>")?;
    if !release_current(context)? {
        output::info("Operation cancelled.");
        return Ok(());
    }

    let ledger = context.storage.load_ledger(&name)?;
    for warning in ledger_warnings(&ledger) {
        output::warning(warning);
    }
    let records = ledger.record_count();
    context.current = Some(OpenLedger {
        name: name.clone(),
        ledger,
        dirty: false,
    });
    context.set_last_opened(Some(&name))?;
    output::success(format!("Opened ledger `{name}` ({records} records)."));
    Ok(())
}

/// Writes the open ledger to storage and clears its unsaved flag.
pub fn save_current(context: &mut ShellContext) -> CommandResult {
    let open = context
        .current
        .as_mut()
        .ok_or(CommandError::LedgerNotLoaded)?;
    context.storage.save_ledger(&open.name, &open.ledger)?;
    open.dirty = false;
    output::success(format!("Ledger `{}` saved.", open.name));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let names = context.storage.list_ledgers()?;
    if names.is_empty() {
        output::info("No ledgers yet. Use `ledger new <name>`.");
        return Ok(());
    }
    let current = context
        .current
        .as_ref()
        .map(|open| canonical_name(&open.name));
    let mut table = Table::new(vec![TableColumn::left("Ledger"), TableColumn::left("Open")]);
    for name in names {
        let marker = if current.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            ""
        };
        table.push(vec![name, marker.to_string()]);
    }
    output::section("Ledgers");
    output::info(table.render());
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = ledger_name(args, "ledger delete <name>")?;
    if !context.storage.ledger_exists(&name) {
        return Err(pocket_core::CoreError::LedgerNotFound(name).into());
    }
    if !context.confirm(&format!("Delete ledger `{name}`? Backups are kept."))? {
        output::info("Operation cancelled.");
        return Ok(());
    }

    context.storage.delete_ledger(&name)?;
    let slug = canonical_name(&name);
    if context
        .current
        .as_ref()
        .is_some_and(|open| canonical_name(&open.name) == slug)
    {
        context.current = None;
        context.set_last_opened(None)?;
    }
    output::success(format!("Ledger `{name}` deleted."));
    Ok(())
}

fn handle_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let open = context.current.as_ref().ok_or(CommandError::LedgerNotLoaded)?;
    let note = args.join(" ");
    let note = Some(note.trim()).filter(|note| !note.is_empty());
    let info = context.storage.backup_ledger(&open.name, &open.ledger, note)?;
    output::success(format!("Backup created: {}", info.id));
    Ok(())
}

fn handle_backups(context: &mut ShellContext) -> CommandResult {
    let open = context.current.as_ref().ok_or(CommandError::LedgerNotLoaded)?;
    let backups = context.storage.list_backups(&open.name)?;
    if backups.is_empty() {
        output::info(format!("No backups for `{}`.", open.name));
        return Ok(());
    }
    let mut table = Table::new(vec![TableColumn::left("Backup"), TableColumn::left("Created")]);
    for backup in backups {
        table.push(vec![backup.id, backup.created_at]);
    }
    output::section(format!("Backups of {}", open.name));
    output::info(table.render());
    Ok(())
}

fn handle_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args
        .first()
        .ok_or_else(|| CommandError::usage("ledger restore <backup>"))?;
    let name = context
        .current
        .as_ref()
        .map(|open| open.name.clone())
        .ok_or(CommandError::LedgerNotLoaded)?;
    let backup = context.storage.find_backup(&name, reference)?;
    if !context.confirm(&format!("Replace `{name}` with backup {}?", backup.id))? {
        output::info("Operation cancelled.");
        return Ok(());
    }

    let ledger = context.storage.restore_backup(&backup)?;
    tracing::info!(ledger = %name, backup = %backup.id, "restored backup");
    context.current = Some(OpenLedger {
        name,
        ledger,
        dirty: false,
    });
    output::success(format!("Restored backup {}.", backup.id));
    Ok(())
}
