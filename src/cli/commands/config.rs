use pocket_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::cli::commands::split_subcommand;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

const USAGE: &str = "config [show|set <key> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return show_config(context);
    }
    let (subcommand, rest) = split_subcommand(args, USAGE)?;
    match subcommand.as_str() {
        "show" => show_config(context),
        "set" => set_config(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{other}`. Available: show, set"
        ))),
    }
}

fn show_config(context: &mut ShellContext) -> CommandResult {
    let mut table = Table::new(vec![TableColumn::left("Key"), TableColumn::left("Value")]);
    for (key, value) in context.config.entries() {
        table.push(vec![key.to_string(), value]);
    }
    output::section("Configuration");
    output::info(table.render());
    output::hint(format!(
        "Stored at {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (key, value) = match args {
        [key, value @ ..] if !value.is_empty() => (key.to_ascii_lowercase(), value.join(" ")),
        _ => {
            return Err(CommandError::usage(&format!(
                "config set <{}> <value>",
                pocket_config::Config::KEYS.join("|")
            )))
        }
    };

    context.config.set(&key, &value)?;
    context.persist_config()?;
    match key.as_str() {
        "ui_color_enabled" => output::set_color_enabled(
            context.config.ui_color_enabled && context.mode == CliMode::Interactive,
        ),
        "data_root" => {
            let root = context.config.resolve_data_root(&context.home);
            context.storage = JsonLedgerStorage::new(StoragePaths::under(&root))?;
            output::hint(format!("Ledgers are now read from {}.", root.display()));
        }
        _ => {}
    }
    output::success(format!("Set {key}."));
    Ok(())
}
