//! CSV bundle export and import.

use std::path::{Path, PathBuf};

use pocket_csv::{archive_path, bundle_name, export_archive, export_bundle, import_bundle};
use pocket_domain::YearMonth;

use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write the ledger as a CSV bundle directory plus a zip archive of it",
            "export [directory|archive.zip]",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Merge a CSV bundle directory or zip archive into the open ledger",
            "import <directory|archive.zip>",
            cmd_import,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = YearMonth::from_date(context.today());
    let ledger = context.ledger()?;
    let dir = match args.first() {
        Some(path) => PathBuf::from(path),
        None => context
            .config
            .resolve_export_dir(&context.home)
            .join(bundle_name(ledger, month)),
    };

    let (report, archive) = if is_archive(&dir) {
        (export_archive(ledger, &dir)?, None)
    } else {
        let archive = archive_path(&dir);
        let report = export_bundle(ledger, &dir)?;
        export_archive(ledger, &archive)?;
        (report, Some(archive))
    };

    let mut table = Table::new(vec![TableColumn::left("File"), TableColumn::right("Rows")]);
    for (file, rows) in &report.files {
        table.push(vec![file.to_string(), rows.to_string()]);
    }
    output::info(table.render());
    match archive {
        Some(archive) => output::success(format!(
            "Exported {} rows to {} and {}.",
            report.total_rows(),
            report.path.display(),
            archive.display()
        )),
        None => output::success(format!(
            "Exported {} rows to {}.",
            report.total_rows(),
            report.path.display()
        )),
    }
    Ok(())
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("zip"))
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let bundle = args
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| CommandError::usage("import <directory|archive.zip>"))?;

    let report = context.mutate(|ledger, today| Ok(import_bundle(ledger, &bundle, today)?))?;
    let mut table = Table::new(vec![
        TableColumn::left("File"),
        TableColumn::right("Created"),
        TableColumn::right("Updated"),
        TableColumn::right("Skipped"),
    ]);
    for file in &report.files {
        let skipped = if file.read {
            file.skipped.to_string()
        } else {
            "not read".to_string()
        };
        table.push(vec![
            file.file.to_string(),
            file.created.to_string(),
            file.updated.to_string(),
            skipped,
        ]);
    }
    output::info(table.render());
    for warning in &report.warnings {
        output::warning(warning);
    }
    output::success(format!(
        "Imported {} new and {} updated record(s); {} row(s) skipped.",
        report.created(),
        report.updated(),
        report.skipped()
    ));
    Ok(())
}
