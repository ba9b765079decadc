//! Shared runtime state for shell sessions and command execution.

use std::{env, path::PathBuf};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use pocket_config::{default_home, Config, ConfigManager};
use pocket_core::{storage::LedgerStorage, Clock, FixedClock, ListFilter};
use pocket_domain::Ledger;
use pocket_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::cli::{commands, output, registry::CommandRegistry, system_clock::SystemClock};
use crate::errors::{CliError, CommandError};

/// Pins the shell's notion of today, as `YYYY-MM-DD`.
pub const TODAY_ENV: &str = "POCKETBOOK_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// The ledger currently open in the shell.
pub struct OpenLedger {
    pub name: String,
    pub ledger: Ledger,
    pub dirty: bool,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub home: PathBuf,
    pub storage: JsonLedgerStorage,
    pub clock: Box<dyn Clock>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub current: Option<OpenLedger>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let home = default_home();
        let config_manager = ConfigManager::with_base_dir(&home)?;
        let config = config_manager.load()?;
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);

        let storage = JsonLedgerStorage::new(StoragePaths::under(&config.resolve_data_root(&home)))?;
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let mut context = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            home,
            storage,
            clock: clock_from_env(),
            config_manager,
            config,
            current: None,
            last_command: None,
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_opened_ledger.clone() else {
            return;
        };
        match self.storage.load_ledger(&name) {
            Ok(ledger) => {
                output::success(format!("Opened last ledger `{name}`."));
                self.current = Some(OpenLedger {
                    name,
                    ledger,
                    dirty: false,
                });
            }
            Err(err) => tracing::warn!(%name, %err, "could not reopen last ledger"),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn prompt(&self) -> String {
        match &self.current {
            Some(open) if open.dirty => format!("pocketbook ({}*)> ", open.name),
            Some(open) => format!("pocketbook ({})> ", open.name),
            None => "pocketbook> ".into(),
        }
    }

    pub fn ledger(&self) -> Result<&Ledger, CommandError> {
        self.current
            .as_ref()
            .map(|open| &open.ledger)
            .ok_or(CommandError::LedgerNotLoaded)
    }

    /// Runs a mutation against the open ledger, marking it unsaved on success.
    pub fn mutate<T, F>(&mut self, apply: F) -> Result<T, CommandError>
    where
        F: FnOnce(&mut Ledger, NaiveDate) -> Result<T, CommandError>,
    {
        let today = self.today();
        let open = self.current.as_mut().ok_or(CommandError::LedgerNotLoaded)?;
        let value = apply(&mut open.ledger, today)?;
        open.dirty = true;
        Ok(value)
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// List filter from `--all` plus the `show_completed` preference.
    pub fn list_filter(&self, args: &[&str]) -> ListFilter {
        let show_all = args.iter().any(|arg| *arg == "--all" || *arg == "-a");
        ListFilter::from_show_all(show_all || self.config.show_completed)
    }

    /// Asks for confirmation in interactive mode; scripts always proceed.
    pub fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub fn persist_config(&self) -> Result<(), CommandError> {
        self.config_manager
            .save(&self.config)
            .map_err(CommandError::from)
    }

    pub(crate) fn set_last_opened(&mut self, name: Option<&str>) -> Result<(), CommandError> {
        self.config.last_opened_ledger = name.map(str::to_string);
        self.persist_config()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.closest(input, 3) {
            output::info(format!("Did you mean `{best}`?"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }

    /// Offers to save unsaved changes before leaving.
    pub(crate) fn confirm_exit(&mut self) -> Result<bool, CommandError> {
        let Some(open) = self.current.as_ref().filter(|open| open.dirty) else {
            return Ok(true);
        };
        if self.mode == CliMode::Script {
            output::warning(format!("Unsaved changes to `{}` were discarded.", open.name));
            return Ok(true);
        }
        if self.confirm("Save changes before exiting?")? {
            commands::ledger::save_current(self)?;
        }
        Ok(true)
    }
}

fn clock_from_env() -> Box<dyn Clock> {
    env::var(TODAY_ENV)
        .ok()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .map(|today| Box::new(FixedClock::new(today)) as Box<dyn Clock>)
        .unwrap_or_else(|| Box::new(SystemClock))
}
