pub mod commands;
pub mod format;
pub mod forms;
pub mod help;
pub mod output;
pub mod registry;
pub mod shell;
pub mod shell_context;
pub mod system_clock;
pub mod table;

pub use shell::run_cli;
pub use shell_context::{CliMode, ShellContext};
