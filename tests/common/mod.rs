use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Date every scripted session treats as today.
pub const TODAY: &str = "2024-03-20";

/// Creates an isolated data home for one test.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// The CLI binary in script mode, pointed at `home` with a pinned clock.
pub fn script_command(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("pocketbook_cli").expect("binary built");
    cmd.env("POCKETBOOK_CLI_SCRIPT", "1")
        .env("POCKETBOOK_HOME", home)
        .env("POCKETBOOK_TODAY", TODAY)
        .env("NO_COLOR", "1");
    cmd
}
