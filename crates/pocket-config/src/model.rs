use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

use crate::ConfigError;

/// Environment variable that relocates the whole data root.
pub const HOME_ENV: &str = "POCKETBOOK_HOME";

const DATA_DIR_NAME: &str = "Pocketbook";

/// Stores user-configurable shell preferences and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,
    /// Optional custom directory for ledgers and backups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
    /// Where `export` writes bundles when no directory is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_export_dir: Option<PathBuf>,
    /// Whether list commands include completed records without `--all`.
    #[serde(default)]
    pub show_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_opened_ledger: None,
            data_root: None,
            default_export_dir: None,
            show_completed: false,
        }
    }
}

impl Config {
    pub const KEYS: &'static [&'static str] = &[
        "locale",
        "currency",
        "ui_color_enabled",
        "last_opened_ledger",
        "data_root",
        "default_export_dir",
        "show_completed",
    ];

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Directory holding ledgers and backups.
    pub fn resolve_data_root(&self, home: &std::path::Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| home.to_path_buf())
    }

    pub fn resolve_export_dir(&self, home: &std::path::Path) -> PathBuf {
        self.default_export_dir
            .clone()
            .unwrap_or_else(|| self.resolve_data_root(home).join("exports"))
    }

    /// Key/value pairs in display order; unset options render as `-`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let path = |value: &Option<PathBuf>| {
            value
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "-".into())
        };
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            (
                "last_opened_ledger",
                self.last_opened_ledger.clone().unwrap_or_else(|| "-".into()),
            ),
            ("data_root", path(&self.data_root)),
            ("default_export_dir", path(&self.default_export_dir)),
            ("show_completed", self.show_completed.to_string()),
        ]
    }

    /// Sets a value by key. `-` or an empty value clears optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let optional = |value: &str| (!value.is_empty() && value != "-").then(|| value.to_string());
        match key {
            "locale" => self.locale = required(key, value)?,
            "currency" => self.currency = required(key, value)?.to_uppercase(),
            "ui_color_enabled" => self.ui_color_enabled = parse_flag(key, value)?,
            "last_opened_ledger" => self.last_opened_ledger = optional(value),
            "data_root" => self.data_root = optional(value).map(PathBuf::from),
            "default_export_dir" => self.default_export_dir = optional(value).map(PathBuf::from),
            "show_completed" => self.show_completed = parse_flag(key, value)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Base directory for configuration and data.
///
/// `POCKETBOOK_HOME` wins; otherwise `<documents or home>/Pocketbook`.
pub fn default_home() -> PathBuf {
    if let Some(explicit) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(explicit);
    }
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn required(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.into(),
            message: "value cannot be empty".into(),
        });
    }
    Ok(value.to_string())
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("expected true or false, got `{value}`"),
        }),
    }
}
