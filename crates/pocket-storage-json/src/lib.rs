use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use pocket_core::{
    storage::{LedgerBackupInfo, LedgerStorage},
    CoreError,
};
use pocket_domain::Ledger;
use tracing::{debug, info};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_DATE_FORMAT: &str = "%Y%m%d";
const BACKUP_TIME_FORMAT: &str = "%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directories used by the JSON backend.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// Lays out `ledgers/` and `backups/` under a single data root.
    pub fn under(root: &Path) -> Self {
        Self {
            ledger_root: root.join("ledgers"),
            backup_root: root.join("backups"),
        }
    }
}

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Looks up a backup by file name, or by a prefix of it.
    pub fn find_backup(&self, name: &str, reference: &str) -> Result<LedgerBackupInfo, CoreError> {
        let backups = self.list_backups(name)?;
        let needle = reference.trim();
        let mut matches = backups
            .into_iter()
            .filter(|backup| backup.id == needle || backup.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found),
            (None, _) => Err(CoreError::Storage(format!("backup `{needle}` not found"))),
            (Some(_), Some(_)) => Err(CoreError::Storage(format!(
                "backup reference `{needle}` is ambiguous"
            ))),
        }
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.paths.backup_root.join(canonical_name(name))
    }

    fn write_backup(
        &self,
        name: &str,
        contents: &str,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let slug = canonical_name(name);
        let label = sanitize_backup_note(note);

        let mut stamp = Utc::now();
        let (file_name, path) = loop {
            let mut stem = format!(
                "{}_{}_{}",
                slug,
                stamp.format(BACKUP_DATE_FORMAT),
                stamp.format(BACKUP_TIME_FORMAT)
            );
            if let Some(label) = &label {
                stem.push('_');
                stem.push_str(label);
            }
            let file_name = format!("{stem}.{LEDGER_EXTENSION}");
            let path = dir.join(&file_name);
            if !path.exists() {
                break (file_name, path);
            }
            stamp += Duration::milliseconds(1);
        };

        write_atomic(&path, contents)?;
        debug!(ledger = %slug, backup = %file_name, "wrote backup");
        self.prune_backups(name)?;
        Ok(LedgerBackupInfo {
            ledger: slug,
            id: file_name,
            created_at: stamp.to_rfc3339(),
            path,
        })
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        let entries = self.list_backups(name)?;
        for entry in entries.into_iter().skip(self.retention) {
            debug!(backup = %entry.id, "pruning backup");
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl LedgerStorage for JsonLedgerStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        let path = self.ledger_path(name);
        if path.exists() {
            let previous = fs::read_to_string(&path)?;
            self.write_backup(name, &previous, None)?;
        }
        save_ledger_to_path(ledger, &path)?;
        info!(ledger = %ledger.name, path = %path.display(), "ledger saved");
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(CoreError::LedgerNotFound(name.to_string()));
        }
        load_ledger_from_path(&path)
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        if !self.paths.ledger_root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.paths.ledger_root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_ledger(&self, name: &str) -> Result<(), CoreError> {
        let path = self.ledger_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn ledger_path(&self, name: &str) -> PathBuf {
        self.paths
            .ledger_root
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        self.write_backup(name, &serialize_ledger(ledger)?, note)
    }

    /// Lists backups newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let created_at = parse_backup_timestamp(file_name)
                .map(|stamp| stamp.to_rfc3339())
                .unwrap_or_default();
            entries.push(LedgerBackupInfo {
                ledger: slug.clone(),
                id: file_name.to_string(),
                created_at,
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse((parse_backup_timestamp(&info.id), info.id.clone())));
        Ok(entries)
    }

    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let restored = load_ledger_from_path(&backup.path)?;
        let target = self.ledger_path(&backup.ledger);
        let tmp = tmp_path(&target);
        fs::copy(&backup.path, &tmp)?;
        fs::rename(&tmp, &target)?;
        info!(backup = %backup.id, "restored backup");
        Ok(restored)
    }
}

/// Saves a ledger to an arbitrary path, replacing it atomically.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_ledger(ledger)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a ledger from the provided filesystem path.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Turns a display name into the slug used for file names.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads the `<date>_<time>` pair out of a backup file name.
fn parse_backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stem = file_name.strip_suffix(&format!(".{LEDGER_EXTENSION}"))?;
    let segments: Vec<&str> = stem.split('_').collect();
    segments.windows(2).rev().find_map(|pair| {
        let (date, time) = (pair[0], pair[1]);
        if !is_digits(date, 8) || !is_digits(time, 9) {
            return None;
        }
        let (clock, millis) = time.split_at(6);
        let naive = NaiveDateTime::parse_from_str(&format!("{date}{clock}"), "%Y%m%d%H%M%S").ok()?;
        let millis: i64 = millis.parse().ok()?;
        Some(DateTime::from_naive_utc_and_offset(naive, Utc) + Duration::milliseconds(millis))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_ledger(ledger: &Ledger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}
