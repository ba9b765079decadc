use std::{
    collections::HashSet,
    path::PathBuf,
};

use pocket_domain::Ledger;

use crate::CoreError;

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing ledgers and backups.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError>;
    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn delete_ledger(&self, name: &str) -> Result<(), CoreError>;
    fn ledger_path(&self, name: &str) -> PathBuf;
    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError>;

    fn ledger_exists(&self, name: &str) -> bool {
        self.ledger_path(name).exists()
    }
}

/// Detects dangling references within a ledger snapshot.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let entity_ids: HashSet<_> = ledger.entities.iter().map(|e| e.id).collect();
    let debt_ids: HashSet<_> = ledger.debts.iter().map(|d| d.id).collect();
    let mut warnings = Vec::new();

    for debt in &ledger.debts {
        if let Some(entity) = debt.entity_id {
            if !entity_ids.contains(&entity) {
                warnings.push(format!(
                    "debt {} references unknown entity {}",
                    debt.id, entity
                ));
            }
        }
    }
    for expense in &ledger.expenses {
        if let Some(debt) = expense.debt_id {
            if !debt_ids.contains(&debt) {
                warnings.push(format!(
                    "expense {} references missing debt {}",
                    expense.id, debt
                ));
            }
        }
    }
    for item in &ledger.due_items {
        if let Some(debt) = item.debt_id {
            if !debt_ids.contains(&debt) {
                warnings.push(format!(
                    "due item {} references missing debt {}",
                    item.id, debt
                ));
            }
        }
    }
    warnings
}
