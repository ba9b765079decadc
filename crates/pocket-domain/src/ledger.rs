//! The ledger snapshot that every service reads from and writes to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{debt::Debt, due_item::DueItem, entity::Entity, expense::Expense, income::Income};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub incomes: Vec<Income>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub due_items: Vec<DueItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            entities: Vec::new(),
            debts: Vec::new(),
            incomes: Vec::new(),
            expenses: Vec::new(),
            due_items: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn entity(&self, id: Uuid) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn debt(&self, id: Uuid) -> Option<&Debt> {
        self.debts.iter().find(|debt| debt.id == id)
    }

    pub fn debt_by_description(&self, description: &str) -> Option<&Debt> {
        self.debts
            .iter()
            .find(|debt| debt.description == description)
    }

    pub fn income(&self, id: Uuid) -> Option<&Income> {
        self.incomes.iter().find(|income| income.id == id)
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn due_item(&self, id: Uuid) -> Option<&DueItem> {
        self.due_items.iter().find(|item| item.id == id)
    }

    /// Name of the entity a debt is owed to, or an empty string.
    pub fn entity_name_for(&self, debt: &Debt) -> &str {
        debt.entity_id
            .and_then(|id| self.entity(id))
            .map(|entity| entity.name.as_str())
            .unwrap_or("")
    }

    pub fn record_count(&self) -> usize {
        self.entities.len()
            + self.debts.len()
            + self.incomes.len()
            + self.expenses.len()
            + self.due_items.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
