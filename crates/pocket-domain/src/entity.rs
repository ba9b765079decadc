//! Counterparties that debts are owed to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

crate::choice_enum! {
    /// Classifies a counterparty.
    EntityKind, default = Bank {
        Bank => ("bank", "Bank"),
        School => ("school", "School"),
        Fintech => ("fintech", "Fintech"),
        Other => ("other", "Other"),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
        }
    }
}

impl Identifiable for Entity {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Entity {
    fn display_label(&self) -> String {
        self.name.clone()
    }
}
