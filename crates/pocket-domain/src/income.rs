//! Money coming in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

crate::choice_enum! {
    IncomeKind, default = Salary {
        Salary => ("salary", "Salary"),
        Bonus => ("bonus", "Bonus"),
        Rent => ("rent", "Rent"),
        Extraordinary => ("extraordinary", "Extraordinary"),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Income {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: IncomeKind,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    /// Set once the money has actually been received.
    #[serde(default)]
    pub confirmed: bool,
}

impl Income {
    pub fn new(
        date: NaiveDate,
        kind: IncomeKind,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            description: description.into(),
            amount: money(amount),
            confirmed: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }
}

impl Identifiable for Income {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Income {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Completable for Income {
    fn scheduled_on(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn is_completed(&self) -> bool {
        self.confirmed
    }
}

impl Displayable for Income {
    fn display_label(&self) -> String {
        format!("{} - {}", self.date, self.kind.label())
    }
}
