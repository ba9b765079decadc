//! Billable or payable events with a due date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

crate::choice_enum! {
    DueStatus, default = Pending {
        Pending => ("pending", "Pending"),
        Paid => ("paid", "Paid"),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueItem {
    pub id: Uuid,
    pub date: NaiveDate,
    pub concept: String,
    pub amount: Decimal,
    #[serde(default)]
    pub status: DueStatus,
    #[serde(default)]
    pub debt_id: Option<Uuid>,
    #[serde(default)]
    pub notes: String,
}

impl DueItem {
    pub fn new(date: NaiveDate, concept: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            concept: concept.into(),
            amount: money(amount),
            status: DueStatus::Pending,
            debt_id: None,
            notes: String::new(),
        }
    }

    pub fn for_debt(mut self, debt_id: Uuid) -> Self {
        self.debt_id = Some(debt_id);
        self
    }

    pub fn is_paid(&self) -> bool {
        self.status == DueStatus::Paid
    }
}

impl Identifiable for DueItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for DueItem {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Completable for DueItem {
    fn scheduled_on(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn is_completed(&self) -> bool {
        self.is_paid()
    }
}

impl Displayable for DueItem {
    fn display_label(&self) -> String {
        format!("{} - {}", self.date, self.concept)
    }
}
