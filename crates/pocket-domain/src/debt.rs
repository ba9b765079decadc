//! Debts owed to counterparties.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

crate::choice_enum! {
    DebtKind, default = Other {
        Card => ("card", "Card"),
        Loan => ("loan", "Loan"),
        Education => ("education", "Education"),
        Service => ("service", "Service"),
        Other => ("other", "Other"),
    }
}

crate::choice_enum! {
    /// Repayment standing of a debt.
    DebtStatus, default = Current {
        Current => ("current", "Current"),
        InProgress => ("in_progress", "In progress"),
        Delinquent => ("delinquent", "Delinquent"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

impl DebtStatus {
    /// Debts that still weigh on the outstanding total.
    pub fn is_active(&self) -> bool {
        matches!(self, DebtStatus::Current | DebtStatus::InProgress)
    }
}

crate::choice_enum! {
    Priority, default = Medium {
        High => ("high", "High"),
        Medium => ("medium", "Medium"),
        Low => ("low", "Low"),
    }
}

impl Priority {
    /// Sort rank, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    pub id: Uuid,
    #[serde(default)]
    pub entity_id: Option<Uuid>,
    pub kind: DebtKind,
    #[serde(default)]
    pub description: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub minimum_payment: Decimal,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_payment: Option<NaiveDate>,
    #[serde(default)]
    pub status: DebtStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub monthly_installment: Option<Decimal>,
    #[serde(default)]
    pub remaining_installments: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

impl Debt {
    pub fn new(
        entity_id: Option<Uuid>,
        kind: DebtKind,
        description: impl Into<String>,
        total_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id,
            kind,
            description: description.into(),
            total_amount: money(total_amount),
            minimum_payment: Decimal::ZERO,
            due_date: None,
            next_payment: None,
            status: DebtStatus::default(),
            priority: Priority::default(),
            monthly_installment: None,
            remaining_installments: None,
            notes: String::new(),
        }
    }

    pub fn with_installment(mut self, installment: Decimal, remaining: Option<u32>) -> Self {
        self.monthly_installment = Some(money(installment));
        self.remaining_installments = remaining;
        self
    }

    /// The approximate monthly installment, zero when none is recorded.
    pub fn installment(&self) -> Decimal {
        self.monthly_installment.unwrap_or(Decimal::ZERO)
    }
}

impl Identifiable for Debt {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Debt {
    fn amount(&self) -> Decimal {
        self.total_amount
    }
}

impl Displayable for Debt {
    fn display_label(&self) -> String {
        if self.description.is_empty() {
            format!("{} debt", self.kind.label())
        } else {
            format!("{} ({})", self.description, self.kind.label())
        }
    }
}
