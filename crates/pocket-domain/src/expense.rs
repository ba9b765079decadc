//! Money going out.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

crate::choice_enum! {
    ExpenseKind, default = Variable {
        Fixed => ("fixed", "Fixed"),
        Variable => ("variable", "Variable"),
        DebtPayment => ("debt_payment", "Debt payment"),
        Other => ("other", "Other"),
    }
}

crate::choice_enum! {
    /// How an expense is settled.
    PaymentMethod, default = Cash {
        Cash => ("cash", "Cash"),
        Debit => ("debit", "Debit"),
        Card => ("card", "Card"),
    }
}

impl PaymentMethod {
    /// Cash and debit leave the balance on the transaction date; card
    /// purchases only once the card is paid.
    pub fn affects_cash_flow(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Debit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: ExpenseKind,
    /// Free-text subcategory such as rent, groceries or fuel.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub debt_id: Option<Uuid>,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        kind: ExpenseKind,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            category: category.into(),
            description: description.into(),
            amount: money(amount),
            paid: false,
            payment_method: PaymentMethod::default(),
            debt_id: None,
        }
    }

    pub fn paid(mut self) -> Self {
        self.paid = true;
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn affects_cash_flow(&self) -> bool {
        self.payment_method.affects_cash_flow()
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Completable for Expense {
    fn scheduled_on(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn is_completed(&self) -> bool {
        self.paid
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!("{} - {}", self.date, self.category)
    }
}
