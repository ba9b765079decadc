use chrono::NaiveDate;
use pocket_domain::{Expense, Ledger};
use tracing::debug;
use uuid::Uuid;

use crate::{
    records::{replace_flagged, ListFilter},
    validation::Validate,
    CoreError,
};

const KIND: &str = "Expense";

pub struct ExpenseService;

impl ExpenseService {
    pub fn add(ledger: &mut Ledger, expense: Expense, today: NaiveDate) -> Result<Uuid, CoreError> {
        Self::check(ledger, &expense, today)?;
        let id = expense.id;
        debug!(%id, amount = %expense.amount, method = %expense.payment_method, "adding expense");
        ledger.expenses.push(expense);
        ledger.touch();
        Ok(id)
    }

    pub fn update<F>(
        ledger: &mut Ledger,
        id: Uuid,
        today: NaiveDate,
        mutate: F,
    ) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Expense),
    {
        let mut draft = Self::get(ledger, id)?.clone();
        mutate(&mut draft);
        draft.id = id;
        Self::check(ledger, &draft, today)?;
        if let Some(slot) = ledger.expenses.iter_mut().find(|expense| expense.id == id) {
            *slot = draft;
        }
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Expense, CoreError> {
        let index = ledger
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or_else(|| CoreError::not_found(KIND, id))?;
        let removed = ledger.expenses.remove(index);
        debug!(%id, "removed expense");
        ledger.touch();
        Ok(removed)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&Expense, CoreError> {
        ledger.expense(id).ok_or_else(|| CoreError::not_found(KIND, id))
    }

    /// Lists expenses newest first.
    pub fn list(ledger: &Ledger, filter: ListFilter) -> Vec<&Expense> {
        let mut expenses: Vec<&Expense> = ledger
            .expenses
            .iter()
            .filter(|expense| filter.admits(expense.paid))
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        expenses
    }

    /// Marks exactly `ids` as paid and every other expense as unpaid.
    pub fn set_paid(ledger: &mut Ledger, ids: &[Uuid]) -> Result<usize, CoreError> {
        let flagged = replace_flagged(&mut ledger.expenses, KIND, ids, |expense, value| {
            expense.paid = value
        })?;
        debug!(flagged, "updated paid expense set");
        ledger.touch();
        Ok(flagged)
    }

    fn check(ledger: &Ledger, expense: &Expense, today: NaiveDate) -> Result<(), CoreError> {
        expense.validate(today)?;
        if let Some(debt_id) = expense.debt_id {
            if ledger.debt(debt_id).is_none() {
                return Err(CoreError::not_found("Debt", debt_id));
            }
        }
        Ok(())
    }
}
