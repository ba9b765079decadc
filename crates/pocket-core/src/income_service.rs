use chrono::NaiveDate;
use pocket_domain::{Income, Ledger};
use tracing::debug;
use uuid::Uuid;

use crate::{
    records::{replace_flagged, ListFilter},
    validation::Validate,
    CoreError,
};

const KIND: &str = "Income";

pub struct IncomeService;

impl IncomeService {
    pub fn add(ledger: &mut Ledger, income: Income, today: NaiveDate) -> Result<Uuid, CoreError> {
        income.validate(today)?;
        let id = income.id;
        debug!(%id, amount = %income.amount, date = %income.date, "adding income");
        ledger.incomes.push(income);
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
        F: FnOnce(&mut Income),
    {
        let mut draft = Self::get(ledger, id)?.clone();
        mutate(&mut draft);
        draft.id = id;
        draft.validate(today)?;
        if let Some(slot) = ledger.incomes.iter_mut().find(|income| income.id == id) {
            *slot = draft;
        }
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Income, CoreError> {
        let index = ledger
            .incomes
            .iter()
            .position(|income| income.id == id)
            .ok_or_else(|| CoreError::not_found(KIND, id))?;
        let removed = ledger.incomes.remove(index);
        debug!(%id, "removed income");
        ledger.touch();
        Ok(removed)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&Income, CoreError> {
        ledger.income(id).ok_or_else(|| CoreError::not_found(KIND, id))
    }

    /// Lists income newest first.
    pub fn list(ledger: &Ledger, filter: ListFilter) -> Vec<&Income> {
        let mut incomes: Vec<&Income> = ledger
            .incomes
            .iter()
            .filter(|income| filter.admits(income.confirmed))
            .collect();
        incomes.sort_by(|a, b| b.date.cmp(&a.date));
        incomes
    }

    /// Marks exactly `ids` as confirmed and every other income as pending.
    pub fn set_confirmed(ledger: &mut Ledger, ids: &[Uuid]) -> Result<usize, CoreError> {
        let flagged = replace_flagged(&mut ledger.incomes, KIND, ids, |income, value| {
            income.confirmed = value
        })?;
        debug!(flagged, "updated confirmed income set");
        ledger.touch();
        Ok(flagged)
    }
}
