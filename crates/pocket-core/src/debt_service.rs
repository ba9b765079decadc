use chrono::NaiveDate;
use pocket_domain::{Debt, DebtStatus, Ledger};
use tracing::debug;
use uuid::Uuid;

use crate::{
    records::ListFilter,
    validation::{Validate, ValidationError},
    CoreError,
};

const KIND: &str = "Debt";

pub struct DebtService;

impl DebtService {
    pub fn add(ledger: &mut Ledger, debt: Debt, today: NaiveDate) -> Result<Uuid, CoreError> {
        Self::check(ledger, &debt, today, None)?;
        let id = debt.id;
        debug!(%id, description = %debt.description, "adding debt");
        ledger.debts.push(debt);
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
        F: FnOnce(&mut Debt),
    {
        let mut draft = Self::get(ledger, id)?.clone();
        mutate(&mut draft);
        draft.id = id;
        Self::check(ledger, &draft, today, Some(id))?;
        if let Some(slot) = ledger.debts.iter_mut().find(|debt| debt.id == id) {
            *slot = draft;
        }
        ledger.touch();
        Ok(())
    }

    /// Removes a debt; expenses and due items that referenced it keep their
    /// history with the reference cleared.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Debt, CoreError> {
        let index = ledger
            .debts
            .iter()
            .position(|debt| debt.id == id)
            .ok_or_else(|| CoreError::not_found(KIND, id))?;
        let removed = ledger.debts.remove(index);
        for expense in ledger
            .expenses
            .iter_mut()
            .filter(|expense| expense.debt_id == Some(id))
        {
            expense.debt_id = None;
        }
        for item in ledger
            .due_items
            .iter_mut()
            .filter(|item| item.debt_id == Some(id))
        {
            item.debt_id = None;
        }
        debug!(%id, "removed debt");
        ledger.touch();
        Ok(removed)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&Debt, CoreError> {
        ledger.debt(id).ok_or_else(|| CoreError::not_found(KIND, id))
    }

    /// Lists debts by priority, then by entity name. `Incomplete` hides
    /// cancelled debts.
    pub fn list(ledger: &Ledger, filter: ListFilter) -> Vec<&Debt> {
        let mut debts: Vec<&Debt> = ledger
            .debts
            .iter()
            .filter(|debt| filter.admits(debt.status == DebtStatus::Cancelled))
            .collect();
        debts.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| ledger.entity_name_for(a).cmp(ledger.entity_name_for(b)))
        });
        debts
    }

    fn check(
        ledger: &Ledger,
        debt: &Debt,
        today: NaiveDate,
        except: Option<Uuid>,
    ) -> Result<(), CoreError> {
        debt.validate(today)?;
        if let Some(entity_id) = debt.entity_id {
            if ledger.entity(entity_id).is_none() {
                return Err(CoreError::not_found("Entity", entity_id));
            }
        }
        Self::ensure_unique_description(ledger, &debt.description, except)
    }

    /// Descriptions identify debts in CSV bundles, so two debts may not share one.
    fn ensure_unique_description(
        ledger: &Ledger,
        description: &str,
        except: Option<Uuid>,
    ) -> Result<(), CoreError> {
        let clash = ledger
            .debts
            .iter()
            .any(|debt| debt.description == description && Some(debt.id) != except);
        if clash {
            return Err(ValidationError::new(
                "description",
                format!("`{description}` already exists"),
            )
            .into());
        }
        Ok(())
    }
}
