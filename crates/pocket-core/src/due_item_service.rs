use chrono::NaiveDate;
use pocket_domain::{DueItem, DueStatus, Ledger};
use tracing::debug;
use uuid::Uuid;

use crate::{
    records::{replace_flagged, ListFilter},
    validation::Validate,
    CoreError,
};

const KIND: &str = "Due item";

pub struct DueItemService;

impl DueItemService {
    pub fn add(ledger: &mut Ledger, item: DueItem, today: NaiveDate) -> Result<Uuid, CoreError> {
        Self::check(ledger, &item, today)?;
        let id = item.id;
        debug!(%id, concept = %item.concept, date = %item.date, "adding due item");
        ledger.due_items.push(item);
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
        F: FnOnce(&mut DueItem),
    {
        let mut draft = Self::get(ledger, id)?.clone();
        mutate(&mut draft);
        draft.id = id;
        Self::check(ledger, &draft, today)?;
        if let Some(slot) = ledger.due_items.iter_mut().find(|item| item.id == id) {
            *slot = draft;
        }
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<DueItem, CoreError> {
        let index = ledger
            .due_items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| CoreError::not_found(KIND, id))?;
        let removed = ledger.due_items.remove(index);
        debug!(%id, "removed due item");
        ledger.touch();
        Ok(removed)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&DueItem, CoreError> {
        ledger.due_item(id).ok_or_else(|| CoreError::not_found(KIND, id))
    }

    /// Lists due items by date, then concept.
    pub fn list(ledger: &Ledger, filter: ListFilter) -> Vec<&DueItem> {
        let mut items: Vec<&DueItem> = ledger
            .due_items
            .iter()
            .filter(|item| filter.admits(item.is_paid()))
            .collect();
        items.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.concept.cmp(&b.concept)));
        items
    }

    /// Marks exactly `ids` as paid and every other due item as pending.
    pub fn set_paid(ledger: &mut Ledger, ids: &[Uuid]) -> Result<usize, CoreError> {
        let flagged = replace_flagged(&mut ledger.due_items, KIND, ids, |item, paid| {
            item.status = if paid {
                DueStatus::Paid
            } else {
                DueStatus::Pending
            }
        })?;
        debug!(flagged, "updated paid due item set");
        ledger.touch();
        Ok(flagged)
    }

    fn check(ledger: &Ledger, item: &DueItem, today: NaiveDate) -> Result<(), CoreError> {
        item.validate(today)?;
        if let Some(debt_id) = item.debt_id {
            if ledger.debt(debt_id).is_none() {
                return Err(CoreError::not_found("Debt", debt_id));
            }
        }
        Ok(())
    }
}
