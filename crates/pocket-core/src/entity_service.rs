use chrono::NaiveDate;
use pocket_domain::{Entity, Ledger};
use tracing::debug;
use uuid::Uuid;

use crate::{
    debt_service::DebtService,
    validation::{Validate, ValidationError},
    CoreError,
};

const KIND: &str = "Entity";

pub struct EntityService;

impl EntityService {
    pub fn add(ledger: &mut Ledger, entity: Entity, today: NaiveDate) -> Result<Uuid, CoreError> {
        entity.validate(today)?;
        Self::ensure_unique_name(ledger, &entity.name, None)?;
        let id = entity.id;
        debug!(%id, name = %entity.name, "adding entity");
        ledger.entities.push(entity);
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
        F: FnOnce(&mut Entity),
    {
        let mut draft = Self::get(ledger, id)?.clone();
        mutate(&mut draft);
        draft.id = id;
        draft.validate(today)?;
        Self::ensure_unique_name(ledger, &draft.name, Some(id))?;
        if let Some(slot) = ledger.entities.iter_mut().find(|entity| entity.id == id) {
            *slot = draft;
        }
        ledger.touch();
        Ok(())
    }

    /// Removes an entity together with every debt owed to it.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<Entity, CoreError> {
        let index = ledger
            .entities
            .iter()
            .position(|entity| entity.id == id)
            .ok_or_else(|| CoreError::not_found(KIND, id))?;
        let owned: Vec<Uuid> = ledger
            .debts
            .iter()
            .filter(|debt| debt.entity_id == Some(id))
            .map(|debt| debt.id)
            .collect();
        for debt_id in owned {
            DebtService::remove(ledger, debt_id)?;
        }
        let removed = ledger.entities.remove(index);
        debug!(%id, name = %removed.name, "removed entity");
        ledger.touch();
        Ok(removed)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&Entity, CoreError> {
        ledger.entity(id).ok_or_else(|| CoreError::not_found(KIND, id))
    }

    /// Lists entities ordered by name.
    pub fn list(ledger: &Ledger) -> Vec<&Entity> {
        let mut entities: Vec<&Entity> = ledger.entities.iter().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        entities
    }

    fn ensure_unique_name(
        ledger: &Ledger,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), CoreError> {
        let clash = ledger
            .entities
            .iter()
            .any(|entity| entity.name == name && Some(entity.id) != except);
        if clash {
            return Err(ValidationError::new("name", format!("`{name}` already exists")).into());
        }
        Ok(())
    }
}
