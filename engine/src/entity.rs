//! Domain entities and the canonical entity store.

use crate::{
    error::Result, snapshot::StoreSnapshot, EntityId, Error, Field, FieldOverlay, FieldValue,
    Timestamp,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// A domain record (fridge, grocery item) that can be edited in a session.
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Persisted fields of this domain.
    type Field: Field;
    /// Local-only, never persisted flags.
    type LocalFlag: Copy + fmt::Debug;

    /// Human-readable kind, used in logs and errors.
    const KIND: &'static str;

    fn id(&self) -> EntityId;

    /// Current value of a persisted field.
    fn field(&self, field: Self::Field) -> FieldValue;

    /// Set a persisted field. The value must already be validated.
    fn set_field(&mut self, field: Self::Field, value: FieldValue) -> Result<()>;

    /// Build a new entity from a (validated) overlay.
    ///
    /// Fails with [`Error::MissingRequiredField`] when a required field is absent.
    fn from_fields(id: EntityId, fields: &FieldOverlay<Self::Field>) -> Result<Self>;

    fn toggle_flag(&mut self, flag: Self::LocalFlag);

    /// Field holding the entity's position in an ordered list, if the domain has one.
    fn position_field() -> Option<Self::Field> {
        None
    }

    /// Apply every value of an overlay.
    fn apply(&mut self, overlay: &FieldOverlay<Self::Field>) -> Result<()> {
        for (field, value) in overlay.iter() {
            self.set_field(field, value.clone())?;
        }
        Ok(())
    }

    /// The full set of persisted fields as an overlay.
    fn persisted_fields(&self) -> FieldOverlay<Self::Field> {
        Self::Field::all()
            .iter()
            .map(|field| (*field, self.field(*field)))
            .collect()
    }
}

pub(crate) fn type_mismatch<F: Field>(field: F, value: &FieldValue) -> Error {
    Error::TypeMismatch {
        field: field.name().to_string(),
        expected: field.kind().to_string(),
        got: value.type_name().to_string(),
    }
}

pub(crate) fn required<F: Field>(fields: &FieldOverlay<F>, field: F) -> Result<FieldValue> {
    fields
        .get(field)
        .cloned()
        .ok_or_else(|| Error::MissingRequiredField(field.name().to_string()))
}

/// The canonical, server-confirmed list of entities.
///
/// Replaced wholesale on every refresh. Nothing outside a commit patches it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore<E: Entity> {
    entities: Vec<E>,
    refreshed_at: Option<Timestamp>,
}

impl<E: Entity> Default for EntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityStore<E> {
    /// Create an empty, never-refreshed store.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            refreshed_at: None,
        }
    }

    /// All entities, in server order.
    pub fn list(&self) -> &[E] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// When the store was last replaced from the server (milliseconds since epoch).
    pub fn refreshed_at(&self) -> Option<Timestamp> {
        self.refreshed_at
    }

    /// Replace the whole list with what the server returned.
    ///
    /// Anything not echoed back no longer exists as far as the client is concerned.
    pub fn replace(&mut self, entities: Vec<E>, timestamp: Timestamp) {
        self.entities = entities;
        self.refreshed_at = Some(timestamp);
    }

    /// Insert or replace a just-confirmed entity.
    pub fn upsert(&mut self, entity: E) {
        match self.entities.iter_mut().find(|e| e.id() == entity.id()) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }

    /// Remove an entity the server confirmed as deleted.
    pub fn remove(&mut self, id: EntityId) -> Option<E> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Export the store for persistence.
    pub fn export_state(&self, saved_at: Timestamp) -> StoreSnapshot<E> {
        StoreSnapshot::new(E::KIND, saved_at, self.entities.clone())
    }

    /// Restore the store from a snapshot.
    ///
    /// The snapshot's save time becomes the refresh time.
    pub fn import_state(&mut self, snapshot: StoreSnapshot<E>) -> Result<()> {
        snapshot.validate()?;
        self.refreshed_at = Some(snapshot.saved_at);
        self.entities = snapshot.entities;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fridge, GroceryField, GroceryItem};

    fn fridges() -> Vec<Fridge> {
        vec![Fridge::new(1, "Home"), Fridge::new(2, "Office")]
    }

    #[test]
    fn new_store_is_empty() {
        let store: EntityStore<Fridge> = EntityStore::new();
        assert!(store.is_empty());
        assert_eq!(store.refreshed_at(), None);
    }

    #[test]
    fn replace_is_wholesale() {
        let mut store = EntityStore::new();
        store.replace(fridges(), 1000);
        assert_eq!(store.len(), 2);

        store.replace(vec![Fridge::new(2, "Office")], 2000);
        assert_eq!(store.len(), 1);
        assert!(!store.contains(EntityId::Server(1)));
        assert_eq!(store.refreshed_at(), Some(2000));
    }

    #[test]
    fn upsert_and_remove() {
        let mut store = EntityStore::new();
        store.replace(fridges(), 1000);

        store.upsert(Fridge::new(1, "Cabin"));
        assert_eq!(store.get(EntityId::Server(1)).unwrap().name, "Cabin");
        assert_eq!(store.len(), 2);

        store.upsert(Fridge::new(3, "Garage"));
        assert_eq!(store.len(), 3);

        let removed = store.remove(EntityId::Server(2)).unwrap();
        assert_eq!(removed.name, "Office");
        assert!(store.remove(EntityId::Server(2)).is_none());
    }

    #[test]
    fn persisted_fields_cover_every_field() {
        let item = GroceryItem::new(5, "Milk", 2.0, "l");
        let fields = item.persisted_fields();
        assert_eq!(fields.len(), GroceryField::all().len());
        assert_eq!(fields.get(GroceryField::Quantity), Some(&FieldValue::Number(2.0)));
    }

    #[test]
    fn export_import_roundtrip() {
        let mut store = EntityStore::new();
        store.replace(fridges(), 1000);

        let snapshot = store.export_state(5000);
        let mut restored = EntityStore::new();
        restored.import_state(snapshot).unwrap();

        assert_eq!(restored.list(), store.list());
        assert_eq!(restored.refreshed_at(), Some(5000));
    }
}
