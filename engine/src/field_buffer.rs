//! Buffered inline field edits on existing entities.
//!
//! Unlike an [`EditSession`](crate::EditSession), the buffer never touches the
//! entities it overlays. What a list shows is always the server entity with
//! the pending overlay on top, so clearing the buffer is all it takes to
//! revert.

use crate::{
    error::Result, Entity, EntityId, EntityStore, Field, FieldOverlay, FieldValue, ServerId,
};
use std::collections::BTreeMap;

/// Pending field edits, keyed by entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPendingBuffer<E: Entity> {
    entries: BTreeMap<ServerId, FieldOverlay<E::Field>>,
}

impl<E: Entity> Default for FieldPendingBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> FieldPendingBuffer<E> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entities with pending edits.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn pending(&self, id: ServerId) -> Option<&FieldOverlay<E::Field>> {
        self.entries.get(&id)
    }

    /// Buffer a field edit.
    ///
    /// Invalid values are rejected and leave the buffer exactly as it was, so
    /// the displayed value falls back to the last valid one.
    pub fn set_field(&mut self, id: ServerId, field: E::Field, value: FieldValue) -> Result<()> {
        let value = field.validate(value)?;
        self.entries.entry(id).or_default().set(field, value);
        Ok(())
    }

    /// `pending ?? server` for one field.
    pub fn display_value(&self, entity: &E, field: E::Field) -> FieldValue {
        entity
            .id()
            .as_server()
            .and_then(|id| self.entries.get(&id))
            .and_then(|overlay| overlay.get(field))
            .cloned()
            .unwrap_or_else(|| entity.field(field))
    }

    /// A copy of `entity` with its pending overlay applied.
    pub fn display(&self, entity: &E) -> E {
        let mut shown = entity.clone();
        if let Some(overlay) = entity.id().as_server().and_then(|id| self.entries.get(&id)) {
            for (field, value) in overlay.iter() {
                // Values were validated on the way in.
                let _ = shown.set_field(field, value.clone());
            }
        }
        shown
    }

    /// Forget pending edits of one entity, e.g. after it was deleted.
    pub fn discard(&mut self, id: ServerId) -> Option<FieldOverlay<E::Field>> {
        self.entries.remove(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries of entities the store no longer lists.
    pub fn retain_known(&mut self, store: &EntityStore<E>) {
        self.entries
            .retain(|id, _| store.contains(EntityId::Server(*id)));
    }

    /// Flush every registered row into the buffer, in order.
    pub fn end_editing(&mut self, rows: &mut [&mut dyn Flushable<E>]) {
        for row in rows.iter_mut() {
            row.flush(self);
        }
    }

    /// Empty the buffer into one full update per entity.
    ///
    /// Each update carries the entity's complete field set from the store with
    /// the pending overlay merged on top. Entries whose entity is gone are
    /// dropped.
    pub fn drain_updates(
        &mut self,
        store: &EntityStore<E>,
    ) -> Vec<(ServerId, FieldOverlay<E::Field>)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(id, overlay)| {
                let base = store.get(EntityId::Server(id))?;
                Some((id, FieldOverlay::merged(base.persisted_fields(), overlay)))
            })
            .collect()
    }
}

/// A list row that may hold input not yet written to the buffer.
pub trait Flushable<E: Entity> {
    /// Write any in-flight input into `buffer`.
    fn flush(&mut self, buffer: &mut FieldPendingBuffer<E>);
}

/// In-flight text typed into one field of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInput<F: Field> {
    id: ServerId,
    field: F,
    draft: Option<String>,
}

impl<F: Field> PendingInput<F> {
    pub fn new(id: ServerId, field: F) -> Self {
        Self {
            id,
            field,
            draft: None,
        }
    }

    /// Replace the in-flight text.
    pub fn type_text(&mut self, text: impl Into<String>) {
        self.draft = Some(text.into());
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }
}

impl<E: Entity> Flushable<E> for PendingInput<E::Field> {
    fn flush(&mut self, buffer: &mut FieldPendingBuffer<E>) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        if let Some(value) = self.field.kind().parse_input(&draft) {
            // A rejected value snaps back to what was shown before.
            let _ = buffer.set_field(self.id, self.field, value);
        }
    }
}
