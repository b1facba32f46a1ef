//! The backend surface a list controller commits through.

use fridge_engine::{Entity, EntityStore, FieldOverlay, ServerId};
use std::future::Future;

/// Errors returned by a [`ResolutionAdapter`].
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AdapterError {
    /// The entity is already gone on the server.
    pub fn is_stale(&self) -> bool {
        matches!(self, AdapterError::NotFound(_))
    }
}

/// Per-domain list, create, update and delete calls.
pub trait ResolutionAdapter<E: Entity> {
    /// The canonical current list.
    fn list(&self) -> impl Future<Output = Result<Vec<E>, AdapterError>>;

    /// Create an entity. The returned entity carries its permanent id.
    fn create(
        &self,
        fields: &FieldOverlay<E::Field>,
    ) -> impl Future<Output = Result<E, AdapterError>>;

    /// Partial update.
    fn update(
        &self,
        id: ServerId,
        fields: &FieldOverlay<E::Field>,
    ) -> impl Future<Output = Result<E, AdapterError>>;

    /// Delete. Deleting an id the server no longer knows yields
    /// [`AdapterError::NotFound`].
    fn delete(&self, id: ServerId) -> impl Future<Output = Result<(), AdapterError>>;

    /// Fold a just-confirmed entity into the store before the next refresh.
    fn merge_confirmed(&self, store: &mut EntityStore<E>, entity: E) {
        store.upsert(entity);
    }
}
