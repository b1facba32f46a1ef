//! Snapshot types for caching the entity store between launches.
//!
//! A snapshot only ever holds server-confirmed entities. Working copies and
//! pending changes are never persisted.

use crate::{error::Result, Entity, Error, Timestamp};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time copy of an [`EntityStore`](crate::EntityStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "E: Entity"))]
pub struct StoreSnapshot<E: Entity> {
    /// Snapshot format version
    pub format_version: u32,
    /// Entity kind the snapshot was taken of
    pub kind: String,
    /// When the snapshot was taken (milliseconds since epoch)
    pub saved_at: Timestamp,
    /// Entities in server order
    pub entities: Vec<E>,
}

impl<E: Entity> StoreSnapshot<E> {
    pub fn new(kind: impl Into<String>, saved_at: Timestamp, entities: Vec<E>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            kind: kind.into(),
            saved_at,
            entities,
        }
    }

    /// Check that the snapshot can be loaded into a store of `E`.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        if self.kind != E::KIND {
            return Err(Error::InvalidSnapshot(format!(
                "expected a {} snapshot, got {}",
                E::KIND,
                self.kind
            )));
        }

        if let Some(entity) = self.entities.iter().find(|e| e.id().is_temporary()) {
            return Err(Error::InvalidSnapshot(format!(
                "snapshot contains unconfirmed {} {}",
                E::KIND,
                entity.id()
            )));
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
