//! Edit sessions.
//!
//! An [`EditSession`] owns a working copy of a list and the [`ChangeLog`] of
//! everything done to it since the session started. Every local mutation is
//! applied to both. The session never talks to the network: committing hands
//! out a [`CommitPlan`] and the caller reports back which steps the server
//! confirmed.
//!
//! # States
//!
//! ```text
//! Idle --start_edit--> Editing --begin_commit--> Committing --finish_commit--> Idle
//!                         |  ^                        |
//!                         |  +-------abort_commit-----+
//!                         +--cancel_edit--> Idle
//! ```

use crate::{
    error::Result, ChangeLog, CommitPlan, Entity, EntityId, Error, FieldOverlay, FieldValue,
    TempId,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Temporary-id generations handed out to every session in the process.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Where an edit session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Editing,
    /// A commit plan is being executed against the backend.
    Committing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Editing => write!(f, "editing"),
            SessionState::Committing => write!(f, "committing"),
        }
    }
}

/// A single edit session over one list of entities.
#[derive(Debug, Clone)]
pub struct EditSession<E: Entity> {
    state: SessionState,
    /// Working copy shown while editing.
    working: Vec<E>,
    log: ChangeLog<E>,
    /// Taken from a process-wide counter on every `start_edit`, so temporary
    /// ids never repeat across sessions or session instances.
    generation: u64,
    next_seq: u64,
}

impl<E: Entity> Default for EditSession<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EditSession<E> {
    /// Create an idle session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            working: Vec::new(),
            log: ChangeLog::new(),
            generation: 0,
            next_seq: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    /// True iff there is at least one pending change.
    pub fn has_changes(&self) -> bool {
        !self.log.is_empty()
    }

    /// The working copy.
    pub fn entities(&self) -> &[E] {
        &self.working
    }

    /// An entity of the working copy.
    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.working.iter().find(|e| e.id() == id)
    }

    pub fn change_log(&self) -> &ChangeLog<E> {
        &self.log
    }

    fn require(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        if expected == SessionState::Editing && self.state == SessionState::Idle {
            return Err(Error::NotEditing);
        }
        Err(Error::InvalidState {
            expected,
            actual: self.state,
        })
    }

    fn index_of(&self, id: EntityId) -> Result<usize> {
        self.working
            .iter()
            .position(|e| e.id() == id)
            .ok_or(Error::EntityNotFound(id))
    }

    /// Enter edit mode with a copy of the server's list.
    pub fn start_edit(&mut self, server: &[E]) -> Result<()> {
        self.require(SessionState::Idle)?;
        self.log.clear();
        self.working = server.to_vec();
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.next_seq = 0;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Add a new entity under a fresh temporary id.
    ///
    /// Ordered domains get appended after the current last position unless the
    /// caller supplied one.
    pub fn add_locally(&mut self, fields: FieldOverlay<E::Field>) -> Result<TempId> {
        self.require(SessionState::Editing)?;
        let mut fields = fields.validated()?;

        if let Some(position) = E::position_field() {
            if !fields.contains(position) {
                let next = self
                    .working
                    .iter()
                    .filter_map(|e| e.field(position).as_position())
                    .max()
                    .map_or(0, |last| last.saturating_add(1));
                fields.set(position, FieldValue::Position(next));
            }
        }

        let id = TempId::new(self.generation, self.next_seq);
        let entity = E::from_fields(EntityId::Temp(id), &fields)?;

        self.next_seq += 1;
        self.working.push(entity);
        self.log.record_create(id, fields);
        Ok(id)
    }

    /// Edit fields of an entity in the working copy.
    pub fn edit_locally(&mut self, id: EntityId, fields: FieldOverlay<E::Field>) -> Result<()> {
        self.require(SessionState::Editing)?;
        let fields = fields.validated()?;
        let index = self.index_of(id)?;
        if fields.is_empty() {
            return Ok(());
        }

        let mut edited = self.working[index].clone();
        edited.apply(&fields)?;
        self.log.record_edit(&self.working[index], fields);
        self.working[index] = edited;
        Ok(())
    }

    /// Remove an entity from the working copy.
    pub fn delete_locally(&mut self, id: EntityId) -> Result<()> {
        self.require(SessionState::Editing)?;
        let index = self.index_of(id)?;
        let entity = self.working.remove(index);
        self.log.record_delete(&entity);
        Ok(())
    }

    /// Flip a local-only flag. Nothing is recorded in the change log.
    pub fn toggle_local_flag(&mut self, id: EntityId, flag: E::LocalFlag) -> Result<()> {
        self.require(SessionState::Editing)?;
        let index = self.index_of(id)?;
        self.working[index].toggle_flag(flag);
        Ok(())
    }

    /// Reorder the working copy.
    ///
    /// `order` must name every entity of the working copy exactly once. Only
    /// entities whose position actually changes get a pending change.
    pub fn reorder_locally(&mut self, order: &[EntityId]) -> Result<()> {
        self.require(SessionState::Editing)?;
        let position = E::position_field().ok_or(Error::NotReorderable(E::KIND))?;

        if order.len() != self.working.len() {
            return Err(Error::InvalidReorder(format!(
                "expected {} ids, got {}",
                self.working.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) {
                return Err(Error::InvalidReorder(format!("duplicate id {}", id)));
            }
            self.index_of(*id)?;
        }

        let mut reordered = Vec::with_capacity(order.len());
        for (index, id) in order.iter().enumerate() {
            let index = u32::try_from(index)
                .map_err(|_| Error::InvalidReorder("list too long".to_string()))?;
            let mut entity = self.working[self.index_of(*id)?].clone();
            let target = FieldValue::Position(index);
            if entity.field(position) != target {
                self.log
                    .record_edit(&entity, FieldOverlay::new().with(position, target.clone()));
                entity.set_field(position, target)?;
            }
            reordered.push(entity);
        }
        self.working = reordered;
        Ok(())
    }

    /// Leave edit mode, throwing every local change away.
    pub fn cancel_edit(&mut self, server: &[E]) -> Result<()> {
        self.require(SessionState::Editing)?;
        self.working = server.to_vec();
        self.log.clear();
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Start committing: returns the calls to make, deletes first.
    pub fn begin_commit(&mut self) -> Result<CommitPlan<E::Field>> {
        self.require(SessionState::Editing)?;
        self.state = SessionState::Committing;
        Ok(self.log.plan())
    }

    /// The server confirmed the delete or update of `id`.
    pub fn acknowledge(&mut self, id: EntityId) -> Result<()> {
        self.require(SessionState::Committing)?;
        self.log.acknowledge(id);
        Ok(())
    }

    /// The server created the entity known locally as `temp`.
    ///
    /// The confirmed entity takes the temporary one's place in the working copy.
    pub fn confirm_create(&mut self, temp: TempId, confirmed: E) -> Result<()> {
        self.require(SessionState::Committing)?;
        self.log.acknowledge(EntityId::Temp(temp));
        if let Some(slot) = self
            .working
            .iter_mut()
            .find(|e| e.id() == EntityId::Temp(temp))
        {
            *slot = confirmed;
        }
        Ok(())
    }

    /// A commit step failed: go back to editing with the unconfirmed changes.
    pub fn abort_commit(&mut self) -> Result<()> {
        self.require(SessionState::Committing)?;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Every step went through: clear the log and adopt the server's list.
    pub fn finish_commit(&mut self, server: &[E]) -> Result<()> {
        self.require(SessionState::Committing)?;
        self.log.clear();
        self.working = server.to_vec();
        self.state = SessionState::Idle;
        Ok(())
    }
}
