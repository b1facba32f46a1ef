//! Pending changes accumulated during an edit session.
//!
//! The log keeps three ordered queues, one per kind of change, filled at
//! mutation time. Draining them delete-queue first, then updates, then creates
//! gives the commit order without any sorting step. An entity id lives in at
//! most one queue at a time.

use crate::{Entity, EntityId, FieldOverlay, ServerId, TempId};
use serde::Serialize;

/// Kind of a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// One outstanding mutation of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange<E: Entity> {
    pub kind: ChangeKind,
    /// Fields to send. Empty for deletes.
    pub data: FieldOverlay<E::Field>,
    /// The entity as it was before the session touched it. `None` for creates.
    pub original: Option<E>,
}

impl<E: Entity> PendingChange<E> {
    fn create(data: FieldOverlay<E::Field>) -> Self {
        Self {
            kind: ChangeKind::Create,
            data,
            original: None,
        }
    }

    fn update(data: FieldOverlay<E::Field>, original: E) -> Self {
        Self {
            kind: ChangeKind::Update,
            data,
            original: Some(original),
        }
    }

    fn delete(original: E) -> Self {
        Self {
            kind: ChangeKind::Delete,
            data: FieldOverlay::new(),
            original: Some(original),
        }
    }
}

/// Ordered record of pending mutations, at most one per entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeLog<E: Entity> {
    deletes: Vec<(ServerId, PendingChange<E>)>,
    updates: Vec<(ServerId, PendingChange<E>)>,
    creates: Vec<(TempId, PendingChange<E>)>,
}

impl<E: Entity> Default for ChangeLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> ChangeLog<E> {
    pub fn new() -> Self {
        Self {
            deletes: Vec::new(),
            updates: Vec::new(),
            creates: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.deletes.len() + self.updates.len() + self.creates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.deletes.clear();
        self.updates.clear();
        self.creates.clear();
    }

    /// The pending change for an entity, if any.
    pub fn get(&self, id: EntityId) -> Option<&PendingChange<E>> {
        match id {
            EntityId::Temp(temp) => find(&self.creates, &temp),
            EntityId::Server(server) => {
                find(&self.deletes, &server).or_else(|| find(&self.updates, &server))
            }
        }
    }

    /// All pending changes, in commit order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &PendingChange<E>)> {
        let deletes = self
            .deletes
            .iter()
            .map(|(id, change)| (EntityId::Server(*id), change));
        let updates = self
            .updates
            .iter()
            .map(|(id, change)| (EntityId::Server(*id), change));
        let creates = self
            .creates
            .iter()
            .map(|(id, change)| (EntityId::Temp(*id), change));
        deletes.chain(updates).chain(creates)
    }

    /// Record a locally created entity.
    pub fn record_create(&mut self, id: TempId, data: FieldOverlay<E::Field>) {
        match find_mut(&mut self.creates, &id) {
            Some(change) => change.data.merge(data),
            None => self.creates.push((id, PendingChange::create(data))),
        }
    }

    /// Record an edit of `entity`, which must be the pre-edit state.
    ///
    /// Edits of a not-yet-created entity fold into its create.
    pub fn record_edit(&mut self, entity: &E, data: FieldOverlay<E::Field>) {
        match entity.id() {
            EntityId::Temp(temp) => match find_mut(&mut self.creates, &temp) {
                Some(change) => change.data.merge(data),
                None => {
                    let full = FieldOverlay::merged(entity.persisted_fields(), data);
                    self.creates.push((temp, PendingChange::create(full)));
                }
            },
            EntityId::Server(server) => match find_mut(&mut self.updates, &server) {
                Some(change) => change.data.merge(data),
                None => self
                    .updates
                    .push((server, PendingChange::update(data, entity.clone()))),
            },
        }
    }

    /// Record the deletion of `entity`.
    ///
    /// A temporary entity simply loses its create. A server entity gets a
    /// delete that supersedes any pending update.
    pub fn record_delete(&mut self, entity: &E) {
        match entity.id() {
            EntityId::Temp(temp) => {
                take(&mut self.creates, &temp);
            }
            EntityId::Server(server) => {
                let original = take(&mut self.updates, &server)
                    .and_then(|update| update.original)
                    .unwrap_or_else(|| entity.clone());
                if find(&self.deletes, &server).is_none() {
                    self.deletes.push((server, PendingChange::delete(original)));
                }
            }
        }
    }

    /// Drop the change for an entity once the server confirmed it.
    pub fn acknowledge(&mut self, id: EntityId) -> Option<PendingChange<E>> {
        match id {
            EntityId::Temp(temp) => take(&mut self.creates, &temp),
            EntityId::Server(server) => {
                take(&mut self.deletes, &server).or_else(|| take(&mut self.updates, &server))
            }
        }
    }

    /// Partition the log into the calls a commit has to make.
    pub fn plan(&self) -> CommitPlan<E::Field> {
        CommitPlan {
            deletes: self.deletes.iter().map(|(id, _)| *id).collect(),
            updates: self
                .updates
                .iter()
                .map(|(id, change)| (*id, change.data.clone()))
                .collect(),
            creates: self
                .creates
                .iter()
                .map(|(id, change)| (*id, change.data.clone()))
                .collect(),
        }
    }
}

fn find<'a, K: PartialEq, V>(queue: &'a [(K, V)], key: &K) -> Option<&'a V> {
    queue.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn find_mut<'a, K: PartialEq, V>(queue: &'a mut [(K, V)], key: &K) -> Option<&'a mut V> {
    queue.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn take<K: PartialEq, V>(queue: &mut Vec<(K, V)>, key: &K) -> Option<V> {
    let index = queue.iter().position(|(k, _)| k == key)?;
    Some(queue.remove(index).1)
}

/// The network calls a commit makes, already in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan<F: crate::Field> {
    pub deletes: Vec<ServerId>,
    pub updates: Vec<(ServerId, FieldOverlay<F>)>,
    pub creates: Vec<(TempId, FieldOverlay<F>)>,
}

/// A single call of a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitStep<F: crate::Field> {
    Delete(ServerId),
    Update(ServerId, FieldOverlay<F>),
    Create(TempId, FieldOverlay<F>),
}

impl<F: crate::Field> CommitPlan<F> {
    pub fn len(&self) -> usize {
        self.deletes.len() + self.updates.len() + self.creates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deletes, then updates, then creates, each in insertion order.
    pub fn into_steps(self) -> Vec<CommitStep<F>> {
        let mut steps = Vec::with_capacity(self.len());
        steps.extend(self.deletes.into_iter().map(CommitStep::Delete));
        steps.extend(
            self.updates
                .into_iter()
                .map(|(id, data)| CommitStep::Update(id, data)),
        );
        steps.extend(
            self.creates
                .into_iter()
                .map(|(id, data)| CommitStep::Create(id, data)),
        );
        steps
    }
}
