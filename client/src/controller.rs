//! List controllers: one screen's store, edit session and field buffer,
//! driven against a [`ResolutionAdapter`].

use crate::{
    adapter::{AdapterError, ResolutionAdapter},
    auth::IdentityGuard,
    error::{ClientError, Result},
    storage::KeyValueStore,
};
use fridge_engine::{
    CommitPlan, CommitStep, EditSession, Entity, EntityId, EntityStore, FieldOverlay,
    FieldPendingBuffer, FieldValue, Flushable, Fridge, GroceryItem, ServerId, SessionState,
    StoreSnapshot, TempId, Timestamp,
};
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// What a successful commit did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub deleted: Vec<ServerId>,
    pub updated: Vec<ServerId>,
    /// Temporary id and the permanent id the server assigned.
    pub created: Vec<(TempId, ServerId)>,
    /// Deletes and updates of entities the server no longer had.
    pub skipped_stale: Vec<ServerId>,
    /// Whether the post-commit refresh succeeded. Always false when there
    /// was nothing to send.
    pub refreshed: bool,
}

/// Where the store is cached between launches.
#[derive(Clone)]
struct StoreCache {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

/// Owns everything one list screen needs.
///
/// `is_syncing` is per controller. Two controllers never share state.
pub struct ListController<E: Entity, A: ResolutionAdapter<E>> {
    adapter: A,
    store: EntityStore<E>,
    session: EditSession<E>,
    buffer: FieldPendingBuffer<E>,
    is_syncing: bool,
    identity: Option<IdentityGuard>,
    cache: Option<StoreCache>,
}

/// Marks a controller as syncing for as long as it lives.
///
/// Dropping it, including when the commit or flush future is dropped
/// mid-flight, clears `is_syncing` and sends an interrupted commit back to
/// editing with its unconfirmed changes.
struct SyncGuard<'a, E: Entity, A: ResolutionAdapter<E>> {
    controller: &'a mut ListController<E, A>,
}

impl<'a, E: Entity, A: ResolutionAdapter<E>> SyncGuard<'a, E, A> {
    fn new(controller: &'a mut ListController<E, A>) -> Self {
        controller.is_syncing = true;
        Self { controller }
    }
}

impl<E: Entity, A: ResolutionAdapter<E>> Deref for SyncGuard<'_, E, A> {
    type Target = ListController<E, A>;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl<E: Entity, A: ResolutionAdapter<E>> DerefMut for SyncGuard<'_, E, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.controller
    }
}

impl<E: Entity, A: ResolutionAdapter<E>> Drop for SyncGuard<'_, E, A> {
    fn drop(&mut self) {
        self.controller.is_syncing = false;
        if self.controller.session.abort_commit().is_ok() {
            tracing::warn!(kind = E::KIND, "Commit interrupted, unconfirmed changes kept");
        }
    }
}

fn now() -> Timestamp {
    Timestamp::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

impl<E: Entity, A: ResolutionAdapter<E>> ListController<E, A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            store: EntityStore::new(),
            session: EditSession::new(),
            buffer: FieldPendingBuffer::new(),
            is_syncing: false,
            identity: None,
            cache: None,
        }
    }

    /// Check the stored identity before every commit.
    pub fn with_identity_guard(mut self, guard: IdentityGuard) -> Self {
        self.identity = Some(guard);
        self
    }

    /// Cache the store under `key` after every refresh.
    pub fn with_cache(mut self, storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        self.cache = Some(StoreCache {
            storage,
            key: key.into(),
        });
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    pub fn session(&self) -> &EditSession<E> {
        &self.session
    }

    pub fn buffer(&self) -> &FieldPendingBuffer<E> {
        &self.buffer
    }

    /// True while a commit or flush is talking to the backend.
    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    pub fn has_changes(&self) -> bool {
        self.session.has_changes()
    }

    /// The list to render: the working copy while a session is open, the
    /// server list otherwise.
    pub fn entities(&self) -> &[E] {
        match self.session.state() {
            SessionState::Idle => self.store.list(),
            SessionState::Editing | SessionState::Committing => self.session.entities(),
        }
    }

    // ------------------------------------------------------------------
    // Server list
    // ------------------------------------------------------------------

    /// Replace the store with the server's list.
    pub async fn refresh(&mut self) -> Result<()> {
        if self.is_syncing {
            return Err(ClientError::Busy);
        }
        self.refresh_store().await
    }

    async fn refresh_store(&mut self) -> Result<()> {
        let entities = self.adapter.list().await?;
        tracing::info!(kind = E::KIND, count = entities.len(), "Refreshed list");

        self.store.replace(entities, now());
        self.buffer.retain_known(&self.store);
        self.save_cache();
        Ok(())
    }

    fn save_cache(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let Some(refreshed_at) = self.store.refreshed_at() else {
            return;
        };
        let saved = self
            .store
            .export_state(refreshed_at)
            .to_json()
            .map_err(ClientError::from)
            .and_then(|json| {
                cache
                    .storage
                    .set(&cache.key, &json)
                    .map_err(ClientError::from)
            });
        if let Err(e) = saved {
            tracing::warn!(kind = E::KIND, key = %cache.key, error = %e, "Failed to cache list");
        }
    }

    /// Fill the store from the cache, if one was saved.
    ///
    /// Returns whether anything was loaded. A cache that cannot be read back
    /// is dropped.
    pub async fn load_cached(&mut self) -> Result<bool> {
        let Some(cache) = self.cache.clone() else {
            return Ok(false);
        };
        let Some(json) = cache.storage.get(&cache.key)? else {
            return Ok(false);
        };

        match StoreSnapshot::<E>::from_json(&json).and_then(|s| self.store.import_state(s)) {
            Ok(()) => {
                tracing::debug!(kind = E::KIND, count = self.store.len(), "Loaded cached list");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(kind = E::KIND, error = %e, "Dropping unreadable cache");
                cache.storage.remove(&cache.key)?;
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // Edit session
    // ------------------------------------------------------------------

    pub fn start_edit(&mut self) -> Result<()> {
        if self.is_syncing {
            return Err(ClientError::Busy);
        }
        self.session.start_edit(self.store.list())?;
        Ok(())
    }

    /// Drop every local change. No network calls.
    pub fn cancel_edit(&mut self) -> Result<()> {
        self.session.cancel_edit(self.store.list())?;
        Ok(())
    }

    pub fn add_locally(&mut self, fields: FieldOverlay<E::Field>) -> Result<TempId> {
        Ok(self.session.add_locally(fields)?)
    }

    pub fn edit_locally(&mut self, id: EntityId, fields: FieldOverlay<E::Field>) -> Result<()> {
        Ok(self.session.edit_locally(id, fields)?)
    }

    pub fn delete_locally(&mut self, id: EntityId) -> Result<()> {
        Ok(self.session.delete_locally(id)?)
    }

    pub fn toggle_local_flag(&mut self, id: EntityId, flag: E::LocalFlag) -> Result<()> {
        Ok(self.session.toggle_local_flag(id, flag)?)
    }

    pub fn reorder_locally(&mut self, order: &[EntityId]) -> Result<()> {
        Ok(self.session.reorder_locally(order)?)
    }

    /// Send the session's changes: deletes, then updates, then creates.
    ///
    /// On failure the session goes back to editing with every unconfirmed
    /// change intact, so calling this again only re-sends what is left.
    pub async fn commit_changes(&mut self) -> Result<CommitReport> {
        if self.is_syncing {
            return Err(ClientError::Busy);
        }
        if let Some(guard) = &self.identity {
            guard.verify()?;
        }
        let plan = self.session.begin_commit()?;

        if plan.is_empty() {
            tracing::debug!(kind = E::KIND, "Nothing to commit");
            self.session.finish_commit(self.store.list())?;
            return Ok(CommitReport::default());
        }

        let mut sync = SyncGuard::new(self);
        let result = sync.execute_commit(plan).await;
        drop(sync);
        result
    }

    async fn execute_commit(&mut self, plan: CommitPlan<E::Field>) -> Result<CommitReport> {
        tracing::info!(
            kind = E::KIND,
            deletes = plan.deletes.len(),
            updates = plan.updates.len(),
            creates = plan.creates.len(),
            "Committing changes"
        );

        match self.run_plan(plan).await {
            Ok(mut report) => {
                report.refreshed = match self.refresh_store().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(kind = E::KIND, error = %e, "Refresh after commit failed");
                        false
                    }
                };
                self.session.finish_commit(self.store.list())?;
                tracing::info!(
                    kind = E::KIND,
                    deleted = report.deleted.len(),
                    updated = report.updated.len(),
                    created = report.created.len(),
                    stale = report.skipped_stale.len(),
                    "Commit finished"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::error!(kind = E::KIND, error = %err, "Commit failed");
                self.session.abort_commit()?;
                if let Err(e) = self.refresh_store().await {
                    tracing::warn!(
                        kind = E::KIND,
                        error = %e,
                        "Refresh after failed commit failed"
                    );
                }
                Err(err)
            }
        }
    }

    async fn run_plan(&mut self, plan: CommitPlan<E::Field>) -> Result<CommitReport> {
        let mut report = CommitReport::default();

        for step in plan.into_steps() {
            match step {
                CommitStep::Delete(id) => {
                    tracing::debug!(kind = E::KIND, id, "Deleting");
                    match self.adapter.delete(id).await {
                        Ok(()) => report.deleted.push(id),
                        Err(e) if e.is_stale() => {
                            tracing::warn!(kind = E::KIND, id, "Already deleted on the server");
                            report.skipped_stale.push(id);
                        }
                        Err(e) => return Err(e.into()),
                    }
                    self.store.remove(EntityId::Server(id));
                    self.buffer.discard(id);
                    self.session.acknowledge(EntityId::Server(id))?;
                }
                CommitStep::Update(id, fields) => {
                    tracing::debug!(kind = E::KIND, id, "Updating");
                    match self.adapter.update(id, &fields).await {
                        Ok(entity) => {
                            self.adapter.merge_confirmed(&mut self.store, entity);
                            report.updated.push(id);
                        }
                        Err(e) if e.is_stale() => {
                            tracing::warn!(
                                kind = E::KIND,
                                id,
                                "Updated entity is gone on the server"
                            );
                            self.store.remove(EntityId::Server(id));
                            report.skipped_stale.push(id);
                        }
                        Err(e) => return Err(e.into()),
                    }
                    self.session.acknowledge(EntityId::Server(id))?;
                }
                CommitStep::Create(temp, fields) => {
                    tracing::debug!(kind = E::KIND, temp = %temp, "Creating");
                    let entity = self.adapter.create(&fields).await?;
                    let id = entity.id().as_server().ok_or_else(|| {
                        AdapterError::InvalidResponse(format!(
                            "created {} has no permanent id",
                            E::KIND
                        ))
                    })?;
                    self.session.confirm_create(temp, entity.clone())?;
                    self.adapter.merge_confirmed(&mut self.store, entity);
                    report.created.push((temp, id));
                }
            }
        }

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Inline field edits
    // ------------------------------------------------------------------

    /// Buffer an inline edit. Invalid values are rejected and not stored.
    pub fn set_field(&mut self, id: ServerId, field: E::Field, value: FieldValue) -> Result<()> {
        Ok(self.buffer.set_field(id, field, value)?)
    }

    /// `entity` as it should be rendered, pending edits included.
    pub fn display(&self, entity: &E) -> E {
        self.buffer.display(entity)
    }

    pub fn display_value(&self, entity: &E, field: E::Field) -> FieldValue {
        self.buffer.display_value(entity, field)
    }

    /// Throw away every buffered edit.
    pub fn discard_fields(&mut self) {
        self.buffer.clear();
    }

    /// Flush `rows`, then send one full update per edited entity.
    ///
    /// Failed updates are not retried and not kept: the buffer is empty
    /// afterwards either way and the store is refreshed. Returns how many
    /// updates were sent.
    pub async fn flush_fields(&mut self, rows: &mut [&mut dyn Flushable<E>]) -> Result<usize> {
        if self.is_syncing {
            return Err(ClientError::Busy);
        }
        self.buffer.end_editing(rows);
        let updates = self.buffer.drain_updates(&self.store);
        if updates.is_empty() {
            return Ok(0);
        }

        let attempted = updates.len();
        let failed = {
            let mut sync = SyncGuard::new(self);
            let failed = sync.send_updates(updates).await;
            if let Err(e) = sync.refresh_store().await {
                tracing::warn!(kind = E::KIND, error = %e, "Refresh after flush failed");
            }
            failed
        };

        tracing::info!(kind = E::KIND, attempted, failed, "Flushed field edits");
        if failed > 0 {
            return Err(ClientError::FlushFailed { failed, attempted });
        }
        Ok(attempted)
    }

    async fn send_updates(&mut self, updates: Vec<(ServerId, FieldOverlay<E::Field>)>) -> usize {
        let mut failed = 0;
        for (id, fields) in updates {
            match self.adapter.update(id, &fields).await {
                Ok(entity) => self.adapter.merge_confirmed(&mut self.store, entity),
                Err(e) if e.is_stale() => {
                    tracing::warn!(kind = E::KIND, id, "Edited entity is gone on the server");
                }
                Err(e) => {
                    tracing::error!(kind = E::KIND, id, error = %e, "Field update failed");
                    failed += 1;
                }
            }
        }
        failed
    }
}

impl<A: ResolutionAdapter<Fridge>> ListController<Fridge, A> {
    pub fn add_fridge_locally(&mut self, name: &str) -> Result<TempId> {
        Ok(self.session.add_fridge_locally(name)?)
    }

    pub fn edit_fridge_locally(&mut self, id: EntityId, name: &str) -> Result<()> {
        Ok(self.session.edit_fridge_locally(id, name)?)
    }

    pub fn toggle_hidden_locally(&mut self, id: EntityId) -> Result<()> {
        Ok(self.session.toggle_hidden_locally(id)?)
    }
}

impl<A: ResolutionAdapter<GroceryItem>> ListController<GroceryItem, A> {
    pub fn add_item_locally(&mut self, name: &str, quantity: f64, unit: &str) -> Result<TempId> {
        Ok(self.session.add_item_locally(name, quantity, unit)?)
    }

    pub fn toggle_purchased_locally(&mut self, id: EntityId) -> Result<()> {
        Ok(self.session.toggle_purchased_locally(id)?)
    }

    pub fn remove_purchased_locally(&mut self) -> Result<usize> {
        Ok(self.session.remove_purchased_locally()?)
    }
}
