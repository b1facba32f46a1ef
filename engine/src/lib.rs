//! # Fridge Engine
//!
//! Optimistic local editing for shared fridges and their shopping lists.
//!
//! This crate holds the state that lives between a user's taps and the
//! backend's answers: working copies, pending changes and buffered inline
//! edits. It never performs IO. The client crate drives it against the REST
//! backend.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine knows nothing about HTTP, storage or clocks
//! - **Server is truth**: the [`EntityStore`] is only ever replaced by a refresh
//! - **Explicit lifecycle**: every transition of an [`EditSession`] is a method
//!   that fails in the wrong state instead of silently doing nothing
//!
//! ## Core Concepts
//!
//! ### Identifiers
//!
//! Server entities are addressed by a [`ServerId`]. Entities created while
//! editing get a [`TempId`] until the server confirms them. [`EntityId`] is
//! either of the two.
//!
//! ### Edit sessions
//!
//! An [`EditSession`] copies the server list into a working copy and records
//! every local create, edit and delete in a [`ChangeLog`]. Committing yields a
//! [`CommitPlan`]: deletes first, then updates, then creates.
//!
//! ### Inline edits
//!
//! A [`FieldPendingBuffer`] overlays typed-in values on server entities without
//! ever mutating them, and turns them into full updates when flushed.
//!
//! ## Quick Start
//!
//! ```rust
//! use fridge_engine::{EditSession, EntityId, Fridge};
//!
//! let server = vec![Fridge::new(1, "Home")];
//!
//! let mut session = EditSession::new();
//! session.start_edit(&server).unwrap();
//! session.edit_fridge_locally(EntityId::Server(1), "Cabin").unwrap();
//! let office = session.add_fridge_locally("Office").unwrap();
//!
//! let plan = session.begin_commit().unwrap();
//! assert_eq!(plan.updates.len(), 1);
//! assert_eq!(plan.creates[0].0, office);
//! ```
//!
//! ## Persistence
//!
//! Use [`EntityStore::export_state`] and [`EntityStore::import_state`] with
//! [`StoreSnapshot`] to cache the last server list between launches.

pub mod change_log;
pub mod entity;
pub mod error;
pub mod field;
pub mod field_buffer;
pub mod fridge;
pub mod grocery;
pub mod id;
pub mod overlay;
pub mod session;
pub mod snapshot;

// Re-export main types at crate root
pub use change_log::{ChangeKind, ChangeLog, CommitPlan, CommitStep, PendingChange};
pub use entity::{Entity, EntityStore};
pub use error::Error;
pub use field::{Field, FieldKind, FieldValue};
pub use field_buffer::{FieldPendingBuffer, Flushable, PendingInput};
pub use fridge::{Fridge, FridgeField, FridgeFlag};
pub use grocery::{GroceryField, GroceryFlag, GroceryItem};
pub use id::{EntityId, ServerId, TempId, TEMP_ID_PREFIX};
pub use overlay::FieldOverlay;
pub use session::{EditSession, SessionState};
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;
