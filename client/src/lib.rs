//! # Fridge Client
//!
//! Drives the fridge engine against the REST backend.
//!
//! A [`ListController`] owns one list screen's state: the server list, the
//! edit session and the inline field buffer. It talks to the backend only
//! through a [`ResolutionAdapter`]; [`api`] provides the HTTP ones.
//!
//! ```no_run
//! use fridge_client::{api::{ApiClient, RestFridgeAdapter}, Config, ListController};
//! use fridge_engine::EntityId;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let api = ApiClient::new(&config)?;
//! let mut fridges = ListController::new(RestFridgeAdapter::new(api));
//!
//! fridges.refresh().await?;
//! fridges.start_edit()?;
//! fridges.edit_fridge_locally(EntityId::Server(1), "Cabin")?;
//! let report = fridges.commit_changes().await?;
//! println!("updated {:?}", report.updated);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod storage;

pub use adapter::{AdapterError, ResolutionAdapter};
pub use auth::{token_subject, IdentityGuard};
pub use config::{Config, ConfigError};
pub use controller::{CommitReport, ListController};
pub use error::{ClientError, Result, UserMessage};
pub use storage::{KeyValueStore, MemoryStore, StorageError, AUTH_TOKEN_KEY, USER_ID_KEY};
