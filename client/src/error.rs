//! Unified error handling for the client.

use crate::{adapter::AdapterError, config::ConfigError, storage::StorageError};
use serde::Serialize;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Engine error: {0}")]
    Engine(#[from] fridge_engine::Error),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Stored identity does not match the auth token")]
    ReauthenticationRequired,

    #[error("A sync is already in progress")]
    Busy,

    #[error("{failed} of {attempted} updates failed")]
    FlushFailed { failed: usize, attempted: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A title and message pair ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub title: String,
    pub message: String,
}

impl UserMessage {
    fn new(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
        }
    }
}

impl ClientError {
    /// True when the user has to log in again before anything else works.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::ReauthenticationRequired
                | ClientError::Adapter(AdapterError::Unauthorized)
        )
    }

    /// What to show the user for this error.
    pub fn user_message(&self) -> UserMessage {
        match self {
            ClientError::Engine(e) if e.is_validation() => {
                UserMessage::new("Invalid input", e.to_string())
            }
            ClientError::ReauthenticationRequired
            | ClientError::Adapter(AdapterError::Unauthorized) => UserMessage::new(
                "Session expired",
                "Please log in again to keep editing.",
            ),
            ClientError::Busy => UserMessage::new(
                "Still saving",
                "Please wait until your previous changes are saved.",
            ),
            ClientError::FlushFailed { failed, attempted } => UserMessage::new(
                "Could not save changes",
                format!(
                    "{} of {} items could not be saved. Please try again.",
                    failed, attempted
                ),
            ),
            ClientError::Adapter(_) => UserMessage::new(
                "Could not save changes",
                "Something went wrong while talking to the server. Please try again.",
            ),
            ClientError::Engine(_) | ClientError::Storage(_) | ClientError::Config(_) => {
                UserMessage::new("Something went wrong", self.to_string())
            }
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
