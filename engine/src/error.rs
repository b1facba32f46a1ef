//! Error types for the fridge engine.

use crate::{EntityId, SessionState};
use thiserror::Error;

/// All possible errors from the fridge engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    // Validation errors
    #[error("field '{0}' must not be blank")]
    BlankField(String),

    #[error("field '{0}' contains invalid characters")]
    InvalidCharacters(String),

    #[error("field '{field}' must be greater than zero, got {value}")]
    NonPositiveQuantity { field: String, value: f64 },

    #[error("type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    // Session errors
    #[error("no edit session in progress")]
    NotEditing,

    #[error("invalid session state: expected {expected}, got {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("{0} entities cannot be reordered")]
    NotReorderable(&'static str),

    #[error("invalid reorder: {0}")]
    InvalidReorder(String),

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl Error {
    /// Whether this error was raised by field validation, before anything was recorded.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::BlankField(_)
                | Error::InvalidCharacters(_)
                | Error::NonPositiveQuantity { .. }
                | Error::TypeMismatch { .. }
                | Error::MissingRequiredField(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
