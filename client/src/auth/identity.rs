//! Pre-commit identity check.

use super::token_subject;
use crate::{
    error::{ClientError, Result},
    storage::{KeyValueStore, AUTH_TOKEN_KEY, USER_ID_KEY},
};
use std::sync::Arc;

/// Refuses to let a commit run under a token issued for someone else.
#[derive(Clone)]
pub struct IdentityGuard {
    storage: Arc<dyn KeyValueStore>,
}

impl IdentityGuard {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Check that the stored user id matches the stored token's subject.
    pub fn verify(&self) -> Result<()> {
        let user_id = self.storage.get(USER_ID_KEY)?;
        let token = self.storage.get(AUTH_TOKEN_KEY)?;

        let (Some(user_id), Some(token)) = (user_id, token) else {
            tracing::warn!("No stored identity, login required");
            return Err(ClientError::ReauthenticationRequired);
        };

        match token_subject(&token) {
            Some(subject) if subject == user_id => Ok(()),
            Some(subject) => {
                tracing::warn!(
                    user_id = %user_id,
                    subject = %subject,
                    "Auth token belongs to another user"
                );
                Err(ClientError::ReauthenticationRequired)
            }
            None => {
                tracing::warn!(user_id = %user_id, "Auth token has no subject");
                Err(ClientError::ReauthenticationRequired)
            }
        }
    }
}

impl std::fmt::Debug for IdentityGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGuard").finish_non_exhaustive()
    }
}
