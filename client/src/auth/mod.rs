//! Auth token inspection.
//!
//! Tokens are JWTs issued by the backend. The client never verifies their
//! signature; it only reads the subject to make sure the token still belongs
//! to the user it thinks is logged in.

mod identity;

pub use identity::IdentityGuard;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;

/// Claims that may carry the user id, in order of preference.
const SUBJECT_CLAIMS: [&str; 3] = ["sub", "userId", "user_id"];

/// Extract the user id a JWT was issued for.
///
/// Returns `None` for anything that is not a three-part token with a JSON
/// payload naming a subject.
pub fn token_subject(token: &str) -> Option<String> {
    let token = token.trim().trim_start_matches("Bearer ").trim();
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts[1].is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    let payload: Value = serde_json::from_slice(&bytes).ok()?;

    SUBJECT_CLAIMS
        .iter()
        .filter_map(|claim| payload.get(*claim))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
pub(crate) fn make_test_jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\",\"typ\":\"JWT\"}");
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signature = URL_SAFE_NO_PAD.encode(b"sig");
    format!("{header}.{payload}.{signature}")
}
