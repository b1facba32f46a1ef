//! REST adapters for the fridge backend.
//!
//! Every call is bearer-token authenticated and exchanges JSON. A 2xx status
//! alone is not trusted: bodies are checked for the expected shape before
//! anything reaches a store or session.

mod fridges;
mod groceries;

pub use fridges::RestFridgeAdapter;
pub use groceries::RestGroceryAdapter;

use crate::{adapter::AdapterError, config::Config};
use fridge_engine::{Entity, FieldOverlay};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

/// Shared HTTP plumbing of the REST adapters.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<String, AdapterError> {
        tracing::debug!(%method, path, "Sending request");

        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::UNAUTHORIZED => Err(AdapterError::Unauthorized),
            StatusCode::NOT_FOUND => Err(AdapterError::NotFound(path.to_string())),
            status if !status.is_success() => Err(AdapterError::Status {
                status: status.as_u16(),
                body,
            }),
            _ => Ok(body),
        }
    }

    pub(crate) async fn list<E: Entity>(&self, path: &str) -> Result<Vec<E>, AdapterError> {
        let body = self.send(Method::GET, path, None).await?;
        let entities: Vec<E> = serde_json::from_str(&body)
            .map_err(|e| AdapterError::InvalidResponse(format!("GET {}: {}", path, e)))?;
        if let Some(entity) = entities.iter().find(|e| e.id().is_temporary()) {
            return Err(AdapterError::InvalidResponse(format!(
                "GET {}: listed unconfirmed id {}",
                path,
                entity.id()
            )));
        }
        Ok(entities)
    }

    pub(crate) async fn create<E: Entity>(
        &self,
        path: &str,
        fields: &FieldOverlay<E::Field>,
    ) -> Result<E, AdapterError> {
        let body = self
            .send(Method::POST, path, Some(overlay_body(fields)?))
            .await?;
        confirmed_entity(&body)
    }

    pub(crate) async fn update<E: Entity>(
        &self,
        path: &str,
        fields: &FieldOverlay<E::Field>,
    ) -> Result<E, AdapterError> {
        let body = self
            .send(Method::PATCH, path, Some(overlay_body(fields)?))
            .await?;
        confirmed_entity(&body)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), AdapterError> {
        let body = self.send(Method::DELETE, path, None).await?;
        check_delete_body(&body)
    }
}

fn overlay_body<F: fridge_engine::Field>(fields: &FieldOverlay<F>) -> Result<Value, AdapterError> {
    serde_json::to_value(fields).map_err(|e| AdapterError::InvalidResponse(e.to_string()))
}

/// Parse a create or update response.
///
/// The body must be an object carrying at least `id` and `name`, and the id
/// must be a permanent one.
pub(crate) fn confirmed_entity<E: Entity>(body: &str) -> Result<E, AdapterError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AdapterError::InvalidResponse(format!("expected JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| AdapterError::InvalidResponse("expected a JSON object".to_string()))?;
    for key in ["id", "name"] {
        if !object.contains_key(key) {
            return Err(AdapterError::InvalidResponse(format!(
                "{} response is missing `{}`",
                E::KIND,
                key
            )));
        }
    }

    let entity: E = serde_json::from_value(value)
        .map_err(|e| AdapterError::InvalidResponse(format!("malformed {}: {}", E::KIND, e)))?;
    if entity.id().is_temporary() {
        return Err(AdapterError::InvalidResponse(format!(
            "server echoed unconfirmed id {}",
            entity.id()
        )));
    }
    Ok(entity)
}

/// A delete response is either empty or a string message.
pub(crate) fn check_delete_body(body: &str) -> Result<(), AdapterError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(_)) | Ok(Value::Null) => Ok(()),
        Ok(other) => Err(AdapterError::InvalidResponse(format!(
            "unexpected delete response: {}",
            other
        ))),
        // Plain text message.
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fridge_engine::{EntityId, Fridge, GroceryItem};

    #[test]
    fn confirmed_entity_accepts_extra_fields() {
        let fridge: Fridge =
            confirmed_entity(r#"{"id": 3, "name": "Home", "ownerId": 9}"#).unwrap();
        assert_eq!(fridge, Fridge::new(3, "Home"));
    }

    #[test]
    fn confirmed_entity_requires_id_and_name() {
        let err = confirmed_entity::<Fridge>(r#"{"name": "Home"}"#).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));

        let err = confirmed_entity::<Fridge>(r#"{"id": 3}"#).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));

        let err = confirmed_entity::<Fridge>(r#"["Home"]"#).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));
    }

    #[test]
    fn confirmed_entity_rejects_temporary_id() {
        let err = confirmed_entity::<Fridge>(r#"{"id": "temp_1_0", "name": "Home"}"#).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));
    }

    #[test]
    fn confirmed_entity_checks_types() {
        let err =
            confirmed_entity::<GroceryItem>(r#"{"id": 5, "name": "Milk", "quantity": "two"}"#)
                .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));

        let item: GroceryItem =
            confirmed_entity(r#"{"id": 5, "name": "Milk", "quantity": 2}"#).unwrap();
        assert_eq!(item.id, EntityId::Server(5));
    }

    #[test]
    fn delete_body_shapes() {
        assert!(check_delete_body("").is_ok());
        assert!(check_delete_body("  ").is_ok());
        assert!(check_delete_body(r#""Fridge deleted""#).is_ok());
        assert!(check_delete_body("Fridge deleted").is_ok());
        assert!(check_delete_body(r#"{"id": 1}"#).is_err());
        assert!(check_delete_body("[1]").is_err());
    }
}
