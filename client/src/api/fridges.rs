//! `/fridges` endpoints.

use super::ApiClient;
use crate::adapter::{AdapterError, ResolutionAdapter};
use fridge_engine::{FieldOverlay, Fridge, FridgeField, ServerId};

/// Fridges of the logged-in user.
#[derive(Debug, Clone)]
pub struct RestFridgeAdapter {
    api: ApiClient,
}

impl RestFridgeAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl ResolutionAdapter<Fridge> for RestFridgeAdapter {
    async fn list(&self) -> Result<Vec<Fridge>, AdapterError> {
        self.api.list("/fridges").await
    }

    async fn create(&self, fields: &FieldOverlay<FridgeField>) -> Result<Fridge, AdapterError> {
        self.api.create::<Fridge>("/fridges", fields).await
    }

    async fn update(
        &self,
        id: ServerId,
        fields: &FieldOverlay<FridgeField>,
    ) -> Result<Fridge, AdapterError> {
        self.api
            .update::<Fridge>(&format!("/fridges/{}", id), fields)
            .await
    }

    async fn delete(&self, id: ServerId) -> Result<(), AdapterError> {
        self.api.delete(&format!("/fridges/{}", id)).await
    }
}
