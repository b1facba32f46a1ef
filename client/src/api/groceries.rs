//! Shopping-list endpoints, scoped to one fridge.

use super::ApiClient;
use crate::adapter::{AdapterError, ResolutionAdapter};
use fridge_engine::{FieldOverlay, GroceryField, GroceryItem, ServerId};

/// The shopping list of one fridge.
#[derive(Debug, Clone)]
pub struct RestGroceryAdapter {
    api: ApiClient,
    fridge_id: ServerId,
}

impl RestGroceryAdapter {
    pub fn new(api: ApiClient, fridge_id: ServerId) -> Self {
        Self { api, fridge_id }
    }

    pub fn fridge_id(&self) -> ServerId {
        self.fridge_id
    }
}

impl ResolutionAdapter<GroceryItem> for RestGroceryAdapter {
    /// Items sorted by their list position.
    async fn list(&self) -> Result<Vec<GroceryItem>, AdapterError> {
        let mut items: Vec<GroceryItem> = self
            .api
            .list(&format!("/fridges/{}/groceries", self.fridge_id))
            .await?;
        items.sort_by_key(|item| item.order);
        Ok(items)
    }

    async fn create(
        &self,
        fields: &FieldOverlay<GroceryField>,
    ) -> Result<GroceryItem, AdapterError> {
        self.api
            .create::<GroceryItem>(&format!("/fridges/{}/groceries", self.fridge_id), fields)
            .await
    }

    async fn update(
        &self,
        id: ServerId,
        fields: &FieldOverlay<GroceryField>,
    ) -> Result<GroceryItem, AdapterError> {
        self.api
            .update::<GroceryItem>(&format!("/groceries/{}", id), fields)
            .await
    }

    async fn delete(&self, id: ServerId) -> Result<(), AdapterError> {
        self.api.delete(&format!("/groceries/{}", id)).await
    }
}
