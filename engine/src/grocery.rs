//! Shopping-list (grocery) items.

use crate::{
    entity::{required, type_mismatch},
    error::Result,
    EditSession, Entity, EntityId, Error, Field, FieldKind, FieldOverlay, FieldValue, ServerId,
    TempId,
};
use serde::{Deserialize, Serialize};

/// An item on a fridge's shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub id: EntityId,
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub order: u32,
}

impl GroceryItem {
    /// A server-confirmed item.
    pub fn new(
        id: ServerId,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::Server(id),
            name: name.into(),
            quantity,
            unit: unit.into(),
            purchased: false,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_purchased(mut self, purchased: bool) -> Self {
        self.purchased = purchased;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroceryField {
    Name,
    Quantity,
    Unit,
    Purchased,
    Order,
}

impl Field for GroceryField {
    fn name(self) -> &'static str {
        match self {
            GroceryField::Name => "name",
            GroceryField::Quantity => "quantity",
            GroceryField::Unit => "unit",
            GroceryField::Purchased => "purchased",
            GroceryField::Order => "order",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            GroceryField::Name => FieldKind::Name,
            GroceryField::Quantity => FieldKind::Quantity,
            GroceryField::Unit => FieldKind::Label,
            GroceryField::Purchased => FieldKind::Flag,
            GroceryField::Order => FieldKind::Position,
        }
    }

    fn all() -> &'static [Self] {
        &[
            GroceryField::Name,
            GroceryField::Quantity,
            GroceryField::Unit,
            GroceryField::Purchased,
            GroceryField::Order,
        ]
    }
}

/// Grocery items carry no local-only state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroceryFlag {}

impl Entity for GroceryItem {
    type Field = GroceryField;
    type LocalFlag = GroceryFlag;

    const KIND: &'static str = "grocery item";

    fn id(&self) -> EntityId {
        self.id
    }

    fn field(&self, field: GroceryField) -> FieldValue {
        match field {
            GroceryField::Name => FieldValue::Text(self.name.clone()),
            GroceryField::Quantity => FieldValue::Number(self.quantity),
            GroceryField::Unit => FieldValue::Text(self.unit.clone()),
            GroceryField::Purchased => FieldValue::Bool(self.purchased),
            GroceryField::Order => FieldValue::Position(self.order),
        }
    }

    fn set_field(&mut self, field: GroceryField, value: FieldValue) -> Result<()> {
        match (field, value) {
            (GroceryField::Name, FieldValue::Text(name)) => self.name = name,
            (GroceryField::Quantity, FieldValue::Number(quantity)) => self.quantity = quantity,
            (GroceryField::Unit, FieldValue::Text(unit)) => self.unit = unit,
            (GroceryField::Purchased, FieldValue::Bool(purchased)) => self.purchased = purchased,
            (GroceryField::Order, FieldValue::Position(order)) => self.order = order,
            (field, value) => return Err(type_mismatch(field, &value)),
        }
        Ok(())
    }

    fn from_fields(id: EntityId, fields: &FieldOverlay<GroceryField>) -> Result<Self> {
        let mut item = GroceryItem {
            id,
            name: String::new(),
            quantity: 0.0,
            unit: String::new(),
            purchased: false,
            order: 0,
        };
        item.set_field(GroceryField::Name, required(fields, GroceryField::Name)?)?;
        item.set_field(
            GroceryField::Quantity,
            required(fields, GroceryField::Quantity)?,
        )?;
        for field in [GroceryField::Unit, GroceryField::Purchased, GroceryField::Order] {
            if let Some(value) = fields.get(field) {
                item.set_field(field, value.clone())?;
            }
        }
        Ok(item)
    }

    fn toggle_flag(&mut self, flag: GroceryFlag) {
        match flag {}
    }

    fn position_field() -> Option<GroceryField> {
        Some(GroceryField::Order)
    }
}

impl EditSession<GroceryItem> {
    /// Append an item to the working copy.
    pub fn add_item_locally(&mut self, name: &str, quantity: f64, unit: &str) -> Result<TempId> {
        self.add_locally(
            FieldOverlay::new()
                .with(GroceryField::Name, name)
                .with(GroceryField::Quantity, quantity)
                .with(GroceryField::Unit, unit),
        )
    }

    /// Flip the purchased state of an item.
    pub fn toggle_purchased_locally(&mut self, id: EntityId) -> Result<()> {
        let purchased = self
            .get(id)
            .map(|item| item.purchased)
            .ok_or(Error::EntityNotFound(id))?;
        self.edit_locally(
            id,
            FieldOverlay::new().with(GroceryField::Purchased, !purchased),
        )
    }

    /// Delete every purchased item from the working copy. Returns how many were removed.
    pub fn remove_purchased_locally(&mut self) -> Result<usize> {
        let purchased: Vec<EntityId> = self
            .entities()
            .iter()
            .filter(|item| item.purchased)
            .map(|item| item.id)
            .collect();
        for id in &purchased {
            self.delete_locally(*id)?;
        }
        Ok(purchased.len())
    }
}
