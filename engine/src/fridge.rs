//! Shared fridges.

use crate::{
    entity::{required, type_mismatch},
    error::Result,
    EditSession, Entity, EntityId, Field, FieldKind, FieldOverlay, FieldValue, ServerId, TempId,
};
use serde::{Deserialize, Serialize};

/// A shared fridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fridge {
    pub id: EntityId,
    pub name: String,
    /// Hidden from the overview. Local only, never sent to the server.
    #[serde(skip)]
    pub is_hidden: bool,
}

impl Fridge {
    /// A server-confirmed fridge.
    pub fn new(id: ServerId, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::Server(id),
            name: name.into(),
            is_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FridgeField {
    Name,
}

impl Field for FridgeField {
    fn name(self) -> &'static str {
        match self {
            FridgeField::Name => "name",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            FridgeField::Name => FieldKind::Name,
        }
    }

    fn all() -> &'static [Self] {
        &[FridgeField::Name]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FridgeFlag {
    Hidden,
}

impl Entity for Fridge {
    type Field = FridgeField;
    type LocalFlag = FridgeFlag;

    const KIND: &'static str = "fridge";

    fn id(&self) -> EntityId {
        self.id
    }

    fn field(&self, field: FridgeField) -> FieldValue {
        match field {
            FridgeField::Name => FieldValue::Text(self.name.clone()),
        }
    }

    fn set_field(&mut self, field: FridgeField, value: FieldValue) -> Result<()> {
        match (field, value) {
            (FridgeField::Name, FieldValue::Text(name)) => self.name = name,
            (field, value) => return Err(type_mismatch(field, &value)),
        }
        Ok(())
    }

    fn from_fields(id: EntityId, fields: &FieldOverlay<FridgeField>) -> Result<Self> {
        let mut fridge = Fridge {
            id,
            name: String::new(),
            is_hidden: false,
        };
        fridge.set_field(FridgeField::Name, required(fields, FridgeField::Name)?)?;
        Ok(fridge)
    }

    fn toggle_flag(&mut self, flag: FridgeFlag) {
        match flag {
            FridgeFlag::Hidden => self.is_hidden = !self.is_hidden,
        }
    }
}

impl EditSession<Fridge> {
    /// Add a fridge with the given name to the working copy.
    pub fn add_fridge_locally(&mut self, name: &str) -> Result<TempId> {
        self.add_locally(FieldOverlay::new().with(FridgeField::Name, name))
    }

    /// Rename a fridge in the working copy.
    pub fn edit_fridge_locally(&mut self, id: EntityId, name: &str) -> Result<()> {
        self.edit_locally(id, FieldOverlay::new().with(FridgeField::Name, name))
    }

    /// Flip the local visibility flag of a fridge.
    pub fn toggle_hidden_locally(&mut self, id: EntityId) -> Result<()> {
        self.toggle_local_flag(id, FridgeFlag::Hidden)
    }
}
