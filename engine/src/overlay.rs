//! Partial field overlays.
//!
//! A [`FieldOverlay`] is the payload of pending creates and updates and the
//! unit stored per entity in a [`FieldPendingBuffer`](crate::FieldPendingBuffer).
//! Keys are restricted to a domain's [`Field`] enum.

use crate::{error::Result, Field, FieldValue};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// A set of persisted field values, at most one per field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverlay<F: Field> {
    values: BTreeMap<F, FieldValue>,
}

impl<F: Field> Default for FieldOverlay<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> FieldOverlay<F> {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builder-style set.
    pub fn with(mut self, field: F, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: F, value: impl Into<FieldValue>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: F) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn remove(&mut self, field: F) -> Option<FieldValue> {
        self.values.remove(&field)
    }

    pub fn contains(&self, field: F) -> bool {
        self.values.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (F, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.values.keys().copied()
    }

    /// Merge `other` into `self`. Fields present in `other` win.
    pub fn merge(&mut self, other: FieldOverlay<F>) {
        self.values.extend(other.values);
    }

    /// `{...a, ...b}`.
    pub fn merged(mut a: FieldOverlay<F>, b: FieldOverlay<F>) -> FieldOverlay<F> {
        a.merge(b);
        a
    }

    /// Validate every value against its field, normalizing as it goes.
    pub fn validated(self) -> Result<Self> {
        let values = self
            .values
            .into_iter()
            .map(|(field, value)| Ok((field, field.validate(value)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { values })
    }
}

impl<F: Field> FromIterator<(F, FieldValue)> for FieldOverlay<F> {
    fn from_iter<I: IntoIterator<Item = (F, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<F: Field> Serialize for FieldOverlay<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}
