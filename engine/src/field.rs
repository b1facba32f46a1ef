//! Field values, field kinds and validation.
//!
//! Every persisted field of a domain entity has a [`FieldKind`] which decides
//! what values it accepts. Values are validated (and normalized) before they
//! reach a working copy, a pending change or a field buffer.

use crate::{error::Result, Error};
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// A single persisted field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Position(u32),
}

impl FieldValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "Text",
            FieldValue::Number(_) => "Number",
            FieldValue::Bool(_) => "Bool",
            FieldValue::Position(_) => "Position",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_position(&self) -> Option<u32> {
        match self {
            FieldValue::Position(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Position(value)
    }
}

/// What a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Non-blank text.
    Name,
    /// Text that may be empty.
    Label,
    /// Finite number greater than zero.
    Quantity,
    Flag,
    /// Index within an ordered list.
    Position,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Name | FieldKind::Label => write!(f, "Text"),
            FieldKind::Quantity => write!(f, "Number"),
            FieldKind::Flag => write!(f, "Bool"),
            FieldKind::Position => write!(f, "Position"),
        }
    }
}

impl FieldKind {
    /// Validate a value for a field of this kind, returning the normalized value.
    ///
    /// Text is trimmed. Integral positions are accepted from whole numbers.
    pub fn validate(&self, field: &str, value: FieldValue) -> Result<FieldValue> {
        match (self, value) {
            (FieldKind::Name, FieldValue::Text(text)) => {
                let text = normalize_text(field, &text)?;
                if text.is_empty() {
                    return Err(Error::BlankField(field.to_string()));
                }
                Ok(FieldValue::Text(text))
            }
            (FieldKind::Label, FieldValue::Text(text)) => {
                Ok(FieldValue::Text(normalize_text(field, &text)?))
            }
            (FieldKind::Quantity, FieldValue::Number(n)) => {
                if n.is_finite() && n > 0.0 {
                    Ok(FieldValue::Number(n))
                } else {
                    Err(Error::NonPositiveQuantity {
                        field: field.to_string(),
                        value: n,
                    })
                }
            }
            (FieldKind::Quantity, FieldValue::Position(p)) => {
                FieldKind::Quantity.validate(field, FieldValue::Number(f64::from(p)))
            }
            (FieldKind::Flag, FieldValue::Bool(b)) => Ok(FieldValue::Bool(b)),
            (FieldKind::Position, FieldValue::Position(p)) => Ok(FieldValue::Position(p)),
            (kind, other) => Err(Error::TypeMismatch {
                field: field.to_string(),
                expected: kind.to_string(),
                got: other.type_name().to_string(),
            }),
        }
    }

    /// Parse raw user input for a field of this kind.
    ///
    /// Returns `None` when the text cannot represent a value of this kind.
    pub fn parse_input(&self, input: &str) -> Option<FieldValue> {
        let trimmed = input.trim();
        match self {
            FieldKind::Name | FieldKind::Label => Some(FieldValue::Text(input.to_string())),
            FieldKind::Quantity => trimmed
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .map(FieldValue::Number),
            FieldKind::Flag => match trimmed {
                "true" | "1" | "yes" => Some(FieldValue::Bool(true)),
                "false" | "0" | "no" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            FieldKind::Position => trimmed.parse::<u32>().ok().map(FieldValue::Position),
        }
    }
}

fn normalize_text(field: &str, text: &str) -> Result<String> {
    let text = text.trim();
    if text.chars().any(char::is_control) {
        return Err(Error::InvalidCharacters(field.to_string()));
    }
    Ok(text.to_string())
}

/// A persisted field of a domain entity.
///
/// Implemented by a plain enum per domain. The enum doubles as the allow-list
/// of keys an overlay may carry: local-only state has no variant and so can
/// never be sent to the backend.
pub trait Field: Copy + Eq + Ord + Hash + fmt::Debug + 'static {
    /// Wire name of the field.
    fn name(self) -> &'static str;

    fn kind(self) -> FieldKind;

    /// Every field of the domain, in wire order.
    fn all() -> &'static [Self];

    /// Validate a value for this field.
    fn validate(self, value: FieldValue) -> Result<FieldValue> {
        self.kind().validate(self.name(), value)
    }
}
