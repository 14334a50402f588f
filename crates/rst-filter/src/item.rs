//! Filterable projection of server entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of a single characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    /// Numeric characteristic (support, confidence, accuracy, ...).
    Number(f64),
    /// Textual characteristic (decision class, union type, ...).
    Text(String),
}

impl CharacteristicValue {
    /// Numeric view, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for CharacteristicValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CharacteristicValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Anything a [`Filter`](crate::Filter) can be evaluated against.
pub trait Filterable {
    /// Look up a characteristic by exact (case-sensitive) name.
    fn characteristic(&self, name: &str) -> Option<&CharacteristicValue>;
}

/// An entity reduced to an id plus named characteristics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Position of the entity in the server's result.
    pub id: usize,
    /// Characteristics keyed by name.
    #[serde(default)]
    pub characteristics: BTreeMap<String, CharacteristicValue>,
}

impl Item {
    /// Item with no characteristics.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            characteristics: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CharacteristicValue>) -> Self {
        self.characteristics.insert(name.into(), value.into());
        self
    }

    /// Insert or replace a characteristic.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<CharacteristicValue>) {
        self.characteristics.insert(name.into(), value.into());
    }
}

impl Filterable for Item {
    fn characteristic(&self, name: &str) -> Option<&CharacteristicValue> {
        self.characteristics.get(name)
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn characteristic(&self, name: &str) -> Option<&CharacteristicValue> {
        (**self).characteristic(name)
    }
}
