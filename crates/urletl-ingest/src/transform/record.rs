//! Normalized record model

use crate::extraction::RawRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use indexmap::map::{self, IndexMap};

/// A single field value of a [`UrlRecord`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Any JSON-compatible value
    Json(Value),
    /// A structured date-time produced from a parsed date string
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FieldValue::Json(value) => Some(value),
            FieldValue::DateTime(_) => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(at) => Some(*at),
            FieldValue::Json(_) => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(at: DateTime<Utc>) -> Self {
        FieldValue::DateTime(at)
    }
}

/// One tracked URL entry, keyed by field name
///
/// Fields keep the order they arrived in; fields added later go to the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UrlRecord {
    fields: IndexMap<String, FieldValue>,
}

impl UrlRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Set a field, returning the value it replaced
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub(crate) fn values_mut(&mut self) -> map::ValuesMut<'_, String, FieldValue> {
        self.fields.values_mut()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }
}

impl From<RawRecord> for UrlRecord {
    fn from(raw: RawRecord) -> Self {
        raw.into_iter()
            .map(|(name, value)| (name, FieldValue::Json(value)))
            .collect()
    }
}

impl FromIterator<(String, FieldValue)> for UrlRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a UrlRecord {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
