//! Documents and the field values the scorer reads from them.

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use crate::error::Result;

/// A single field value as it appears in a source record.
///
/// Only [`FieldValue::Text`] and [`FieldValue::TextList`] take part in text
/// scoring. [`FieldValue::Number`] feeds the popularity multiplier, and
/// [`FieldValue::Other`] keeps any remaining JSON (booleans, nulls, nested
/// objects, mixed arrays) so records survive a load/serialize cycle.
/// Numbers keep their JSON form, so `120` is written back as `120`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    TextList(Vec<String>),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

/// Borrowed view of a scorable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRef<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl FieldValue {
    /// View this value as scorable text, if it is text.
    pub fn as_text(&self) -> Option<TextRef<'_>> {
        match self {
            Self::Text(text) => Some(TextRef::Text(text)),
            Self::TextList(items) => Some(TextRef::List(items)),
            Self::Number(_) | Self::Other(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Short human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::TextList(_) => "a list of text",
            Self::Number(_) => "a number",
            Self::Other(serde_json::Value::Null) => "null",
            Self::Other(serde_json::Value::Bool(_)) => "a boolean",
            Self::Other(serde_json::Value::Array(_)) => "a mixed list",
            Self::Other(_) => "an object",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::TextList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<serde_json::Number> for FieldValue {
    fn from(value: serde_json::Number) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// NaN and infinities have no JSON form and become `null`.
impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map_or(Self::Other(serde_json::Value::Null), Self::Number)
    }
}

/// Read access to named fields. The scorer is generic over this trait so
/// callers can rank their own record types without converting them.
pub trait Searchable {
    fn field(&self, name: &str) -> Option<&FieldValue>;
}

/// An open-ended record: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Searchable for Document {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

impl Searchable for HashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

impl Searchable for BTreeMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

/// Load a JSON array of documents from disk.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let raw = fs::read_to_string(path)?;
    let docs: Vec<Document> = serde_json::from_str(&raw)?;
    tracing::debug!("Loaded {} documents from {}", docs.len(), path.display());
    Ok(docs)
}
