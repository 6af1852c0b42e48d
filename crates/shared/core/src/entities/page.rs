use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{RecordError, RecordResult};
use crate::values::safe_cast;

/// One item of a reply: field name to raw venue string.
///
/// Values stay opaque until a typed record or the pagination filter parses them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Raw value, trimmed
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|v| v.trim())
    }

    /// Value or an empty string
    pub fn text(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    pub fn require(&self, field: &str) -> RecordResult<&str> {
        self.get(field)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RecordError::MissingField(field.to_string()))
    }

    /// Integer value with a fallback for blank or malformed fields
    pub fn int(&self, field: &str, default: i64) -> i64 {
        self.get(field)
            .map(|v| safe_cast(crate::values::strip_sign(v), default))
            .unwrap_or(default)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A fully materialised reply page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    rows: Vec<Record>,
}

impl Page {
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Page holding a single record
    pub fn single(record: Record) -> Self {
        Self { rows: vec![record] }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
