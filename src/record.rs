//! Persisted record of control values
//!
//! Stored in LocalStorage as a single JSON object mapping control id to its
//! last-saved value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from control id to last-known value.
///
/// Keys are kept sorted so an unchanged snapshot always serializes to the
/// same text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedRecord {
    values: BTreeMap<String, String>,
}

impl PersistedRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse stored text, degrading to an empty record on any failure
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Ignoring unreadable stored values: {}", e);
                Self::new()
            }
        }
    }

    /// Serialize to the stored text form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(id, value)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PersistedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
