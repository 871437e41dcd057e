//! Shared tag map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag key/value map applied to resources and to the stack itself.
///
/// Backed by a `BTreeMap` so iteration and rendering order are stable;
/// synthesized declarations must be byte-identical between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMap(BTreeMap<String, String>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut tags = Self::new();
        for (key, value) in pairs {
            tags.insert(*key, *value);
        }
        tags
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    /// True if the map carries this exact key/value pair.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Merge every entry of `other` into this map. Existing keys are
    /// overwritten; there is no per-resource override.
    pub fn extend(&mut self, other: &TagMap) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
