//! Attribute bag data model
//!
//! The attribute bag is the per-host matching context: labels, inventory data
//! and computed custom attributes merged into one flat map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat, case-sensitive mapping of attribute name to scalar value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<String, Value>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Attribute value rendered as plain text (strings unquoted)
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.0.get(name).map(value_to_string)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or overwrite an attribute
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Merge a source map, skipping falsy values; later merges overwrite
    pub fn merge_truthy<'a, I>(&mut self, source: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (name, value) in source {
            if is_truthy(value) {
                self.0.insert(name.clone(), value.clone());
            }
        }
    }

    /// Merge another bag, overwriting existing keys
    pub fn extend(&mut self, other: AttributeBag) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for AttributeBag {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Attribute snapshot for one host and integration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostAttributes {
    /// Full merged attribute set used for matching
    pub all: AttributeBag,

    /// Attributes passed by the integration's filter rules (exported labels)
    pub filtered: AttributeBag,

    /// The filter rules asked to skip this host
    #[serde(default)]
    pub ignore_host: bool,
}

/// Python-like truthiness used for merging and outcome pruning
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a value as text: strings unquoted, null empty, everything else as JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
