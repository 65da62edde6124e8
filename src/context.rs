//! Run context with DashMap
//!
//! One mutable key/value store shared by every form and element of an engine
//! run. Cloning a [`Context`] clones the handle, not the data, so handlers may
//! keep one and write from other threads.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Thread-safe key/value store for one engine run (lock-free)
#[derive(Clone, Default, Debug)]
pub struct Context {
    values: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|v| v.clone())
    }

    /// Get a value rendered as display text
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| display_value(&v))
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.remove(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Display text for a template argument
    ///
    /// Falls back to the argument name itself when the key is absent.
    pub fn resolve_arg(&self, name: &str) -> String {
        self.get_str(name).unwrap_or_else(|| name.to_string())
    }

    /// Sorted copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Strings render raw, everything else as compact JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
