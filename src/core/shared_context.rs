//! Shared diagnostic context attached to every log record
//!
//! This module provides:
//! - `FieldValue`: the value type for context entries and call attributes
//! - `SharedContext`: a process-wide concurrent key-value map handle
//! - `Modification`: the change notification passed to a registered listener

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Value type for context entries and per-call attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Per-call attribute map carried on a log record
pub type Attributes = HashMap<String, FieldValue>;

/// A single change applied to a [`SharedContext`]
#[derive(Debug, Clone)]
pub enum Modification {
    /// A new key-value pair was added
    New { key: String, value: FieldValue },
    /// An existing key was bound to a new value
    Updated {
        key: String,
        old_value: FieldValue,
        new_value: FieldValue,
    },
    /// A key-value pair was removed
    Removed { key: String, value: FieldValue },
}

/// Listener invoked synchronously after each single-entry modification
pub type ModificationListener = Box<dyn Fn(&Modification) + Send + Sync>;

struct ContextInner {
    entries: RwLock<HashMap<String, FieldValue>>,
    on_modified: RwLock<Option<ModificationListener>>,
}

/// A concurrent string-keyed map shared between routers and sinks.
///
/// `SharedContext` is a cheap-to-clone handle: every clone views the same
/// underlying map, which is how log records observe context mutations made
/// after their dispatch. All operations are internally synchronized; no
/// caller-side locking is needed.
///
/// At most one modification listener can be registered at a time. It fires
/// synchronously on `put` and `remove`; `clear` is a bulk operation and
/// fires no per-entry notifications.
///
/// # Example
///
/// ```
/// use log_router_system::core::SharedContext;
///
/// let ctx = SharedContext::new();
/// ctx.put("env", "prod");
/// assert_eq!(ctx.get("env").map(|v| v.to_string()), Some("prod".to_string()));
/// ```
#[derive(Clone)]
pub struct SharedContext {
    inner: Arc<ContextInner>,
}

impl SharedContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                entries: RwLock::new(HashMap::new()),
                on_modified: RwLock::new(None),
            }),
        }
    }

    /// Whether two handles view the same underlying map
    pub fn ptr_eq(&self, other: &SharedContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the value bound to `key`, if any
    pub fn get(&self, key: &str) -> Option<FieldValue> {
        self.inner.entries.read().get(key).cloned()
    }

    /// Bind `key` to `value`, returning the previous value if the key
    /// already existed. Notifies the listener with `New` or `Updated`.
    pub fn put<K, V>(&self, key: K, value: V) -> Option<FieldValue>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        let previous = {
            let mut entries = self.inner.entries.write();
            entries.insert(key.clone(), value.clone())
        };

        // Notify outside the map lock so a listener may call back into
        // the context without deadlocking.
        let modification = match &previous {
            Some(old) => Modification::Updated {
                key,
                old_value: old.clone(),
                new_value: value,
            },
            None => Modification::New { key, value },
        };
        self.notify(&modification);

        previous
    }

    /// Remove `key`, returning the removed value if the key existed.
    /// Notifies the listener with `Removed`.
    pub fn remove(&self, key: &str) -> Option<FieldValue> {
        let removed = self.inner.entries.write().remove(key);

        if let Some(value) = &removed {
            self.notify(&Modification::Removed {
                key: key.to_string(),
                value: value.clone(),
            });
        }

        removed
    }

    /// Remove every entry. Bulk operation: the listener is not invoked.
    pub fn clear(&self) {
        self.inner.entries.write().clear();
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.entries.read().contains_key(key)
    }

    pub fn contains_value(&self, value: &FieldValue) -> bool {
        self.inner.entries.read().values().any(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Snapshot of the current keys
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.read().keys().cloned().collect()
    }

    /// Snapshot of the current values
    pub fn values(&self) -> Vec<FieldValue> {
        self.inner.entries.read().values().cloned().collect()
    }

    /// Snapshot of the current entries
    pub fn entries(&self) -> Vec<(String, FieldValue)> {
        self.inner
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Register the modification listener, replacing any previous one
    pub fn set_on_modified<F>(&self, listener: F)
    where
        F: Fn(&Modification) + Send + Sync + 'static,
    {
        *self.inner.on_modified.write() = Some(Box::new(listener));
    }

    /// Remove the registered modification listener, if any
    pub fn clear_on_modified(&self) {
        *self.inner.on_modified.write() = None;
    }

    fn notify(&self, modification: &Modification) {
        let listener = self.inner.on_modified.read();
        if let Some(listener) = listener.as_ref() {
            listener(modification);
        }
    }
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.entries.read().iter())
            .finish()
    }
}

impl fmt::Display for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        let formatted = entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", formatted)
    }
}
