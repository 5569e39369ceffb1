//! Log record structure

use super::log_level::LogLevel;
use super::shared_context::{Attributes, FieldValue, SharedContext};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::sync::Arc;

/// Error object attached to a log record
pub type DynError = Arc<dyn std::error::Error + Send + Sync + 'static>;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(format!("{:?}", std::thread::current().id()));
        }
        cache.as_ref().expect("thread_id cache initialized in previous line").clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(std::thread::current().name().map(String::from));
        }
        cache.as_ref().expect("thread_name cache initialized in previous line").clone()
    })
}

/// The value handed to every sink for one logging call.
///
/// A record is built once by the router, which stamps the timestamp and the
/// calling thread at creation time. It is never mutated afterwards: a
/// pre-process callback that wants a different record derives one through
/// the `with_*` methods and returns the copy.
///
/// `context` is a live handle, not a snapshot: a sink that reads it sees
/// the context as of dispatch time, including mutations made after the
/// record was created.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub context: SharedContext,
    pub message: Option<String>,
    pub tag: Option<String>,
    pub error: Option<DynError>,
    pub attributes: Attributes,
}

impl LogRecord {
    pub(crate) fn new(
        level: LogLevel,
        context: SharedContext,
        message: Option<String>,
        tag: Option<String>,
        error: Option<DynError>,
        attributes: Attributes,
    ) -> Self {
        Self {
            level,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            timestamp: Utc::now(),
            context,
            message,
            tag,
            error,
            attributes,
        }
    }

    /// Derive a copy with a different level.
    ///
    /// The level on a transformed record is informational for sinks; the
    /// router's threshold check has already run and is not repeated.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Derive a copy with a different message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Derive a copy with the message removed
    #[must_use]
    pub fn without_message(mut self) -> Self {
        self.message = None;
        self
    }

    /// Derive a copy with a different tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Derive a copy with one attribute added or replaced
    #[must_use]
    pub fn with_attribute<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Derive a copy with one attribute removed
    #[must_use]
    pub fn without_attribute(mut self, key: &str) -> Self {
        self.attributes.remove(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(message: Option<&str>) -> LogRecord {
        LogRecord::new(
            LogLevel::Info,
            SharedContext::new(),
            message.map(String::from),
            None,
            None,
            HashMap::new(),
        )
    }

    #[test]
    fn test_record_captures_thread() {
        let record = record(Some("hello"));
        assert!(!record.thread_id.is_empty());
        assert_eq!(record.message.as_deref(), Some("hello"));
    }

    #[test]
    fn test_with_message_produces_copy() {
        let original = record(Some("before"));
        let transformed = original.clone().with_message("after");

        assert_eq!(original.message.as_deref(), Some("before"));
        assert_eq!(transformed.message.as_deref(), Some("after"));
        assert_eq!(original.timestamp, transformed.timestamp);
    }

    #[test]
    fn test_with_attribute() {
        let record = record(None)
            .with_attribute("user_id", 42)
            .with_attribute("user_id", 43);

        assert_eq!(record.attributes.get("user_id"), Some(&FieldValue::Int(43)));
        assert!(record.without_attribute("user_id").attributes.is_empty());
    }

    #[test]
    fn test_context_is_shared_by_reference() {
        let context = SharedContext::new();
        let record = LogRecord::new(
            LogLevel::Debug,
            context.clone(),
            None,
            None,
            None,
            HashMap::new(),
        );

        context.put("env", "staging");
        assert_eq!(
            record.context.get("env"),
            Some(FieldValue::String("staging".into()))
        );
    }
}
