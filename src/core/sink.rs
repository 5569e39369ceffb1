//! Sink trait for log record consumers

use super::{error::Result, log_record::LogRecord};
use std::sync::Arc;

/// A consumer of finalized log records.
///
/// Sinks are shared: the same instance can be attached to any number of
/// routers, so `handle` takes `&self` and implementations manage their own
/// interior state. Dispatch is synchronous on the logging caller's thread,
/// and the router does not catch failures: an error (or panic) raised
/// here propagates straight to the caller of the logging method.
/// Implementations that need isolation must wrap themselves.
pub trait Sink: Send + Sync {
    fn handle(&self, record: &LogRecord) -> Result<()>;
    fn name(&self) -> &str;
}

/// Identity comparison for attached sinks.
///
/// Sink lists have set semantics keyed on the instance, not on value
/// equality: two sinks are the same exactly when they are the same
/// allocation.
pub(crate) fn same_sink(a: &Arc<dyn Sink>, b: &Arc<dyn Sink>) -> bool {
    // Compare data pointers only; comparing fat pointers with Arc::ptr_eq
    // can differ per vtable instantiation.
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
