//! Router implementation: threshold filtering and sink dispatch

use super::{
    error::Result,
    log_level::LogLevel,
    log_record::{DynError, LogRecord},
    shared_context::{Attributes, SharedContext},
    sink::{same_sink, Sink},
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Callback invoked with each record after the threshold check and before
/// sink dispatch. Returning `None` suppresses the record; returning a
/// (possibly derived) record dispatches that record instead.
pub type PreProcessCallback = Arc<dyn Fn(LogRecord) -> Option<LogRecord> + Send + Sync>;

/// An addressable logging endpoint.
///
/// A router owns a severity threshold, an ordered set of sinks and an
/// optional pre-process callback. Named routers are created and cached by
/// [`RouterRegistry`](super::registry::RouterRegistry); the registry's own
/// root router is the unnamed global one.
///
/// Configuration writes arriving through the registry's global propagation
/// path are silently ignored while `allow_global_override` is false.
/// Direct calls on the router itself are always honored.
///
/// Sink lists are replaced whole on mutation (copy-on-write), so a dispatch
/// in progress on another thread sees either the old or the new list in
/// full, never a partial one, and never holds a lock while sinks run.
pub struct Router {
    name: Option<String>,
    level: RwLock<LogLevel>,
    sinks: RwLock<Arc<Vec<Arc<dyn Sink>>>>,
    pre_process: RwLock<Option<PreProcessCallback>>,
    allow_global_override: AtomicBool,
    // The registry's current-context cell; records capture whatever context
    // is installed at emission time.
    context: Arc<RwLock<SharedContext>>,
}

impl Router {
    pub(crate) fn new(name: Option<String>, context: Arc<RwLock<SharedContext>>) -> Self {
        Self {
            name,
            level: RwLock::new(LogLevel::default()),
            sinks: RwLock::new(Arc::new(Vec::new())),
            pre_process: RwLock::new(None),
            allow_global_override: AtomicBool::new(true),
            context,
        }
    }

    /// The name this router was registered under, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn level(&self) -> LogLevel {
        *self.level.read()
    }

    /// Set the severity threshold. Direct writes are always honored; only
    /// the registry's propagation path respects `allow_global_override`.
    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    pub fn allow_global_override(&self) -> bool {
        self.allow_global_override.load(Ordering::Acquire)
    }

    pub fn set_allow_global_override(&self, allow: bool) {
        self.allow_global_override.store(allow, Ordering::Release);
    }

    /// Snapshot of the currently attached sinks, in attachment order
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().as_ref().clone()
    }

    /// Attach a sink. Idempotent: attaching an already-present instance is
    /// a no-op, keyed on instance identity rather than value equality.
    pub fn attach(&self, sink: Arc<dyn Sink>) {
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|s| same_sink(s, &sink)) {
            return;
        }
        let mut next = sinks.as_ref().clone();
        next.push(sink);
        *sinks = Arc::new(next);
    }

    /// Detach a sink. No-op when the instance is not attached.
    pub fn detach(&self, sink: &Arc<dyn Sink>) {
        let mut sinks = self.sinks.write();
        if !sinks.iter().any(|s| same_sink(s, sink)) {
            return;
        }
        let next = sinks
            .iter()
            .filter(|s| !same_sink(s, sink))
            .cloned()
            .collect();
        *sinks = Arc::new(next);
    }

    /// Drop every attached sink
    pub fn clear_all_sinks(&self) {
        *self.sinks.write() = Arc::new(Vec::new());
    }

    /// Install the pre-process callback, replacing any previous one
    pub fn set_pre_process<F>(&self, callback: F)
    where
        F: Fn(LogRecord) -> Option<LogRecord> + Send + Sync + 'static,
    {
        *self.pre_process.write() = Some(Arc::new(callback));
    }

    /// Remove the pre-process callback, if any
    pub fn clear_pre_process(&self) {
        *self.pre_process.write() = None;
    }

    pub fn has_pre_process(&self) -> bool {
        self.pre_process.read().is_some()
    }

    /// The canonical logging entry point all leveled methods funnel into.
    ///
    /// Returns `Ok(())` for calls suppressed by the threshold or by the
    /// pre-process callback. The first sink error aborts dispatch and
    /// propagates to the caller.
    pub fn log(
        &self,
        level: LogLevel,
        message: Option<String>,
        error: Option<DynError>,
        attributes: Attributes,
    ) -> Result<()> {
        if !self.level().permits(level) {
            return Ok(());
        }

        let record = LogRecord::new(
            level,
            self.current_context(),
            message,
            self.tag(),
            error,
            attributes,
        );

        // Clone the callback out of the lock so it can reconfigure this
        // router without deadlocking.
        let callback = self.pre_process.read().clone();
        let record = match callback {
            Some(callback) => match callback(record) {
                Some(record) => record,
                None => return Ok(()),
            },
            None => record,
        };

        let sinks = Arc::clone(&self.sinks.read());
        for sink in sinks.iter() {
            sink.handle(&record)?;
        }
        Ok(())
    }

    fn tag(&self) -> Option<String> {
        match &self.name {
            Some(name) if !name.trim().is_empty() => Some(name.clone()),
            _ => None,
        }
    }

    fn current_context(&self) -> SharedContext {
        self.context.read().clone()
    }

    pub(crate) fn pre_process_callback(&self) -> Option<PreProcessCallback> {
        self.pre_process.read().clone()
    }

    pub(crate) fn replace_pre_process(&self, callback: Option<PreProcessCallback>) {
        *self.pre_process.write() = callback;
    }

    pub(crate) fn replace_sinks(&self, sinks: Vec<Arc<dyn Sink>>) {
        *self.sinks.write() = Arc::new(sinks);
    }

    // Global propagation entry points, used only by the registry. Each one
    // is a silent no-op while the router has opted out of overrides.

    pub(crate) fn apply_global_level(&self, level: LogLevel) {
        if !self.allow_global_override() {
            return;
        }
        *self.level.write() = level;
    }

    pub(crate) fn apply_global_pre_process(&self, callback: Option<PreProcessCallback>) {
        if !self.allow_global_override() {
            return;
        }
        *self.pre_process.write() = callback;
    }

    pub(crate) fn apply_global_plant(&self, sink: &Arc<dyn Sink>) {
        if !self.allow_global_override() {
            return;
        }
        self.attach(Arc::clone(sink));
    }

    pub(crate) fn apply_global_cut(&self, sink: &Arc<dyn Sink>) {
        if !self.allow_global_override() {
            return;
        }
        self.detach(sink);
    }

    // Leveled convenience API. Three call shapes per level, all thin
    // wrappers over `log`.

    #[inline]
    pub fn verbose(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Verbose, Some(message.into()), None, Attributes::new())
    }

    #[inline]
    pub fn verbose_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.log(LogLevel::Verbose, Some(message.into()), None, attributes)
    }

    #[inline]
    pub fn verbose_err<E>(
        &self,
        message: impl Into<String>,
        error: E,
        attributes: Attributes,
    ) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(
            LogLevel::Verbose,
            Some(message.into()),
            Some(Arc::new(error)),
            attributes,
        )
    }

    #[inline]
    pub fn verbose_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Verbose, None, Some(Arc::new(error)), attributes)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, Some(message.into()), None, Attributes::new())
    }

    #[inline]
    pub fn debug_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.log(LogLevel::Debug, Some(message.into()), None, attributes)
    }

    #[inline]
    pub fn debug_err<E>(
        &self,
        message: impl Into<String>,
        error: E,
        attributes: Attributes,
    ) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(
            LogLevel::Debug,
            Some(message.into()),
            Some(Arc::new(error)),
            attributes,
        )
    }

    #[inline]
    pub fn debug_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Debug, None, Some(Arc::new(error)), attributes)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, Some(message.into()), None, Attributes::new())
    }

    #[inline]
    pub fn info_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.log(LogLevel::Info, Some(message.into()), None, attributes)
    }

    #[inline]
    pub fn info_err<E>(
        &self,
        message: impl Into<String>,
        error: E,
        attributes: Attributes,
    ) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(
            LogLevel::Info,
            Some(message.into()),
            Some(Arc::new(error)),
            attributes,
        )
    }

    #[inline]
    pub fn info_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Info, None, Some(Arc::new(error)), attributes)
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, Some(message.into()), None, Attributes::new())
    }

    #[inline]
    pub fn warn_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.log(LogLevel::Warn, Some(message.into()), None, attributes)
    }

    #[inline]
    pub fn warn_err<E>(
        &self,
        message: impl Into<String>,
        error: E,
        attributes: Attributes,
    ) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(
            LogLevel::Warn,
            Some(message.into()),
            Some(Arc::new(error)),
            attributes,
        )
    }

    #[inline]
    pub fn warn_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Warn, None, Some(Arc::new(error)), attributes)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, Some(message.into()), None, Attributes::new())
    }

    #[inline]
    pub fn error_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.log(LogLevel::Error, Some(message.into()), None, attributes)
    }

    #[inline]
    pub fn error_err<E>(
        &self,
        message: impl Into<String>,
        error: E,
        attributes: Attributes,
    ) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(
            LogLevel::Error,
            Some(message.into()),
            Some(Arc::new(error)),
            attributes,
        )
    }

    #[inline]
    pub fn error_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Error, None, Some(Arc::new(error)), attributes)
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Fatal, Some(message.into()), None, Attributes::new())
    }

    #[inline]
    pub fn fatal_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.log(LogLevel::Fatal, Some(message.into()), None, attributes)
    }

    #[inline]
    pub fn fatal_err<E>(
        &self,
        message: impl Into<String>,
        error: E,
        attributes: Attributes,
    ) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(
            LogLevel::Fatal,
            Some(message.into()),
            Some(Arc::new(error)),
            attributes,
        )
    }

    #[inline]
    pub fn fatal_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Fatal, None, Some(Arc::new(error)), attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared_context::FieldValue;
    use parking_lot::Mutex;

    struct RecordingSink {
        records: Mutex<Vec<LogRecord>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
            })
        }

        fn records(&self) -> Vec<LogRecord> {
            self.records.lock().clone()
        }
    }

    impl Sink for RecordingSink {
        fn handle(&self, record: &LogRecord) -> Result<()> {
            self.records.lock().push(record.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn router(name: Option<&str>) -> Router {
        Router::new(
            name.map(String::from),
            Arc::new(RwLock::new(SharedContext::new())),
        )
    }

    #[test]
    fn test_dispatch_reaches_sink() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());

        router.warn("disk low").unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Warn);
        assert_eq!(records[0].message.as_deref(), Some("disk low"));
    }

    #[test]
    fn test_threshold_filters_more_verbose_calls() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());
        router.set_level(LogLevel::Info);

        router.warn("shown").unwrap();
        router.debug("not shown").unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message.as_deref(), Some("shown"));
    }

    #[test]
    fn test_off_threshold_suppresses_fatal() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());
        router.set_level(LogLevel::Off);

        router.fatal("unrecoverable").unwrap();

        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());
        router.attach(sink.clone());

        router.info("once").unwrap();

        assert_eq!(router.sinks().len(), 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_detach_and_clear() {
        let router = router(None);
        let first = RecordingSink::new();
        let second = RecordingSink::new();
        router.attach(first.clone());
        router.attach(second.clone());

        let as_sink: Arc<dyn Sink> = first.clone();
        router.detach(&as_sink);
        assert_eq!(router.sinks().len(), 1);

        router.detach(&as_sink);
        assert_eq!(router.sinks().len(), 1);

        router.clear_all_sinks();
        assert!(router.sinks().is_empty());
    }

    #[test]
    fn test_dispatch_in_attachment_order() {
        struct OrderSink {
            id: usize,
            order: Arc<Mutex<Vec<usize>>>,
        }
        impl Sink for OrderSink {
            fn handle(&self, _record: &LogRecord) -> Result<()> {
                self.order.lock().push(self.id);
                Ok(())
            }
            fn name(&self) -> &str {
                "order"
            }
        }

        let router = router(None);
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            router.attach(Arc::new(OrderSink {
                id,
                order: Arc::clone(&order),
            }));
        }

        router.info("ordered").unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_pre_process_transforms_record() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());
        router.set_pre_process(|record| Some(record.with_attribute("redacted", true)));

        router.info("payload").unwrap();

        let records = sink.records();
        assert_eq!(
            records[0].attributes.get("redacted"),
            Some(&FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_pre_process_suppresses_record() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());
        router.set_pre_process(|_| None);

        assert!(router.error("dropped").is_ok());
        assert!(sink.records().is_empty());

        router.clear_pre_process();
        router.error("kept").unwrap();
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_sink_error_propagates() {
        struct FailingSink;
        impl Sink for FailingSink {
            fn handle(&self, _record: &LogRecord) -> Result<()> {
                Err(crate::core::error::RouterError::sink("failing", "boom"))
            }
            fn name(&self) -> &str {
                "failing"
            }
        }

        let router = router(None);
        let tail = RecordingSink::new();
        router.attach(Arc::new(FailingSink));
        router.attach(tail.clone());

        assert!(router.info("will fail").is_err());
        // Dispatch aborts at the failing sink; later sinks see nothing.
        assert!(tail.records().is_empty());
    }

    #[test]
    fn test_tag_uses_router_name() {
        let named = router(Some("api.gateway"));
        let sink = RecordingSink::new();
        named.attach(sink.clone());
        named.info("tagged").unwrap();
        assert_eq!(sink.records()[0].tag.as_deref(), Some("api.gateway"));

        let blank = router(Some("  "));
        let sink = RecordingSink::new();
        blank.attach(sink.clone());
        blank.info("untagged").unwrap();
        assert_eq!(sink.records()[0].tag, None);
    }

    #[test]
    fn test_error_only_call_is_dispatched() {
        let router = router(None);
        let sink = RecordingSink::new();
        router.attach(sink.clone());

        let error = std::io::Error::new(std::io::ErrorKind::Other, "device gone");
        router.error_err_only(error, Attributes::new()).unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, None);
        assert_eq!(
            records[0].error.as_ref().map(|e| e.to_string()),
            Some("device gone".to_string())
        );
    }

    #[test]
    fn test_global_writes_respect_override_flag() {
        let router = router(Some("locked"));
        router.set_allow_global_override(false);

        router.apply_global_level(LogLevel::Error);
        assert_eq!(router.level(), LogLevel::Verbose);

        let sink: Arc<dyn Sink> = RecordingSink::new();
        router.apply_global_plant(&sink);
        assert!(router.sinks().is_empty());

        // Direct configuration is always honored.
        router.set_level(LogLevel::Error);
        assert_eq!(router.level(), LogLevel::Error);
    }
}
