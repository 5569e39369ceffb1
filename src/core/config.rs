//! Mutable router configuration applied through the registry

use super::{
    log_level::LogLevel,
    log_record::LogRecord,
    router::{PreProcessCallback, Router},
    sink::{same_sink, Sink},
};
use std::sync::Arc;

/// Snapshot of a router's configuration, handed to the `configure` closure
/// of [`RouterRegistry::get_router_with`](super::registry::RouterRegistry::get_router_with).
///
/// The closure mutates this value; the registry then merges it back into
/// the router. `level`, `pre_process` and the sink list are applied only
/// when the router allowed overrides before the update (or the config
/// disables them now, locking the router down with these settings in one
/// step). The `allow_global_override` flag itself is always applied.
pub struct RouterConfig {
    pub level: LogLevel,
    pub pre_process: Option<PreProcessCallback>,
    pub allow_global_override: bool,
    sinks: Vec<Arc<dyn Sink>>,
}

impl RouterConfig {
    pub(crate) fn from_router(router: &Router) -> Self {
        Self {
            level: router.level(),
            pre_process: router.pre_process_callback(),
            allow_global_override: router.allow_global_override(),
            sinks: router.sinks(),
        }
    }

    /// Add a sink to the configured list. Set semantics: adding an
    /// already-present instance is a no-op.
    pub fn plant(&mut self, sink: Arc<dyn Sink>) {
        if self.sinks.iter().any(|s| same_sink(s, &sink)) {
            return;
        }
        self.sinks.push(sink);
    }

    /// Remove a sink from the configured list. No-op when absent.
    pub fn cut(&mut self, sink: &Arc<dyn Sink>) {
        self.sinks.retain(|s| !same_sink(s, sink));
    }

    /// Drop every sink from the configured list
    pub fn clear_sinks(&mut self) {
        self.sinks.clear();
    }

    /// The currently configured sinks, in order
    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    /// Install a pre-process callback on the configuration
    pub fn set_pre_process<F>(&mut self, callback: F)
    where
        F: Fn(LogRecord) -> Option<LogRecord> + Send + Sync + 'static,
    {
        self.pre_process = Some(Arc::new(callback));
    }

    pub(crate) fn apply_to(self, router: &Router) {
        let allowed_before = router.allow_global_override();
        router.set_allow_global_override(self.allow_global_override);
        if allowed_before || !self.allow_global_override {
            router.set_level(self.level);
            router.replace_pre_process(self.pre_process);
            router.replace_sinks(self.sinks);
        }
    }
}
