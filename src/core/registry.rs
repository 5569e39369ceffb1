//! Router registry: the global router and the named-router cache

use super::{
    config::RouterConfig,
    error::Result,
    log_level::LogLevel,
    log_record::DynError,
    router::{PreProcessCallback, Router},
    shared_context::{Attributes, SharedContext},
    sink::Sink,
};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// The process-wide router factory and cache.
///
/// The registry is itself the global router: it exposes the full leveled
/// logging API backed by its own root router, and it lazily creates named
/// routers seeded from the root's current configuration. Configuration
/// changes made on the registry propagate to every cached router that has
/// not opted out via `allow_global_override`.
///
/// Most code uses the shared instance through [`global`] or the top-level
/// [`get_router`] functions. Tests should construct their own registry with
/// [`RouterRegistry::new`] instead of relying on process-global state.
pub struct RouterRegistry {
    root: Arc<Router>,
    routers: Mutex<HashMap<String, Arc<Router>>>,
    context: Arc<RwLock<SharedContext>>,
}

impl RouterRegistry {
    /// Create a fresh registry with an empty cache and a new shared context
    pub fn new() -> Self {
        let context = Arc::new(RwLock::new(SharedContext::new()));
        Self {
            root: Arc::new(Router::new(None, Arc::clone(&context))),
            routers: Mutex::new(HashMap::new()),
            context,
        }
    }

    /// Get or create the router registered under `name`.
    ///
    /// The same name always yields the same instance until [`deforest`]
    /// clears the cache. A new router is seeded from the registry's current
    /// level, pre-process callback and sink list, with overrides allowed.
    /// The empty name addresses a cached alias of the global configuration.
    pub fn get_router(&self, name: impl Into<String>) -> Arc<Router> {
        self.get_router_with(name, |_| {})
    }

    /// [`get_router`] with a configuration step.
    ///
    /// The `configure` closure receives a [`RouterConfig`] built from the
    /// router's current state; the mutated config is merged back per the
    /// override rules documented on [`RouterConfig`].
    pub fn get_router_with<F>(&self, name: impl Into<String>, configure: F) -> Arc<Router>
    where
        F: FnOnce(&mut RouterConfig),
    {
        let name = name.into();
        let router = {
            let mut routers = self.routers.lock();
            let entry = routers.entry(name.clone()).or_insert_with(|| {
                let router = Router::new(Some(name), Arc::clone(&self.context));
                router.set_level(self.root.level());
                router.replace_pre_process(self.root.pre_process_callback());
                for sink in self.root.sinks() {
                    router.attach(sink);
                }
                Arc::new(router)
            });
            Arc::clone(entry)
        };

        let mut config = RouterConfig::from_router(&router);
        configure(&mut config);
        config.apply_to(&router);

        router
    }

    /// Get or create a router named after the type `T`'s qualified name
    pub fn get_router_for<T: ?Sized>(&self) -> Arc<Router> {
        self.get_router(std::any::type_name::<T>())
    }

    /// [`get_router_for`] with a configuration step
    pub fn get_router_for_with<T: ?Sized, F>(&self, configure: F) -> Arc<Router>
    where
        F: FnOnce(&mut RouterConfig),
    {
        self.get_router_with(std::any::type_name::<T>(), configure)
    }

    /// The global severity threshold
    pub fn level(&self) -> LogLevel {
        self.root.level()
    }

    /// Set the global threshold and propagate it by direct assignment to
    /// every cached router that allows overrides.
    pub fn set_level(&self, level: LogLevel) {
        self.root.set_level(level);
        for router in self.cached_routers() {
            router.apply_global_level(level);
        }
    }

    /// Install the global pre-process callback and propagate it to every
    /// cached router that allows overrides.
    pub fn set_pre_process<F>(&self, callback: F)
    where
        F: Fn(super::log_record::LogRecord) -> Option<super::log_record::LogRecord>
            + Send
            + Sync
            + 'static,
    {
        let callback: PreProcessCallback = Arc::new(callback);
        self.root.replace_pre_process(Some(Arc::clone(&callback)));
        for router in self.cached_routers() {
            router.apply_global_pre_process(Some(Arc::clone(&callback)));
        }
    }

    /// Remove the global pre-process callback, propagating the removal
    pub fn clear_pre_process(&self) {
        self.root.replace_pre_process(None);
        for router in self.cached_routers() {
            router.apply_global_pre_process(None);
        }
    }

    /// Attach a sink to the global router and to every cached router that
    /// allows overrides. Idempotent everywhere (set semantics).
    pub fn plant(&self, sink: Arc<dyn Sink>) {
        self.root.attach(Arc::clone(&sink));
        for router in self.cached_routers() {
            router.apply_global_plant(&sink);
        }
    }

    /// Detach a sink from the global router and from every cached router
    /// that allows overrides. No-op where the sink is absent.
    pub fn cut(&self, sink: &Arc<dyn Sink>) {
        self.root.detach(sink);
        for router in self.cached_routers() {
            router.apply_global_cut(sink);
        }
    }

    /// Snapshot of the global router's own sinks
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.root.sinks()
    }

    /// Empty the global sink list and discard every cached named router.
    ///
    /// Routers returned before this call become stale: they keep working in
    /// isolation, but the registry no longer propagates anything to them,
    /// and their names resolve to freshly seeded instances afterwards.
    pub fn deforest(&self) {
        self.root.clear_all_sinks();
        self.routers.lock().clear();
    }

    /// The shared context attached to all future records
    pub fn context(&self) -> SharedContext {
        self.context.read().clone()
    }

    /// Replace the shared context for all future records. Records already
    /// dispatched keep the handle they were created with.
    pub fn change_context(&self, new_context: SharedContext) {
        *self.context.write() = new_context;
    }

    fn cached_routers(&self) -> Vec<Arc<Router>> {
        self.routers.lock().values().cloned().collect()
    }

    // The registry's own logging surface, delegating to the root router.

    pub fn log(
        &self,
        level: LogLevel,
        message: Option<String>,
        error: Option<DynError>,
        attributes: Attributes,
    ) -> Result<()> {
        self.root.log(level, message, error, attributes)
    }

    #[inline]
    pub fn verbose(&self, message: impl Into<String>) -> Result<()> {
        self.root.verbose(message)
    }

    #[inline]
    pub fn verbose_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.root.verbose_with(message, attributes)
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
        self.root.verbose_err(message, error, attributes)
    }

    #[inline]
    pub fn verbose_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.root.verbose_err_only(error, attributes)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.root.debug(message)
    }

    #[inline]
    pub fn debug_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.root.debug_with(message, attributes)
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
        self.root.debug_err(message, error, attributes)
    }

    #[inline]
    pub fn debug_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.root.debug_err_only(error, attributes)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.root.info(message)
    }

    #[inline]
    pub fn info_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.root.info_with(message, attributes)
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
        self.root.info_err(message, error, attributes)
    }

    #[inline]
    pub fn info_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.root.info_err_only(error, attributes)
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.root.warn(message)
    }

    #[inline]
    pub fn warn_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.root.warn_with(message, attributes)
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
        self.root.warn_err(message, error, attributes)
    }

    #[inline]
    pub fn warn_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.root.warn_err_only(error, attributes)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.root.error(message)
    }

    #[inline]
    pub fn error_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.root.error_with(message, attributes)
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
        self.root.error_err(message, error, attributes)
    }

    #[inline]
    pub fn error_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.root.error_err_only(error, attributes)
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) -> Result<()> {
        self.root.fatal(message)
    }

    #[inline]
    pub fn fatal_with(&self, message: impl Into<String>, attributes: Attributes) -> Result<()> {
        self.root.fatal_with(message, attributes)
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
        self.root.fatal_err(message, error, attributes)
    }

    #[inline]
    pub fn fatal_err_only<E>(&self, error: E, attributes: Attributes) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.root.fatal_err_only(error, attributes)
    }
}

impl Default for RouterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<RouterRegistry> = Lazy::new(RouterRegistry::new);

/// The shared process-wide registry
pub fn global() -> &'static RouterRegistry {
    &GLOBAL
}

/// Get or create a named router on the shared registry
pub fn get_router(name: impl Into<String>) -> Arc<Router> {
    GLOBAL.get_router(name)
}

/// Get or create a named router on the shared registry, with configuration
pub fn get_router_with<F>(name: impl Into<String>, configure: F) -> Arc<Router>
where
    F: FnOnce(&mut RouterConfig),
{
    GLOBAL.get_router_with(name, configure)
}

/// Get or create a router named after `T` on the shared registry
pub fn get_router_for<T: ?Sized>() -> Arc<Router> {
    GLOBAL.get_router_for::<T>()
}

/// Get or create a router named after `T` on the shared registry, with
/// configuration
pub fn get_router_for_with<T: ?Sized, F>(configure: F) -> Arc<Router>
where
    F: FnOnce(&mut RouterConfig),
{
    GLOBAL.get_router_for_with::<T, F>(configure)
}
