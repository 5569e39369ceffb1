//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. Each expands to
//! a call on the given router (or registry) and yields the dispatch
//! `Result`, so sink failures stay visible at the call site.
//!
//! # Examples
//!
//! ```
//! use log_router_system::prelude::*;
//! use log_router_system::{attributes, info, warn};
//!
//! let registry = RouterRegistry::new();
//! let router = registry.get_router("server");
//!
//! info!(router, "Server listening on port {}", 8080).unwrap();
//! warn!(router, "Retry attempt {} of {}", 3, 5).unwrap();
//!
//! router
//!     .info_with("request done", attributes! { "status" => 200, "cached" => false })
//!     .unwrap();
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use log_router_system::prelude::*;
/// # let registry = RouterRegistry::new();
/// # let router = registry.get_router("app");
/// use log_router_system::log;
/// log!(router, LogLevel::Info, "Simple message").unwrap();
/// log!(router, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($router:expr, $level:expr, $($arg:tt)+) => {
        $router.log($level, Some(format!($($arg)+)), None, $crate::Attributes::new())
    };
}

/// Log a verbose-level message.
#[macro_export]
macro_rules! verbose {
    ($router:expr, $($arg:tt)+) => {
        $crate::log!($router, $crate::LogLevel::Verbose, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($router:expr, $($arg:tt)+) => {
        $crate::log!($router, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($router:expr, $($arg:tt)+) => {
        $crate::log!($router, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($router:expr, $($arg:tt)+) => {
        $crate::log!($router, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($router:expr, $($arg:tt)+) => {
        $crate::log!($router, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($router:expr, $($arg:tt)+) => {
        $crate::log!($router, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Build an attribute map from `key => value` pairs.
///
/// Keys convert with `String::from`, values with
/// [`FieldValue::from`](crate::FieldValue).
///
/// # Examples
///
/// ```
/// use log_router_system::attributes;
///
/// let attrs = attributes! { "user_id" => 42, "action" => "login" };
/// assert_eq!(attrs.len(), 2);
///
/// let empty = attributes! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Attributes::new();
        $(
            map.insert(String::from($key), $crate::FieldValue::from($value));
        )+
        map
    }};
}
