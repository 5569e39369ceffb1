//! # Log Router System
//!
//! A pluggable log routing facade: callers emit leveled log records through
//! named routers, and each router fans the record out to its attached sinks
//! after a severity-threshold check and an optional pre-process hook.
//!
//! ## Features
//!
//! - **Named Routers**: A process-wide registry lazily creates one router
//!   per name, seeded from and kept in sync with the global configuration
//! - **Pluggable Sinks**: Records are dispatched to any number of `Sink`
//!   implementations, in attachment order
//! - **Shared Context**: A concurrent key-value map attached to every
//!   record, so sinks can render ambient diagnostic data
//! - **Thread Safe**: Copy-on-write sink lists and internally synchronized
//!   state; no caller-side locking
//!
//! Everything runs on the caller's thread: there are no worker threads, no
//! queues, and no buffering. A slow or failing sink is the caller's to see.

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::sinks::{ConsoleFormat, ConsoleSink};
    pub use crate::core::{
        get_router, get_router_for, get_router_for_with, get_router_with, global, Attributes,
        DynError, FieldValue, LogLevel, LogRecord, Modification, PreProcessCallback, Result,
        Router, RouterConfig, RouterError, RouterRegistry, SharedContext, Sink, TimestampFormat,
    };
}

#[cfg(feature = "console")]
pub use sinks::{ConsoleFormat, ConsoleSink};
pub use core::{
    get_router, get_router_for, get_router_for_with, get_router_with, global, Attributes, DynError,
    FieldValue, LogLevel, LogRecord, Modification, ModificationListener, PreProcessCallback,
    Result, Router, RouterConfig, RouterError, RouterRegistry, SharedContext, Sink,
    TimestampFormat,
};
