//! Core routing types and traits

pub mod config;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod registry;
pub mod router;
pub mod shared_context;
pub mod sink;
pub mod timestamp;

pub use config::RouterConfig;
pub use error::{Result, RouterError};
pub use log_level::LogLevel;
pub use log_record::{DynError, LogRecord};
pub use registry::{
    get_router, get_router_for, get_router_for_with, get_router_with, global, RouterRegistry,
};
pub use router::{PreProcessCallback, Router};
pub use shared_context::{
    Attributes, FieldValue, Modification, ModificationListener, SharedContext,
};
pub use sink::Sink;
pub use timestamp::TimestampFormat;
