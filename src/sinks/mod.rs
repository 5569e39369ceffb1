//! Bundled convenience sinks
//!
//! The core dispatches to the [`Sink`](crate::core::Sink) contract and is
//! agnostic about rendering; this module ships one ready-made console
//! implementation for applications that just want output.

#[cfg(feature = "console")]
pub mod console;

#[cfg(feature = "console")]
pub use console::{ConsoleFormat, ConsoleSink};
