//! Error types for the log router

pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors surfaced by sink dispatch.
///
/// The router itself never fails a call for policy reasons: a call below
/// the threshold and a record suppressed by the pre-process callback are
/// silent no-ops, as is a global configuration write against a router that
/// has opted out of overrides. The only fallible path is a sink's `handle`,
/// whose error propagates unchanged to the logging caller.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// IO error raised while a sink writes to its destination
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error from a structured sink
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Failure reported by a named sink
    #[error("Sink '{sink}' failed: {message}")]
    SinkError { sink: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl RouterError {
    /// Create a sink failure error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        RouterError::SinkError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RouterError::Other(msg.into())
    }
}
