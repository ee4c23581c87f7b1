//! Tool-level error type.

use thiserror::Error;

/// Errors raised while invoking a tool.
///
/// A gateway returning `Err` is the equivalent of a thrown exception: the
/// engine records the node as failed with an "execution exception" message.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required parameter was not supplied.
    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    /// A parameter was supplied but could not be interpreted.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Filesystem failure inside a file tool.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure reported by the tool itself.
    #[error("{0}")]
    Execution(String),
}
