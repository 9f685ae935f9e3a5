// error.rs — Error types for encoding and decoding bridge messages.

use thiserror::Error;

/// Errors raised while turning wire data into protocol values (or back).
///
/// These are caller bugs or corrupted streams, never filesystem problems:
/// filesystem problems travel inside a [`crate::Failure`] payload.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The requested operation name is not part of the closed operation set.
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// The operation was called with the wrong number of positional arguments.
    #[error("operation '{operation}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A positional argument had the wrong JSON type.
    #[error("argument {index} of '{operation}' must be a string")]
    ArgumentType {
        operation: &'static str,
        index: usize,
    },

    /// A response violated the success/failure/cancelled exclusivity rules.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A line on the wire was neither a response nor a notification.
    #[error("unrecognized message: {0}")]
    UnrecognizedMessage(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
