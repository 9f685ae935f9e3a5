// error.rs — Error types for the transport bridge.
//
// These describe the transport failing, not the operation. An operation
// that ran and failed on the host comes back as a normal Response with a
// Failure outcome.

use std::time::Duration;

use quire_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while carrying a request across the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The other side went away before answering.
    #[error("bridge connection lost")]
    Lost,

    /// No response arrived within the caller's limit. The operation may
    /// still have executed on the trusted side.
    #[error("'{operation}' timed out after {after:?} (it may still have executed)")]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },

    /// A message could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] ProtocolError),

    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Codec(ProtocolError::Serialization(e))
    }
}
