// error.rs — Error types for the session controller.

use quire_bridge::BridgeError;
use quire_protocol::Failure;
use thiserror::Error;

/// Why a session action did not complete.
///
/// Cancellation and a declined confirmation are not errors; they come back
/// as [`crate::ActionOutcome`] values.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An open or save is already in flight for this session.
    #[error("session busy: another open or save is in progress")]
    Busy,

    /// Save was requested for a document that has never been saved.
    #[error("no active file path; use save-as")]
    NoActivePath,

    /// The trusted side ran the operation and it failed.
    #[error("{0}")]
    Failed(Failure),

    /// The trusted side rejected the request itself, or answered with the
    /// wrong kind of payload. Indicates a bug on one side of the bridge.
    #[error("protocol violation: {0}")]
    Protocol(Failure),

    /// The bridge could not carry the request.
    #[error("transport error: {0}")]
    Transport(#[from] BridgeError),
}

impl SessionError {
    /// True for precondition failures that never reached the bridge.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SessionError::Busy | SessionError::NoActivePath)
    }
}
