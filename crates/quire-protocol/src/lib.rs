//! # quire-protocol
//!
//! The data model that crosses the privilege boundary between the sandboxed
//! editing surface and the trusted file service.
//!
//! Everything in this crate is plain data: no handles, no closures, nothing
//! that can reach the filesystem. Values are copied across the boundary as
//! JSON and reconstructed on the other side.
//!
//! ## Key components
//!
//! - [`Operation`] — the closed set of callable operations. An operation that
//!   is not a variant of this enum cannot be expressed, let alone invoked.
//! - [`Request`] / [`WireRequest`] — an operation plus its correlation id, and
//!   its positional-argument wire form (`{"id", "op", "args"}`).
//! - [`Response`] / [`Outcome`] — exactly one of success, failure, or
//!   user cancellation per request.
//! - [`Failure`] / [`FailureCategory`] — structured, machine-distinguishable
//!   failure payloads.
//! - [`Notification`] — the single advisory push channel (`file-changed`).
//! - [`HostMessage`] — what the trusted side writes back on a stream transport.

pub mod error;
pub mod message;
pub mod notification;
pub mod operation;
pub mod response;

pub use error::ProtocolError;
pub use message::HostMessage;
pub use notification::{FileChanged, Notification};
pub use operation::{Operation, Request, WireRequest};
pub use response::{
    DirEntry, Failure, FailureCategory, OpenedFile, Outcome, Payload, Response, SystemInfo,
};
