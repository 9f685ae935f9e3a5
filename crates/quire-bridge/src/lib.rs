//! # quire-bridge
//!
//! The sole crossing point between the sandboxed editing surface and the
//! trusted file service.
//!
//! The surface only ever holds a [`FileBridge`]: one method per operation
//! of the closed set, plus a subscription to advisory file-changed
//! notifications. Nothing else about the host is reachable through it.
//! Arguments are owned values copied across the boundary, and each call
//! resolves to exactly one [`quire_protocol::Response`] (or a
//! [`BridgeError`] if the transport itself broke).
//!
//! ## Key components
//!
//! - [`FileBridge`] — the client-side capability surface.
//! - [`BridgeHost`] — trusted side; runs each request on a blocking worker.
//! - [`channel`] / [`ChannelClient`] — in-process transport over tokio channels.
//! - [`serve_stream`] / [`StreamClient`] — line-delimited JSON over any
//!   `AsyncRead`/`AsyncWrite` (stdio for `quire serve`).
//! - [`TimeoutBridge`] — caller-side watchdog for bounded latency.

pub mod bridge;
pub mod channel;
pub mod error;
pub mod host;
pub mod stream;
pub mod timeout;

pub use bridge::FileBridge;
pub use channel::{channel, ChannelClient};
pub use error::BridgeError;
pub use host::BridgeHost;
pub use stream::{serve_stream, StreamClient};
pub use timeout::TimeoutBridge;
