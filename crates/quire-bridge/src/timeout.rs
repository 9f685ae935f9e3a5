// timeout.rs — Caller-side watchdog.
//
// The bridge has no programmatic cancellation: once a request leaves, the
// trusted side runs it to completion. TimeoutBridge only stops *waiting*.
// Operations that show a picker wait on a person and are never timed.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use quire_protocol::{FileChanged, Operation, Response};

use crate::bridge::FileBridge;
use crate::error::BridgeError;

/// Wraps a bridge so that every call not waiting on a picker gives up
/// after `limit`.
pub struct TimeoutBridge<B> {
    inner: B,
    limit: Duration,
}

impl<B: FileBridge> TimeoutBridge<B> {
    pub fn new(inner: B, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

#[async_trait]
impl<B: FileBridge> FileBridge for TimeoutBridge<B> {
    async fn send(&self, operation: Operation) -> Result<Response, BridgeError> {
        if operation.uses_picker() {
            return self.inner.send(operation).await;
        }
        let channel = operation.channel();
        match tokio::time::timeout(self.limit, self.inner.send(operation)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", channel, self.limit);
                Err(BridgeError::TimedOut {
                    operation: channel,
                    after: self.limit,
                })
            }
        }
    }

    fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged> {
        self.inner.subscribe_file_changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_protocol::Payload;

    /// Never answers until told the time is up.
    struct Stalled {
        changes: broadcast::Sender<FileChanged>,
    }

    #[async_trait]
    impl FileBridge for Stalled {
        async fn send(&self, _operation: Operation) -> Result<Response, BridgeError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Response::success(uuid::Uuid::new_v4(), Payload::Written))
        }

        fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged> {
            self.changes.subscribe()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let (changes, _) = broadcast::channel(1);
        let bridge = TimeoutBridge::new(Stalled { changes }, Duration::from_millis(250));
        let err = bridge.get_system_info().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::TimedOut {
                operation: "get-system-info",
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn picker_calls_wait_for_the_user() {
        let (changes, _) = broadcast::channel(1);
        let bridge = TimeoutBridge::new(Stalled { changes }, Duration::from_millis(250));
        let response = bridge.open_file_dialog().await.unwrap();
        assert!(response.outcome.is_success());
    }
}
