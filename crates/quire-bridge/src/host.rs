// host.rs — BridgeHost: the trusted end of every transport.
//
// Transports hand decoded (or still-raw) requests to the host; the host runs
// each one on tokio's blocking pool, so a slow picker or a large read never
// stalls another request. The host also owns the broadcast channel for
// file-changed notifications and announces every successful write.

use std::sync::Arc;

use tokio::sync::broadcast;

use quire_fs::FileService;
use quire_protocol::{
    Failure, FailureCategory, FileChanged, Operation, Outcome, Request, Response, WireRequest,
};

/// Buffered notifications per subscriber before the slowest one lags.
const NOTIFY_CAPACITY: usize = 64;

pub struct BridgeHost {
    service: Arc<FileService>,
    changes: broadcast::Sender<FileChanged>,
}

impl BridgeHost {
    pub fn new(service: FileService) -> Self {
        let (changes, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            service: Arc::new(service),
            changes,
        }
    }

    /// Execute a validated request on a blocking worker.
    ///
    /// Always yields a response for `request.request_id`; a worker that
    /// panics is reported as an `internal` failure.
    pub async fn dispatch(&self, request: Request) -> Response {
        let request_id = request.request_id;
        let written = match &request.operation {
            Operation::WriteFile { path, .. } => Some(path.to_string_lossy().into_owned()),
            _ => None,
        };

        let service = Arc::clone(&self.service);
        let response = match tokio::task::spawn_blocking(move || service.handle(&request)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%request_id, "file service worker failed: {}", e);
                Response::failure(
                    request_id,
                    Failure::new(FailureCategory::Internal, e.to_string())
                        .with_message("The file service failed unexpectedly"),
                )
            }
        };

        if let (Some(path), Outcome::Success(_)) = (written, &response.outcome) {
            self.notify(FileChanged::now(path));
        }
        response
    }

    /// Validate a wire request, then dispatch it.
    ///
    /// A name outside the closed set, or bad arguments, is answered with a
    /// `protocol` failure under the caller's id. Nothing reaches the file
    /// service in that case.
    pub async fn dispatch_wire(&self, wire: WireRequest) -> Response {
        match wire.decode() {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                tracing::error!(request_id = %wire.id, op = %wire.op, "rejected request: {}", e);
                Response::failure(wire.id, Failure::from(&e))
            }
        }
    }

    /// Announce a file change to every subscriber. Having none is fine.
    pub fn notify(&self, change: FileChanged) {
        tracing::debug!("file changed: {}", change.path);
        let _ = self.changes.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileChanged> {
        self.changes.subscribe()
    }

    pub(crate) fn notifier(&self) -> broadcast::Sender<FileChanged> {
        self.changes.clone()
    }
}
