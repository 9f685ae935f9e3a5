// channel.rs — In-process transport.
//
// The client and host live in the same process but share nothing except a
// request queue: each request travels with its own oneshot reply slot, and
// the host answers into that slot exactly once. When every client is
// dropped the host task ends.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use quire_protocol::{FileChanged, Operation, Request, Response};

use crate::bridge::FileBridge;
use crate::error::BridgeError;
use crate::host::BridgeHost;

/// Queued requests before `send` waits for the host to catch up.
const QUEUE_DEPTH: usize = 32;

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Client half of the in-process transport. Cheap to clone.
#[derive(Clone)]
pub struct ChannelClient {
    requests: mpsc::Sender<Envelope>,
    changes: broadcast::Sender<FileChanged>,
}

/// Start a host task serving `host` and return a client connected to it.
pub fn channel(host: Arc<BridgeHost>) -> (ChannelClient, JoinHandle<()>) {
    let (requests, mut inbox) = mpsc::channel::<Envelope>(QUEUE_DEPTH);
    let changes = host.notifier();

    let task = tokio::spawn(async move {
        while let Some(Envelope { request, reply }) = inbox.recv().await {
            let host = Arc::clone(&host);
            tokio::spawn(async move {
                let response = host.dispatch(request).await;
                if reply.send(response).is_err() {
                    tracing::debug!("caller dropped before the response arrived");
                }
            });
        }
        tracing::debug!("all bridge clients dropped; host task exiting");
    });

    (ChannelClient { requests, changes }, task)
}

#[async_trait]
impl FileBridge for ChannelClient {
    async fn send(&self, operation: Operation) -> Result<Response, BridgeError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Envelope {
                request: Request::new(operation),
                reply,
            })
            .await
            .map_err(|_| BridgeError::Lost)?;
        response.await.map_err(|_| BridgeError::Lost)
    }

    fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged> {
        self.changes.subscribe()
    }
}
