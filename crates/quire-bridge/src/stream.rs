// stream.rs — Line-delimited JSON transport.
//
// Each direction carries one JSON object per line:
//
//   client → host   {"id": "<uuid>", "op": "read-file", "args": ["/tmp/a.txt"]}
//   host → client   {"requestId": "<uuid>", "success": true, "kind": "content", ...}
//                   {"event": "file-changed", "path": "...", "timestamp": "..."}
//
// Requests are handled concurrently, so responses may come back in a
// different order than the requests went out; the client correlates them
// by request id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinSet;
use uuid::Uuid;

use quire_protocol::{
    Failure, FileChanged, HostMessage, Notification, Operation, Request, Response, WireRequest,
};

use crate::bridge::FileBridge;
use crate::error::BridgeError;
use crate::host::BridgeHost;

const OUTBOX_DEPTH: usize = 64;

/// Serve `host` over a line-oriented stream until the reader hits EOF.
///
/// In-flight requests are allowed to finish and their responses are
/// flushed before this returns.
pub async fn serve_stream<R, W>(host: Arc<BridgeHost>, reader: R, writer: W) -> Result<(), BridgeError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbox, inbox) = mpsc::channel::<HostMessage>(OUTBOX_DEPTH);
    let writer_task = tokio::spawn(write_host_messages(writer, inbox));
    let forwarder = tokio::spawn(forward_notifications(host.subscribe(), outbox.clone()));

    let mut reader = BufReader::new(reader);
    let mut in_flight = JoinSet::new();
    let mut buf = Vec::new();

    // Only a failing reader ends the loop. A bad line is dropped.
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => {
                tracing::error!("request stream failed: {}", e);
                break Err(BridgeError::Io(e));
            }
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::error!("dropping request line that is not UTF-8: {}", e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let wire = match parse_request(line) {
            Ok(wire) => wire,
            Err(Some(response)) => {
                let _ = outbox.send(HostMessage::Response(response)).await;
                continue;
            }
            Err(None) => {
                tracing::error!("dropping unparseable request line: {}", line);
                continue;
            }
        };

        let host = Arc::clone(&host);
        let outbox = outbox.clone();
        in_flight.spawn(async move {
            let response = host.dispatch_wire(wire).await;
            if outbox.send(HostMessage::Response(response)).await.is_err() {
                tracing::warn!("response dropped: stream writer closed");
            }
        });
    };

    while in_flight.join_next().await.is_some() {}
    forwarder.abort();
    let _ = forwarder.await;
    drop(outbox);

    let write_result = writer_task
        .await
        .map_err(|e| BridgeError::Io(std::io::Error::other(e)))?;
    read_result?;
    write_result?;
    tracing::debug!("stream reader closed; served all requests");
    Ok(())
}

/// Parse one request line. A line that is JSON with a usable `id` but an
/// invalid shape still gets a protocol failure back (`Err(Some(_))`);
/// anything else is unanswerable (`Err(None)`).
fn parse_request(line: &str) -> Result<WireRequest, Option<Response>> {
    let value: Value = serde_json::from_str(line).map_err(|_| None)?;
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());
    serde_json::from_value::<WireRequest>(value).map_err(|e| {
        id.map(|id| {
            tracing::error!(request_id = %id, "malformed request: {}", e);
            Response::failure(id, Failure::protocol(format!("malformed request: {}", e)))
        })
    })
}

async fn write_host_messages<W>(
    mut writer: W,
    mut inbox: mpsc::Receiver<HostMessage>,
) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = inbox.recv().await {
        let mut line = message.to_line()?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

async fn forward_notifications(
    mut changes: broadcast::Receiver<FileChanged>,
    outbox: mpsc::Sender<HostMessage>,
) {
    loop {
        match changes.recv().await {
            Ok(change) => {
                let message = HostMessage::Notification(Notification::FileChanged(change));
                if outbox.send(message).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("skipped {} file-changed notifications", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Replies awaited by callers, keyed by request id. `None` once the reader
/// has stopped, so later calls fail fast instead of waiting forever.
type Pending = Arc<Mutex<Option<HashMap<Uuid, oneshot::Sender<Response>>>>>;

/// Client end of the stream transport.
#[derive(Clone)]
pub struct StreamClient {
    outgoing: mpsc::Sender<WireRequest>,
    pending: Pending,
    changes: broadcast::Sender<FileChanged>,
}

impl StreamClient {
    /// Connect over a reader (host → client lines) and a writer
    /// (client → host lines). Must be called inside a tokio runtime.
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outgoing, queue) = mpsc::channel::<WireRequest>(OUTBOX_DEPTH);
        let pending: Pending = Arc::new(Mutex::new(Some(HashMap::new())));
        let (changes, _) = broadcast::channel(OUTBOX_DEPTH);

        tokio::spawn(write_requests(writer, queue));
        tokio::spawn(read_host_messages(reader, Arc::clone(&pending), changes.clone()));

        Self {
            outgoing,
            pending,
            changes,
        }
    }

    fn register(&self, id: Uuid) -> Result<oneshot::Receiver<Response>, BridgeError> {
        let (tx, rx) = oneshot::channel();
        let mut guard = self.pending.lock().map_err(|_| BridgeError::Lost)?;
        match guard.as_mut() {
            Some(waiting) => {
                waiting.insert(id, tx);
                Ok(rx)
            }
            None => Err(BridgeError::Lost),
        }
    }

    fn forget(&self, id: &Uuid) {
        if let Ok(mut guard) = self.pending.lock() {
            if let Some(waiting) = guard.as_mut() {
                waiting.remove(id);
            }
        }
    }
}

/// Removes a caller's reply slot when its call ends, including when the
/// call future is dropped before the response arrives.
struct ReplySlot<'a> {
    client: &'a StreamClient,
    id: Uuid,
}

impl Drop for ReplySlot<'_> {
    fn drop(&mut self) {
        self.client.forget(&self.id);
    }
}

#[async_trait]
impl FileBridge for StreamClient {
    async fn send(&self, operation: Operation) -> Result<Response, BridgeError> {
        let request = Request::new(operation);
        let id = request.request_id;
        let response = self.register(id)?;
        let _slot = ReplySlot { client: self, id };

        if self.outgoing.send(request.to_wire()).await.is_err() {
            return Err(BridgeError::Lost);
        }
        response.await.map_err(|_| BridgeError::Lost)
    }

    fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged> {
        self.changes.subscribe()
    }
}

async fn write_requests<W>(mut writer: W, mut queue: mpsc::Receiver<WireRequest>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(wire) = queue.recv().await {
        let mut line = match serde_json::to_string(&wire) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(request_id = %wire.id, "failed to encode request: {}", e);
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::warn!("request stream closed: {}", e);
            break;
        }
        if let Err(e) = writer.flush().await {
            tracing::warn!("request stream closed: {}", e);
            break;
        }
    }
}

async fn read_host_messages<R>(reader: R, pending: Pending, changes: broadcast::Sender<FileChanged>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("response stream failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match HostMessage::from_line(&line) {
            Ok(HostMessage::Response(response)) => {
                let waiter = pending
                    .lock()
                    .ok()
                    .and_then(|mut guard| guard.as_mut()?.remove(&response.request_id));
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::warn!(
                        request_id = %response.request_id,
                        "response for unknown or duplicate request id"
                    ),
                }
            }
            Ok(HostMessage::Notification(Notification::FileChanged(change))) => {
                let _ = changes.send(change);
            }
            Err(e) => tracing::error!("undecodable host message: {}", e),
        }
    }

    // Dropping every waiting sender wakes its caller with `Lost`.
    if let Ok(mut guard) = pending.lock() {
        guard.take();
    }
}
