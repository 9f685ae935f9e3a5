// controller.rs — SessionController: one document, one request at a time.
//
// The controller owns the DocumentSession and talks to the trusted side only
// through the injected FileBridge. Rules it enforces:
//
//   - At most one open or save is outstanding. A second one is rejected
//     with SessionError::Busy before anything is touched.
//   - Anything that would throw away unsaved edits goes through the
//     ConfirmationGate first; a refusal leaves the session untouched.
//   - A failed or cancelled request leaves the document exactly as it was.
//   - Edits are accepted at any time, including while a request is out.
//     A successful open replaces edits typed while it was loading.
//
// The session lives behind a std Mutex that is only ever held for short,
// synchronous sections. It is never held across an `.await`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use quire_bridge::{BridgeError, FileBridge};
use quire_protocol::{Failure, FileChanged, Outcome, Payload, Response};

use crate::confirm::{Confirmer, DiscardAction, DiscardPrompt};
use crate::document::DocumentSession;
use crate::error::SessionError;
use crate::gate::{ConfirmationGate, GateDecision};
use crate::state::{InFlight, SessionState};

/// How a user action ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran to completion.
    Completed,
    /// The user dismissed a picker. Nothing changed.
    Cancelled { message: String },
    /// The user refused to discard unsaved edits. Nothing changed.
    Declined,
}

#[derive(Debug, Default)]
struct Inner {
    document: DocumentSession,
    in_flight: Option<InFlight>,
}

impl Inner {
    fn state(&self) -> SessionState {
        SessionState::derive(&self.document, self.in_flight)
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn log_transition(before: SessionState, after: SessionState, cause: &str) {
    if before == after {
        return;
    }
    if before.can_transition_to(after) {
        tracing::debug!(%before, %after, cause, "session state changed");
    } else {
        tracing::warn!(%before, %after, cause, "unexpected session transition");
    }
}

/// Marks a request as in flight until `finish` is called. If the request
/// future is dropped first, the marker is cleared so the session does not
/// stay busy forever.
struct InFlightGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl InFlightGuard<'_> {
    /// Clear the marker and apply the request's result in one critical section.
    fn finish<R>(mut self, apply: impl FnOnce(&mut Inner) -> R) -> R {
        self.armed = false;
        let mut inner = lock_inner(self.inner);
        let before = inner.state();
        inner.in_flight = None;
        let result = apply(&mut inner);
        log_transition(before, inner.state(), "request finished");
        result
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock_inner(self.inner).in_flight = None;
            tracing::warn!("request abandoned before its response arrived");
        }
    }
}

pub struct SessionController<B> {
    bridge: B,
    confirmer: Box<dyn Confirmer>,
    inner: Mutex<Inner>,
}

impl<B: FileBridge> SessionController<B> {
    /// Create a controller with an empty session.
    pub fn new(bridge: B, confirmer: impl Confirmer + 'static) -> Self {
        Self {
            bridge,
            confirmer: Box::new(confirmer),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    /// The bridge this session talks through, for operations that do not
    /// touch the document (listing, mkdir, system info).
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    /// A copy of the document as it is right now.
    pub fn document(&self) -> DocumentSession {
        self.lock().document.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().document.is_dirty()
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.lock().document.path().map(Path::to_path_buf)
    }

    pub fn content(&self) -> String {
        self.lock().document.current().to_string()
    }

    /// Advisory notifications from the trusted side.
    pub fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged> {
        self.bridge.subscribe_file_changed()
    }

    /// Whether a notification concerns the open document.
    pub fn concerns_document(&self, change: &FileChanged) -> bool {
        self.lock()
            .document
            .path()
            .is_some_and(|p| p == Path::new(&change.path))
    }

    /// Replace the edit buffer. Dirtiness is recomputed from full content.
    pub fn edit(&self, content: impl Into<String>) -> SessionState {
        let mut inner = self.lock();
        let before = inner.state();
        inner.document.edit(content.into());
        let after = inner.state();
        log_transition(before, after, "edit");
        after
    }

    /// Open a file through the picker, replacing the current document.
    pub async fn open_requested(&self) -> Result<ActionOutcome, SessionError> {
        if self.gate(DiscardAction::Open)? == GateDecision::Abort {
            return Ok(ActionOutcome::Declined);
        }
        let guard = self.begin(InFlight::Open)?;
        let result = self.bridge.open_file().await;

        guard.finish(|inner| -> Result<ActionOutcome, SessionError> {
            let response = result.map_err(transport)?;
            match response.outcome {
                Outcome::Success(Payload::Opened(file)) => {
                    if inner.document.is_dirty() {
                        tracing::warn!(
                            "edits made while {} was loading were replaced",
                            file.file_path
                        );
                    }
                    tracing::info!("opened {} ({} bytes)", file.file_path, file.file_size);
                    inner.document.load(file);
                    Ok(ActionOutcome::Completed)
                }
                Outcome::Success(other) => Err(unexpected("open-file", &other)),
                Outcome::Cancelled { message } => Ok(ActionOutcome::Cancelled { message }),
                Outcome::Failure(failure) => Err(classify(failure)),
            }
        })
    }

    /// Write the buffer to the document's current path.
    pub async fn save_requested(&self) -> Result<ActionOutcome, SessionError> {
        let (path, content, guard) = {
            let mut inner = self.lock();
            if inner.in_flight.is_some() {
                tracing::debug!("save rejected: session busy");
                return Err(SessionError::Busy);
            }
            let path = inner
                .document
                .path()
                .map(Path::to_path_buf)
                .ok_or(SessionError::NoActivePath)?;
            let content = inner.document.current().to_string();
            let before = inner.state();
            inner.in_flight = Some(InFlight::Save);
            log_transition(before, inner.state(), "save requested");
            (path, content, self.guard())
        };

        let result = self.bridge.write_file(path.clone(), content.clone()).await;
        guard.finish(|inner| apply_write(inner, path, content, result))
    }

    /// Ask for a destination with the save picker, write the buffer there,
    /// and adopt it as the document's path.
    pub async fn save_as_requested(&self) -> Result<ActionOutcome, SessionError> {
        let guard = self.begin(InFlight::Save)?;

        let response = match self.bridge.save_file_dialog().await {
            Ok(response) => response,
            Err(e) => return guard.finish(|_| Err(transport(e))),
        };
        let path = match response.outcome {
            Outcome::Success(Payload::Picked { file_path }) => PathBuf::from(file_path),
            Outcome::Cancelled { message } => {
                return guard.finish(|_| Ok(ActionOutcome::Cancelled { message }))
            }
            Outcome::Success(other) => {
                return guard.finish(|_| Err(unexpected("save-file-dialog", &other)))
            }
            Outcome::Failure(failure) => return guard.finish(|_| Err(classify(failure))),
        };

        let content = self.content();
        let result = self.bridge.write_file(path.clone(), content.clone()).await;
        guard.finish(|inner| apply_write(inner, path, content, result))
    }

    /// Close the document, back to an empty session. Gated when dirty.
    pub fn close_requested(&self) -> Result<ActionOutcome, SessionError> {
        if self.gate(DiscardAction::Close)? == GateDecision::Abort {
            return Ok(ActionOutcome::Declined);
        }
        let mut inner = self.lock();
        if inner.in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        let before = inner.state();
        inner.document.reset();
        log_transition(before, inner.state(), "close");
        Ok(ActionOutcome::Completed)
    }

    /// Consult the user (only if there is something to lose) and the gate.
    fn gate(&self, action: DiscardAction) -> Result<GateDecision, SessionError> {
        let (dirty, path) = {
            let inner = self.lock();
            if inner.in_flight.is_some() {
                tracing::debug!("{:?} rejected: session busy", action);
                return Err(SessionError::Busy);
            }
            (
                inner.document.is_dirty(),
                inner.document.path().map(Path::to_path_buf),
            )
        };

        let confirmed = dirty && {
            let prompt = DiscardPrompt { action, path };
            match self.confirmer.confirm_discard(&prompt) {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!("confirmation failed, keeping edits: {}", e);
                    false
                }
            }
        };

        let decision = ConfirmationGate::decide(dirty, confirmed);
        tracing::debug!(?action, dirty, %decision, "confirmation gate");
        Ok(decision)
    }

    fn begin(&self, kind: InFlight) -> Result<InFlightGuard<'_>, SessionError> {
        let mut inner = self.lock();
        if inner.in_flight.is_some() {
            tracing::debug!("{:?} rejected: session busy", kind);
            return Err(SessionError::Busy);
        }
        let before = inner.state();
        inner.in_flight = Some(kind);
        log_transition(before, inner.state(), "request started");
        Ok(self.guard())
    }

    fn guard(&self) -> InFlightGuard<'_> {
        InFlightGuard {
            inner: &self.inner,
            armed: true,
        }
    }
}

fn apply_write(
    inner: &mut Inner,
    path: PathBuf,
    content: String,
    result: Result<Response, BridgeError>,
) -> Result<ActionOutcome, SessionError> {
    let response = result.map_err(transport)?;
    match response.outcome {
        Outcome::Success(Payload::Written) => {
            tracing::info!("saved {} ({} bytes)", path.display(), content.len());
            inner.document.mark_saved(path, content);
            Ok(ActionOutcome::Completed)
        }
        Outcome::Success(other) => Err(unexpected("write-file", &other)),
        Outcome::Cancelled { message } => Ok(ActionOutcome::Cancelled { message }),
        Outcome::Failure(failure) => Err(classify(failure)),
    }
}

fn transport(e: BridgeError) -> SessionError {
    tracing::warn!("bridge failure: {}", e);
    SessionError::Transport(e)
}

fn classify(failure: Failure) -> SessionError {
    if failure.is_protocol() {
        tracing::error!("trusted side rejected the request: {}", failure);
        SessionError::Protocol(failure)
    } else {
        tracing::warn!("{}", failure);
        SessionError::Failed(failure)
    }
}

fn unexpected(operation: &str, payload: &Payload) -> SessionError {
    let kind = match payload {
        Payload::Opened(_) => "opened",
        Payload::Content { .. } => "content",
        Payload::Written => "written",
        Payload::Picked { .. } => "picked",
        Payload::Listing { .. } => "listing",
        Payload::DirectoryCreated => "directory_created",
        Payload::SystemInfo { .. } => "system_info",
    };
    let failure = Failure::protocol(format!("unexpected '{}' payload for {}", kind, operation));
    tracing::error!("{}", failure);
    SessionError::Protocol(failure)
}
