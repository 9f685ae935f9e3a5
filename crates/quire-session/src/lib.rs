//! # quire-session
//!
//! Client-side lifecycle of one open document in the Quire editor.
//!
//! The [`SessionController`] tracks what the user is editing, whether it has
//! unsaved changes, and whether an open or save is in flight. It serializes
//! file operations against user intent: it never silently discards edits,
//! never lets two loads race to fill the same session, and never lets a
//! failed or cancelled request change what the user sees.
//!
//! ## Key components
//!
//! - [`DocumentSession`] — path, last on-disk content, edit buffer, metadata
//! - [`SessionState`] — Empty → Loading → Clean ↔ Dirty → Saving, derived
//!   from the document rather than stored
//! - [`SessionController`] — drives the state machine over a
//!   [`quire_bridge::FileBridge`]
//! - [`ConfirmationGate`] — pure proceed/abort decision before a destructive
//!   action
//! - [`Confirmer`] — asks the user (terminal, scripted, or fixed answers)

pub mod confirm;
pub mod controller;
pub mod document;
pub mod error;
pub mod gate;
pub mod state;

pub use confirm::{
    AlwaysProceed, ConfirmError, Confirmer, DiscardAction, DiscardPrompt, NeverProceed,
    ScriptedConfirmer,
};
pub use controller::{ActionOutcome, SessionController};
pub use document::{DocumentMetadata, DocumentSession};
pub use error::SessionError;
pub use gate::{ConfirmationGate, GateDecision};
pub use state::{InFlight, SessionState};
