//! # quire-fs
//!
//! The trusted file service: the only code in Quire that touches the host
//! filesystem on behalf of the editing surface.
//!
//! Every operation is an independent unit of work that catches its own
//! failures and returns a [`quire_protocol::Outcome`]. Nothing escapes as a
//! panic or an untyped error, and a dismissed picker is reported as
//! `Outcome::Cancelled`, never as a failure.
//!
//! ## Key components
//!
//! - [`FileService`] — implements the operation set and dispatches requests.
//! - [`Picker`] — trait over the OS open/save dialogs, so the dialog itself
//!   stays an external collaborator ([`ScriptedPicker`] for headless use).
//! - [`DialogFilters`] — the file-type filters offered by the pickers.
//! - [`FsServiceError`] — internal error type, converted to a
//!   [`quire_protocol::Failure`] at each operation boundary.

pub mod error;
pub mod picker;
pub mod service;
pub mod system;

pub use error::FsServiceError;
pub use picker::{DialogFilters, FileFilter, Picker, PickerError, PickerOutcome, ScriptedPicker};
pub use service::FileService;
pub use system::current_system_info;
