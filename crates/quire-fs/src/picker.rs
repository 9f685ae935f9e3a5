// picker.rs — Open/save picker abstraction.
//
// The OS dialog is opaque to the file service beyond "the user chose this
// path" or "the user dismissed it". Picker implementations live at the edge
// (a terminal prompt in the CLI, a scripted queue in tests and headless
// runs); the service only sees PickerOutcome.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Errors from a picker implementation. Cancellation is *not* an error.
#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("picker input closed")]
    InputClosed,

    #[error("picker error: {0}")]
    Other(String),
}

/// What the user did with a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(PathBuf),
    Cancelled,
}

/// A named group of extensions offered by a picker ("Text Files": txt, md).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    /// Extensions without the dot; `"*"` matches everything.
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl fmt::Display for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<String> = self
            .extensions
            .iter()
            .map(|e| format!("*.{}", e).replace("*.*", "*"))
            .collect();
        write!(f, "{} ({})", self.name, patterns.join(", "))
    }
}

/// Filters offered by the open and save pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogFilters {
    #[serde(default = "default_open_filters")]
    pub open_filters: Vec<FileFilter>,

    #[serde(default = "default_save_filters")]
    pub save_filters: Vec<FileFilter>,
}

fn default_open_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::new("JavaScript Files", &["js", "jsx", "ts", "tsx"]),
        FileFilter::new("Web Files", &["html", "css", "json"]),
        FileFilter::new("Text Files", &["txt", "md", "log"]),
        FileFilter::new("Python Files", &["py"]),
        FileFilter::new("All Files", &["*"]),
    ]
}

fn default_save_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::new("JavaScript Files", &["js", "jsx", "ts", "tsx"]),
        FileFilter::new("Text Files", &["txt", "md"]),
        FileFilter::new("All Files", &["*"]),
    ]
}

impl Default for DialogFilters {
    fn default() -> Self {
        Self {
            open_filters: default_open_filters(),
            save_filters: default_save_filters(),
        }
    }
}

/// The OS file dialogs, as seen by the file service.
///
/// Implementations are called from blocking worker threads, hence
/// `Send + Sync`.
pub trait Picker: Send + Sync {
    /// Ask the user for an existing file to open.
    fn pick_open(&self, filters: &[FileFilter]) -> Result<PickerOutcome, PickerError>;

    /// Ask the user where to save.
    fn pick_save(&self, filters: &[FileFilter]) -> Result<PickerOutcome, PickerError>;
}

/// A picker that replays queued answers. When the queue runs dry every
/// further dialog is treated as dismissed, which also makes it a safe
/// default for headless runs.
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    answers: Mutex<VecDeque<PickerOutcome>>,
}

impl ScriptedPicker {
    pub fn new(answers: impl IntoIterator<Item = PickerOutcome>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    /// A picker whose every dialog is dismissed.
    pub fn cancelling() -> Self {
        Self::default()
    }

    /// Queue another answer.
    pub fn push(&self, outcome: PickerOutcome) -> Result<(), PickerError> {
        self.answers
            .lock()
            .map_err(|e| PickerError::Other(format!("answer queue poisoned: {}", e)))?
            .push_back(outcome);
        Ok(())
    }

    fn next(&self) -> Result<PickerOutcome, PickerError> {
        let mut answers = self
            .answers
            .lock()
            .map_err(|e| PickerError::Other(format!("answer queue poisoned: {}", e)))?;
        Ok(answers.pop_front().unwrap_or(PickerOutcome::Cancelled))
    }
}

impl Picker for ScriptedPicker {
    fn pick_open(&self, _filters: &[FileFilter]) -> Result<PickerOutcome, PickerError> {
        self.next()
    }

    fn pick_save(&self, _filters: &[FileFilter]) -> Result<PickerOutcome, PickerError> {
        self.next()
    }
}
