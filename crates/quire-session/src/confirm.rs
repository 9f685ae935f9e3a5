// confirm.rs — Confirmer trait: asking the user before discarding edits.
//
// The controller consults a Confirmer only when the session is dirty. The
// call is synchronous, like a modal dialog: implementations may block on
// user input. The terminal implementation lives in the CLI.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Errors from a Confirmer. The controller treats any error as "no".
#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("confirmation input closed")]
    InputClosed,
}

/// The destructive action awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardAction {
    /// Opening another file over the current one.
    Open,
    /// Closing the document (or quitting).
    Close,
}

/// What the user is being asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardPrompt {
    pub action: DiscardAction,
    /// The document with unsaved edits; `None` when untitled.
    pub path: Option<PathBuf>,
}

impl fmt::Display for DiscardPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let verb = match self.action {
            DiscardAction::Open => "open another file",
            DiscardAction::Close => "close",
        };
        write!(
            f,
            "{} has unsaved changes. Discard them and {}?",
            target, verb
        )
    }
}

pub trait Confirmer: Send + Sync {
    /// Ask whether unsaved edits may be discarded. `Ok(true)` means yes.
    fn confirm_discard(&self, prompt: &DiscardPrompt) -> Result<bool, ConfirmError>;
}

impl<C: Confirmer + ?Sized> Confirmer for Arc<C> {
    fn confirm_discard(&self, prompt: &DiscardPrompt) -> Result<bool, ConfirmError> {
        (**self).confirm_discard(prompt)
    }
}

/// Always answers yes.
pub struct AlwaysProceed;

impl Confirmer for AlwaysProceed {
    fn confirm_discard(&self, _prompt: &DiscardPrompt) -> Result<bool, ConfirmError> {
        Ok(true)
    }
}

/// Always answers no.
pub struct NeverProceed;

impl Confirmer for NeverProceed {
    fn confirm_discard(&self, _prompt: &DiscardPrompt) -> Result<bool, ConfirmError> {
        Ok(false)
    }
}

/// Replays queued answers and remembers every prompt it was shown.
/// Answers "no" once the queue is empty.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<DiscardPrompt>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far, oldest first.
    pub fn prompts(&self) -> Vec<DiscardPrompt> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm_discard(&self, prompt: &DiscardPrompt) -> Result<bool, ConfirmError> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.clone());
        }
        let answer = self
            .answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front());
        Ok(answer.unwrap_or(false))
    }
}
