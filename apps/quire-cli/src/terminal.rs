// terminal.rs — Terminal adapters for the picker and the discard prompt.
//
// The REPL, the open/save picker, and the confirmation prompt all share one
// Terminal, so a line typed in answer to a picker is never swallowed by the
// REPL's own reader. Reader and writer are injectable for tests.

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use quire_fs::{FileFilter, Picker, PickerError, PickerOutcome};
use quire_session::{ConfirmError, Confirmer, DiscardPrompt};

/// Line-oriented terminal I/O shared by every interactive component.
pub struct Terminal {
    reader: Mutex<Box<dyn BufRead + Send>>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Terminal {
    pub fn new(reader: Box<dyn BufRead + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// The process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Write `text` followed by a newline.
    pub fn say(&self, text: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", text)?;
        writer.flush()
    }

    /// Show `prompt` and read one line. `None` means the input is closed.
    pub fn prompt(&self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            write!(writer, "{}", prompt)?;
            writer.flush()?;
        }
        let mut line = String::new();
        let bytes = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Asks for a path on the terminal. An empty line dismisses the dialog.
pub struct TerminalPicker {
    terminal: Arc<Terminal>,
    preselected: Mutex<Option<PathBuf>>,
}

impl TerminalPicker {
    pub fn new(terminal: Arc<Terminal>) -> Self {
        Self {
            terminal,
            preselected: Mutex::new(None),
        }
    }

    /// Answer the next open dialog with `path` without asking (`edit --file`).
    pub fn preselect(self, path: PathBuf) -> Self {
        *self
            .preselected
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(path);
        self
    }

    fn ask(&self, title: &str, filters: &[FileFilter]) -> Result<PickerOutcome, PickerError> {
        self.terminal.say(title)?;
        for filter in filters {
            self.terminal.say(&format!("  {}", filter))?;
        }
        let line = self
            .terminal
            .prompt("path (empty to cancel)> ")?
            .ok_or(PickerError::InputClosed)?;
        let line = line.trim();
        if line.is_empty() {
            Ok(PickerOutcome::Cancelled)
        } else {
            Ok(PickerOutcome::Selected(PathBuf::from(line)))
        }
    }
}

impl Picker for TerminalPicker {
    fn pick_open(&self, filters: &[FileFilter]) -> Result<PickerOutcome, PickerError> {
        let preselected = self
            .preselected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match preselected {
            Some(path) => Ok(PickerOutcome::Selected(path)),
            None => self.ask("Open file", filters),
        }
    }

    fn pick_save(&self, filters: &[FileFilter]) -> Result<PickerOutcome, PickerError> {
        self.ask("Save file as", filters)
    }
}

/// Asks "discard unsaved changes?" on the terminal. Only y/yes proceeds.
pub struct TerminalConfirmer {
    terminal: Arc<Terminal>,
}

impl TerminalConfirmer {
    pub fn new(terminal: Arc<Terminal>) -> Self {
        Self { terminal }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm_discard(&self, prompt: &DiscardPrompt) -> Result<bool, ConfirmError> {
        let answer = self
            .terminal
            .prompt(&format!("{} [y/N] ", prompt))?
            .ok_or(ConfirmError::InputClosed)?;
        Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}
