// service.rs — FileService: the closed operation set, executed on the host.
//
// Each operation is self-contained: it does its work, catches its own
// failures, and hands back an Outcome. The private `*_inner` functions use
// `?` on FsServiceError; the public wrappers convert at the boundary, attach
// the user-facing message, and log.
//
// Picker-driven operations have a third result besides success and failure:
// the user dismissed the dialog. That is reported as Outcome::Cancelled and
// never carries an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quire_protocol::{DirEntry, OpenedFile, Operation, Outcome, Payload, Request, Response};

use crate::error::FsServiceError;
use crate::picker::{DialogFilters, Picker, PickerOutcome};
use crate::system::current_system_info;

const OPEN_CANCELLED: &str = "No file selected";
const SAVE_CANCELLED: &str = "Save dialog canceled";

/// The trusted file service.
///
/// Holds no per-request state; every call is independent, so one instance
/// can serve many concurrent requests from blocking worker threads.
pub struct FileService {
    picker: Box<dyn Picker>,
    filters: DialogFilters,
}

impl FileService {
    /// Create a service that shows dialogs through `picker` with the
    /// default filter sets.
    pub fn new(picker: impl Picker + 'static) -> Self {
        Self {
            picker: Box::new(picker),
            filters: DialogFilters::default(),
        }
    }

    /// Replace the filter sets offered by the pickers.
    pub fn with_filters(mut self, filters: DialogFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn filters(&self) -> &DialogFilters {
        &self.filters
    }

    /// Execute one request and wrap its outcome in a response carrying the
    /// same request id.
    pub fn handle(&self, request: &Request) -> Response {
        tracing::debug!(
            request_id = %request.request_id,
            operation = %request.operation,
            "dispatching request"
        );
        let outcome = match &request.operation {
            Operation::OpenFile => self.open_with_picker(),
            Operation::ReadFile { path } => self.read(path),
            Operation::WriteFile { path, content } => self.write(path, content),
            Operation::OpenFileDialog => self.open_dialog(),
            Operation::SaveFileDialog => self.save_with_picker(),
            Operation::ReadDirectory { path } => self.list_directory(path),
            Operation::CreateDirectory { path } => self.make_directory(path),
            Operation::GetSystemInfo => self.system_info(),
        };
        Response::new(request.request_id, outcome)
    }

    /// Show the open picker, then read the chosen file with its metadata.
    pub fn open_with_picker(&self) -> Outcome {
        let picked = match self.picker.pick_open(&self.filters.open_filters) {
            Ok(PickerOutcome::Selected(path)) => path,
            Ok(PickerOutcome::Cancelled) => return cancelled(OPEN_CANCELLED),
            Err(e) => return failed("open-file", "Failed to open file", e.into()),
        };

        match open_inner(&picked) {
            Ok(opened) => {
                tracing::info!(
                    "File opened: {} ({} bytes)",
                    opened.file_path,
                    opened.file_size
                );
                Outcome::Success(Payload::Opened(opened))
            }
            Err(e) => failed("open-file", "Failed to open file", e),
        }
    }

    /// Read a file as UTF-8 text.
    pub fn read(&self, path: &Path) -> Outcome {
        match read_text(path) {
            Ok(content) => {
                tracing::debug!("File read: {} ({} bytes)", path.display(), content.len());
                Outcome::Success(Payload::Content { content })
            }
            Err(e) => failed("read-file", "Failed to read file", e),
        }
    }

    /// Replace a file's contents. Missing parent directories are not created.
    pub fn write(&self, path: &Path, content: &str) -> Outcome {
        match fs::write(path, content) {
            Ok(()) => {
                tracing::info!("File saved: {} ({} bytes)", path.display(), content.len());
                Outcome::Success(Payload::Written)
            }
            Err(e) => failed("write-file", "Failed to save file", FsServiceError::io(path, e)),
        }
    }

    /// Show the open picker and return the chosen path without reading it.
    pub fn open_dialog(&self) -> Outcome {
        match self.picker.pick_open(&self.filters.open_filters) {
            Ok(PickerOutcome::Selected(path)) => picked(path),
            Ok(PickerOutcome::Cancelled) => cancelled(OPEN_CANCELLED),
            Err(e) => failed("open-file-dialog", "Failed to open dialog", e.into()),
        }
    }

    /// Show the save picker and return the chosen path. Nothing is written.
    pub fn save_with_picker(&self) -> Outcome {
        match self.picker.pick_save(&self.filters.save_filters) {
            Ok(PickerOutcome::Selected(path)) => picked(path),
            Ok(PickerOutcome::Cancelled) => cancelled(SAVE_CANCELLED),
            Err(e) => failed("save-file-dialog", "Failed to open dialog", e.into()),
        }
    }

    /// List a directory, sorted by entry name.
    pub fn list_directory(&self, path: &Path) -> Outcome {
        match list_inner(path) {
            Ok(items) => {
                tracing::debug!("Listed {}: {} entries", path.display(), items.len());
                Outcome::Success(Payload::Listing { items })
            }
            Err(e) => failed("read-directory", "Failed to read directory", e),
        }
    }

    /// Create a directory and any missing parents. An existing directory
    /// is a success.
    pub fn make_directory(&self, path: &Path) -> Outcome {
        match mkdir_inner(path) {
            Ok(()) => {
                tracing::info!("Directory created: {}", path.display());
                Outcome::Success(Payload::DirectoryCreated)
            }
            Err(e) => failed("create-directory", "Failed to create directory", e),
        }
    }

    pub fn system_info(&self) -> Outcome {
        Outcome::Success(Payload::SystemInfo {
            info: current_system_info(),
        })
    }
}

fn cancelled(message: &str) -> Outcome {
    tracing::debug!("{}", message);
    Outcome::Cancelled {
        message: message.to_string(),
    }
}

fn picked(path: PathBuf) -> Outcome {
    Outcome::Success(Payload::Picked {
        file_path: path.to_string_lossy().into_owned(),
    })
}

fn failed(operation: &str, message: &str, err: FsServiceError) -> Outcome {
    tracing::warn!(operation, category = %err.category(), "{}: {}", message, err);
    Outcome::Failure(err.to_failure(message))
}

fn read_text(path: &Path) -> Result<String, FsServiceError> {
    let meta = fs::metadata(path).map_err(|e| FsServiceError::io(path, e))?;
    if meta.is_dir() {
        return Err(FsServiceError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|e| FsServiceError::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| FsServiceError::NotText {
        path: path.to_path_buf(),
    })
}

fn open_inner(path: &Path) -> Result<OpenedFile, FsServiceError> {
    let content = read_text(path)?;
    let meta = fs::metadata(path).map_err(|e| FsServiceError::io(path, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    Ok(OpenedFile {
        file_path: path.to_string_lossy().into_owned(),
        content,
        file_name,
        file_extension,
        file_size: meta.len(),
        last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
    })
}

fn list_inner(path: &Path) -> Result<Vec<DirEntry>, FsServiceError> {
    let meta = fs::metadata(path).map_err(|e| FsServiceError::io(path, e))?;
    if !meta.is_dir() {
        return Err(FsServiceError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let mut items = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| FsServiceError::io(path, e))? {
        let entry = entry.map_err(|e| FsServiceError::io(path, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| FsServiceError::io(entry.path(), e))?;
        items.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_file: file_type.is_file(),
            is_directory: file_type.is_dir(),
            path: entry.path().to_string_lossy().into_owned(),
        });
    }
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}

fn mkdir_inner(path: &Path) -> Result<(), FsServiceError> {
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_dir() {
            return Ok(());
        }
        return Err(FsServiceError::PathOccupied {
            path: path.to_path_buf(),
        });
    }
    fs::create_dir_all(path).map_err(|e| FsServiceError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::ScriptedPicker;
    use quire_protocol::FailureCategory;
    use tempfile::tempdir;

    fn service() -> FileService {
        FileService::new(ScriptedPicker::cancelling())
    }

    #[test]
    fn read_rejects_directory() {
        let dir = tempdir().unwrap();
        let outcome = service().read(dir.path());
        assert_eq!(
            outcome.failure().map(|f| f.category),
            Some(FailureCategory::NotAFile)
        );
    }

    #[test]
    fn read_rejects_non_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x81]).unwrap();
        let outcome = service().read(&path);
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.category, FailureCategory::InvalidData);
        assert_eq!(failure.message.as_deref(), Some("Failed to read file"));
    }

    #[test]
    fn extension_keeps_leading_dot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "fn main() {}").unwrap();
        let opened = open_inner(&path).unwrap();
        assert_eq!(opened.file_extension, ".rs");
        assert_eq!(opened.file_name, "main.rs");
        assert_eq!(opened.file_size, 12);
        assert!(opened.last_modified.is_some());
    }

    #[test]
    fn extensionless_file_has_empty_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Makefile");
        fs::write(&path, "all:").unwrap();
        assert_eq!(open_inner(&path).unwrap().file_extension, "");
    }

    #[test]
    fn mkdir_over_file_is_already_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken");
        fs::write(&path, "x").unwrap();
        let outcome = service().make_directory(&path);
        assert_eq!(
            outcome.failure().map(|f| f.category),
            Some(FailureCategory::AlreadyExists)
        );
    }
}
