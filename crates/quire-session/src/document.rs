// document.rs — DocumentSession: the one open document.
//
// Dirtiness is never stored. It is recomputed from a full comparison of the
// edit buffer against the last known on-disk content, so undoing back to the
// original clears it exactly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quire_protocol::OpenedFile;

/// Informational facts about the file, refreshed on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    /// Extension with the leading dot, or empty.
    pub file_extension: String,
    pub file_size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    /// Metadata for a file just written from this session.
    pub fn for_written(path: &Path, content: &str) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
            file_size: content.len() as u64,
            last_modified: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSession {
    path: Option<PathBuf>,
    original: String,
    current: String,
    metadata: Option<DocumentMetadata>,
}

impl DocumentSession {
    /// An empty, untitled session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Last known on-disk content.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The live edit buffer.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.metadata.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.original
    }

    /// Nothing loaded and nothing typed.
    pub fn is_empty(&self) -> bool {
        self.path.is_none() && !self.is_dirty()
    }

    /// Replace the edit buffer.
    pub fn edit(&mut self, content: String) {
        self.current = content;
    }

    /// Populate every field from a freshly opened file, all at once.
    pub fn load(&mut self, file: OpenedFile) {
        *self = Self {
            path: Some(PathBuf::from(file.file_path)),
            original: file.content.clone(),
            current: file.content,
            metadata: Some(DocumentMetadata {
                file_name: file.file_name,
                file_extension: file.file_extension,
                file_size: file.file_size,
                last_modified: file.last_modified,
            }),
        };
    }

    /// Record a successful write of `written` to `path`.
    ///
    /// `written` is the snapshot that went to disk, which may differ from
    /// the buffer if editing continued while the save was in flight.
    pub fn mark_saved(&mut self, path: PathBuf, written: String) {
        self.metadata = Some(DocumentMetadata::for_written(&path, &written));
        self.path = Some(path);
        self.original = written;
    }

    /// Back to an empty, untitled session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Display title: the file name, or "untitled".
    pub fn title(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    }
}
