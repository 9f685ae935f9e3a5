// bridge.rs — FileBridge: what the editing surface is allowed to ask for.
//
// Transports implement `send` and `subscribe_file_changed`. The named
// methods are the public surface; each builds exactly one Operation, so the
// trait cannot express a request outside the closed set.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use quire_protocol::{FileChanged, Operation, Response};

use crate::error::BridgeError;

#[async_trait]
pub trait FileBridge: Send + Sync {
    /// Carry one operation to the trusted side and await its response.
    async fn send(&self, operation: Operation) -> Result<Response, BridgeError>;

    /// Receive advisory file-changed notifications. Missing one is harmless.
    fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged>;

    /// Show the open picker and read the chosen file.
    async fn open_file(&self) -> Result<Response, BridgeError> {
        self.send(Operation::OpenFile).await
    }

    async fn read_file(&self, path: PathBuf) -> Result<Response, BridgeError> {
        self.send(Operation::ReadFile { path }).await
    }

    async fn write_file(&self, path: PathBuf, content: String) -> Result<Response, BridgeError> {
        self.send(Operation::WriteFile { path, content }).await
    }

    /// Show the open picker; return only the chosen path.
    async fn open_file_dialog(&self) -> Result<Response, BridgeError> {
        self.send(Operation::OpenFileDialog).await
    }

    /// Show the save picker; return only the chosen path.
    async fn save_file_dialog(&self) -> Result<Response, BridgeError> {
        self.send(Operation::SaveFileDialog).await
    }

    async fn read_directory(&self, path: PathBuf) -> Result<Response, BridgeError> {
        self.send(Operation::ReadDirectory { path }).await
    }

    async fn create_directory(&self, path: PathBuf) -> Result<Response, BridgeError> {
        self.send(Operation::CreateDirectory { path }).await
    }

    async fn get_system_info(&self) -> Result<Response, BridgeError> {
        self.send(Operation::GetSystemInfo).await
    }
}

/// A shared client is still a client.
#[async_trait]
impl<B: FileBridge + ?Sized> FileBridge for Arc<B> {
    async fn send(&self, operation: Operation) -> Result<Response, BridgeError> {
        (**self).send(operation).await
    }

    fn subscribe_file_changed(&self) -> broadcast::Receiver<FileChanged> {
        (**self).subscribe_file_changed()
    }
}
