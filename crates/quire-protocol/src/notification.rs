// notification.rs — The advisory push channel.
//
// The bridge is strictly request/response with one exception: the trusted
// side may announce that a file changed. The session treats this as a hint
// only; nothing about its state depends on receiving (or not receiving) one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file on the host changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChanged {
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

impl FileChanged {
    pub fn now(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Every push message the trusted side may send. Closed, like the operation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Notification {
    #[serde(rename = "file-changed")]
    FileChanged(FileChanged),
}
