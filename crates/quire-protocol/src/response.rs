// response.rs — Responses, payloads, and structured failures.
//
// Every request gets exactly one Response. Its Outcome is one of three
// mutually exclusive shapes, so "both success and failure populated" cannot
// be represented in Rust at all. On the wire the flat object shape the
// editing surface expects is kept:
//
//   {"requestId": "...", "success": true, "kind": "content", "content": "..."}
//   {"requestId": "...", "success": false, "error": "...", "category": "not_found"}
//   {"requestId": "...", "success": false, "cancelled": true, "message": "No file selected"}
//
// Decoding enforces the exclusivity rules: a success carrying an error, a
// cancellation carrying an error, or a failure with no error are rejected.

use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ProtocolError;

/// Machine-distinguishable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    NotFound,
    PermissionDenied,
    NotADirectory,
    NotAFile,
    /// The path is already occupied by something of the wrong kind.
    AlreadyExists,
    /// The file is not valid UTF-8 text.
    InvalidData,
    StorageFull,
    /// Any other I/O failure.
    Io,
    /// The request itself was malformed or named an unknown operation.
    Protocol,
    /// The trusted side failed in a way unrelated to the filesystem.
    Internal,
}

impl FailureCategory {
    /// Map an I/O error kind onto a category.
    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => FailureCategory::NotFound,
            io::ErrorKind::PermissionDenied => FailureCategory::PermissionDenied,
            io::ErrorKind::AlreadyExists => FailureCategory::AlreadyExists,
            io::ErrorKind::InvalidData => FailureCategory::InvalidData,
            io::ErrorKind::NotADirectory => FailureCategory::NotADirectory,
            io::ErrorKind::IsADirectory => FailureCategory::NotAFile,
            io::ErrorKind::StorageFull => FailureCategory::StorageFull,
            _ => FailureCategory::Io,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureCategory::NotFound => "not_found",
            FailureCategory::PermissionDenied => "permission_denied",
            FailureCategory::NotADirectory => "not_a_directory",
            FailureCategory::NotAFile => "not_a_file",
            FailureCategory::AlreadyExists => "already_exists",
            FailureCategory::InvalidData => "invalid_data",
            FailureCategory::StorageFull => "storage_full",
            FailureCategory::Io => "io",
            FailureCategory::Protocol => "protocol",
            FailureCategory::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// A structured failure: what went wrong, for machines and for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub category: FailureCategory,
    /// Technical description (e.g. the OS error text).
    pub error: String,
    /// Optional user-facing message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Failure {
    pub fn new(category: FailureCategory, error: impl Into<String>) -> Self {
        Self {
            category,
            error: error.into(),
            message: None,
        }
    }

    /// A protocol-level failure (unknown operation, bad arguments).
    pub fn protocol(error: impl Into<String>) -> Self {
        Self::new(FailureCategory::Protocol, error)
    }

    /// Attach a user-facing message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_protocol(&self) -> bool {
        self.category == FailureCategory::Protocol
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} ({}): {}", message, self.category, self.error),
            None => write!(f, "{}: {}", self.category, self.error),
        }
    }
}

impl From<&ProtocolError> for Failure {
    fn from(err: &ProtocolError) -> Self {
        Failure::protocol(err.to_string())
    }
}

/// A file opened through the picker, with its content and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedFile {
    pub file_path: String,
    pub content: String,
    pub file_name: String,
    /// Extension including the leading dot (".js"), or empty.
    pub file_extension: String,
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
    pub is_directory: bool,
    /// Full path of the entry.
    pub path: String,
}

/// Platform and runtime descriptors of the trusted side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub platform: String,
    pub arch: String,
    pub family: String,
    /// Version of the trusted service.
    pub version: String,
    pub cwd: String,
    pub pid: u32,
}

/// Operation-specific success payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// `open-file`: the chosen file's content and metadata.
    Opened(OpenedFile),
    /// `read-file`
    Content { content: String },
    /// `write-file`
    Written,
    /// `open-file-dialog` / `save-file-dialog`
    Picked {
        #[serde(rename = "filePath")]
        file_path: String,
    },
    /// `read-directory`
    Listing { items: Vec<DirEntry> },
    /// `create-directory`
    DirectoryCreated,
    /// `get-system-info`
    SystemInfo { info: SystemInfo },
}

impl Payload {
    /// The success message the editing surface shows, if any.
    fn message(&self) -> Option<&'static str> {
        match self {
            Payload::Opened(_) => Some("File opened successfully"),
            Payload::Written => Some("File saved successfully"),
            Payload::DirectoryCreated => Some("Directory created successfully"),
            _ => None,
        }
    }
}

/// The result of one request. Exactly one shape is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Payload),
    Failure(Failure),
    /// The user dismissed a picker. Not an error.
    Cancelled { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The response to one [`crate::Request`].
///
/// Serializes to and from the flat wire object described at the top of this
/// module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub struct Response {
    pub request_id: Uuid,
    pub outcome: Outcome,
}

impl Response {
    pub fn new(request_id: Uuid, outcome: Outcome) -> Self {
        Self {
            request_id,
            outcome,
        }
    }

    pub fn success(request_id: Uuid, payload: Payload) -> Self {
        Self::new(request_id, Outcome::Success(payload))
    }

    pub fn failure(request_id: Uuid, failure: Failure) -> Self {
        Self::new(request_id, Outcome::Failure(failure))
    }

    pub fn cancelled(request_id: Uuid, message: impl Into<String>) -> Self {
        Self::new(
            request_id,
            Outcome::Cancelled {
                message: message.into(),
            },
        )
    }
}

impl From<Response> for Value {
    fn from(response: Response) -> Self {
        let mut map = Map::new();
        map.insert(
            "requestId".to_string(),
            Value::String(response.request_id.to_string()),
        );
        match response.outcome {
            Outcome::Success(payload) => {
                map.insert("success".to_string(), Value::Bool(true));
                if let Some(message) = payload.message() {
                    map.insert("message".to_string(), Value::String(message.to_string()));
                }
                match serde_json::to_value(&payload) {
                    Ok(Value::Object(fields)) => map.extend(fields),
                    Ok(other) => {
                        tracing::error!("payload serialized to a non-object: {}", other);
                    }
                    Err(e) => tracing::error!("payload serialization failed: {}", e),
                }
            }
            Outcome::Failure(failure) => {
                map.insert("success".to_string(), Value::Bool(false));
                map.insert("error".to_string(), Value::String(failure.error));
                map.insert(
                    "category".to_string(),
                    Value::String(failure.category.to_string()),
                );
                if let Some(message) = failure.message {
                    map.insert("message".to_string(), Value::String(message));
                }
            }
            Outcome::Cancelled { message } => {
                map.insert("success".to_string(), Value::Bool(false));
                map.insert("cancelled".to_string(), Value::Bool(true));
                map.insert("message".to_string(), Value::String(message));
            }
        }
        Value::Object(map)
    }
}

impl TryFrom<Value> for Response {
    type Error = ProtocolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ProtocolError::InvalidResponse(
                "response must be a JSON object".into(),
            ));
        };

        let request_id = map
            .get("requestId")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| ProtocolError::InvalidResponse("missing or invalid requestId".into()))?;
        let success = map
            .get("success")
            .and_then(Value::as_bool)
            .ok_or_else(|| ProtocolError::InvalidResponse("missing success flag".into()))?;
        let error = map.get("error").and_then(Value::as_str).map(str::to_string);
        let cancelled = map
            .get("cancelled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        let outcome = match (success, error, cancelled) {
            (true, Some(_), _) => {
                return Err(ProtocolError::InvalidResponse(
                    "success response carries an error".into(),
                ))
            }
            (true, None, true) => {
                return Err(ProtocolError::InvalidResponse(
                    "success response is marked cancelled".into(),
                ))
            }
            (true, None, false) => {
                let payload: Payload = serde_json::from_value(Value::Object(map))?;
                Outcome::Success(payload)
            }
            (false, Some(_), true) => {
                return Err(ProtocolError::InvalidResponse(
                    "cancelled response carries an error".into(),
                ))
            }
            (false, Some(error), false) => {
                let category = match map.get("category") {
                    Some(raw) => serde_json::from_value(raw.clone())?,
                    None => FailureCategory::Io,
                };
                Outcome::Failure(Failure {
                    category,
                    error,
                    message,
                })
            }
            (false, None, true) => Outcome::Cancelled {
                message: message.unwrap_or_default(),
            },
            (false, None, false) => {
                return Err(ProtocolError::InvalidResponse(
                    "failure response without an error".into(),
                ))
            }
        };

        Ok(Response {
            request_id,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cancelled_response_has_no_error_field() {
        let response = Response::cancelled(Uuid::new_v4(), "No file selected");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["cancelled"], json!(true));
        assert_eq!(value["message"], json!("No file selected"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_response_carries_category_and_error() {
        let failure = Failure::new(FailureCategory::NotFound, "no such file")
            .with_message("Failed to open file");
        let response = Response::failure(Uuid::new_v4(), failure);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["category"], json!("not_found"));
        assert_eq!(value["error"], json!("no such file"));
        assert_eq!(value["message"], json!("Failed to open file"));
        assert!(value.get("cancelled").is_none());
    }

    #[test]
    fn opened_payload_uses_surface_field_names() {
        let response = Response::success(
            Uuid::new_v4(),
            Payload::Opened(OpenedFile {
                file_path: "/tmp/a.txt".into(),
                content: "hello".into(),
                file_name: "a.txt".into(),
                file_extension: ".txt".into(),
                file_size: 5,
                last_modified: None,
            }),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["kind"], json!("opened"));
        assert_eq!(value["filePath"], json!("/tmp/a.txt"));
        assert_eq!(value["fileName"], json!("a.txt"));
        assert_eq!(value["fileExtension"], json!(".txt"));
        assert_eq!(value["fileSize"], json!(5));
        assert_eq!(value["message"], json!("File opened successfully"));

        let restored: Response = serde_json::from_value(value).unwrap();
        assert_eq!(restored, response);
    }

    #[test]
    fn listing_decodes_back_into_entries() {
        let response = Response::success(
            Uuid::new_v4(),
            Payload::Listing {
                items: vec![DirEntry {
                    name: "src".into(),
                    is_file: false,
                    is_directory: true,
                    path: "/p/src".into(),
                }],
            },
        );
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("\"isDirectory\":true"));
        let restored: Response = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, response);
    }

    #[test]
    fn success_with_error_is_invalid() {
        let err = Response::try_from(json!({
            "requestId": Uuid::new_v4().to_string(),
            "success": true,
            "error": "boom",
            "kind": "written",
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidResponse(_)));
    }

    #[test]
    fn failure_without_error_or_cancel_is_invalid() {
        let err = Response::try_from(json!({
            "requestId": Uuid::new_v4().to_string(),
            "success": false,
            "message": "something",
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidResponse(_)));
    }

    #[test]
    fn cancelled_with_error_is_invalid() {
        let err = Response::try_from(json!({
            "requestId": Uuid::new_v4().to_string(),
            "success": false,
            "cancelled": true,
            "error": "boom",
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidResponse(_)));
    }

    #[test]
    fn failure_without_category_defaults_to_io() {
        let response = Response::try_from(json!({
            "requestId": Uuid::new_v4().to_string(),
            "success": false,
            "error": "disk on fire",
        }))
        .unwrap();
        assert_eq!(
            response.outcome.failure().map(|f| f.category),
            Some(FailureCategory::Io)
        );
    }

    #[test]
    fn io_kinds_map_to_categories() {
        assert_eq!(
            FailureCategory::from_io_kind(io::ErrorKind::NotFound),
            FailureCategory::NotFound
        );
        assert_eq!(
            FailureCategory::from_io_kind(io::ErrorKind::PermissionDenied),
            FailureCategory::PermissionDenied
        );
        assert_eq!(
            FailureCategory::from_io_kind(io::ErrorKind::Interrupted),
            FailureCategory::Io
        );
    }

    #[test]
    fn failure_display_prefers_message() {
        let f = Failure::new(FailureCategory::PermissionDenied, "EACCES")
            .with_message("Failed to save");
        assert_eq!(f.to_string(), "Failed to save (permission_denied): EACCES");
        let f = Failure::protocol("unknown operation 'rm'");
        assert_eq!(f.to_string(), "protocol: unknown operation 'rm'");
        assert!(f.is_protocol());
    }
}
