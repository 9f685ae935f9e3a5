// operation.rs — The closed operation set and its request envelope.
//
// The untrusted surface can only ask for what is listed here. Adding a
// capability means adding a variant, which forces every transport, the
// trusted host, and the client trait to handle it at compile time.
//
// Wire names are the channel names the editing surface has always used:
//   open-file, read-file, write-file, open-file-dialog, save-file-dialog,
//   read-directory, create-directory, get-system-info

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ProtocolError;

/// One callable operation with its arguments, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Show the open picker, then read the chosen file.
    OpenFile,
    /// Read a file as UTF-8 text.
    ReadFile { path: PathBuf },
    /// Replace a file's contents.
    WriteFile { path: PathBuf, content: String },
    /// Show the open picker and return only the chosen path.
    OpenFileDialog,
    /// Show the save picker and return the chosen path.
    SaveFileDialog,
    /// List a directory's entries.
    ReadDirectory { path: PathBuf },
    /// Create a directory, including missing parents.
    CreateDirectory { path: PathBuf },
    /// Describe the trusted side's platform and runtime.
    GetSystemInfo,
}

impl Operation {
    /// Every channel name in the closed set, in declaration order.
    pub const CHANNELS: [&'static str; 8] = [
        "open-file",
        "read-file",
        "write-file",
        "open-file-dialog",
        "save-file-dialog",
        "read-directory",
        "create-directory",
        "get-system-info",
    ];

    /// The wire channel name of this operation.
    pub fn channel(&self) -> &'static str {
        match self {
            Operation::OpenFile => "open-file",
            Operation::ReadFile { .. } => "read-file",
            Operation::WriteFile { .. } => "write-file",
            Operation::OpenFileDialog => "open-file-dialog",
            Operation::SaveFileDialog => "save-file-dialog",
            Operation::ReadDirectory { .. } => "read-directory",
            Operation::CreateDirectory { .. } => "create-directory",
            Operation::GetSystemInfo => "get-system-info",
        }
    }

    /// Whether this operation shows a picker (and may end in `Cancelled`).
    pub fn uses_picker(&self) -> bool {
        matches!(
            self,
            Operation::OpenFile | Operation::OpenFileDialog | Operation::SaveFileDialog
        )
    }

    /// Positional arguments as they appear on the wire.
    pub fn wire_args(&self) -> Vec<Value> {
        match self {
            Operation::ReadFile { path }
            | Operation::ReadDirectory { path }
            | Operation::CreateDirectory { path } => {
                vec![Value::String(path.to_string_lossy().into_owned())]
            }
            Operation::WriteFile { path, content } => vec![
                Value::String(path.to_string_lossy().into_owned()),
                Value::String(content.clone()),
            ],
            Operation::OpenFile
            | Operation::OpenFileDialog
            | Operation::SaveFileDialog
            | Operation::GetSystemInfo => Vec::new(),
        }
    }

    /// Rebuild an operation from its channel name and positional arguments.
    ///
    /// Names outside [`Operation::CHANNELS`] are rejected with
    /// [`ProtocolError::UnknownOperation`] before any argument is looked at.
    pub fn from_wire(name: &str, args: &[Value]) -> Result<Self, ProtocolError> {
        let operation = match name {
            "open-file" => {
                expect_args("open-file", args, 0)?;
                Operation::OpenFile
            }
            "read-file" => {
                expect_args("read-file", args, 1)?;
                Operation::ReadFile {
                    path: string_arg("read-file", args, 0)?.into(),
                }
            }
            "write-file" => {
                expect_args("write-file", args, 2)?;
                Operation::WriteFile {
                    path: string_arg("write-file", args, 0)?.into(),
                    content: string_arg("write-file", args, 1)?,
                }
            }
            "open-file-dialog" => {
                expect_args("open-file-dialog", args, 0)?;
                Operation::OpenFileDialog
            }
            "save-file-dialog" => {
                expect_args("save-file-dialog", args, 0)?;
                Operation::SaveFileDialog
            }
            "read-directory" => {
                expect_args("read-directory", args, 1)?;
                Operation::ReadDirectory {
                    path: string_arg("read-directory", args, 0)?.into(),
                }
            }
            "create-directory" => {
                expect_args("create-directory", args, 1)?;
                Operation::CreateDirectory {
                    path: string_arg("create-directory", args, 0)?.into(),
                }
            }
            "get-system-info" => {
                expect_args("get-system-info", args, 0)?;
                Operation::GetSystemInfo
            }
            other => {
                return Err(ProtocolError::UnknownOperation {
                    name: other.to_string(),
                })
            }
        };
        Ok(operation)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ReadFile { path }
            | Operation::ReadDirectory { path }
            | Operation::CreateDirectory { path } => {
                write!(f, "{}({})", self.channel(), path.display())
            }
            Operation::WriteFile { path, content } => write!(
                f,
                "{}({}, {} bytes)",
                self.channel(),
                path.display(),
                content.len()
            ),
            _ => write!(f, "{}()", self.channel()),
        }
    }
}

fn expect_args(
    operation: &'static str,
    args: &[Value],
    expected: usize,
) -> Result<(), ProtocolError> {
    if args.len() != expected {
        return Err(ProtocolError::ArgumentCount {
            operation,
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn string_arg(operation: &'static str, args: &[Value], index: usize) -> Result<String, ProtocolError> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ProtocolError::ArgumentType { operation, index })
}

/// A request: one operation plus the id its response will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_id: Uuid,
    pub operation: Operation,
}

impl Request {
    /// Wrap an operation in a request with a fresh id.
    pub fn new(operation: Operation) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            operation,
        }
    }

    /// Convert to the positional wire form.
    pub fn to_wire(&self) -> WireRequest {
        WireRequest {
            id: self.request_id,
            op: self.operation.channel().to_string(),
            args: self.operation.wire_args(),
        }
    }
}

/// The JSON form of a request: `{"id": "...", "op": "read-file", "args": ["/tmp/a.txt"]}`.
///
/// `op` is kept as a free string here so that a bad name can still be
/// answered (with a protocol failure) under the caller's request id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    pub id: Uuid,
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl WireRequest {
    /// Validate the operation name and arguments.
    pub fn decode(&self) -> Result<Request, ProtocolError> {
        Ok(Request {
            request_id: self.id,
            operation: Operation::from_wire(&self.op, &self.args)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_names_cover_closed_set() {
        let ops = [
            Operation::OpenFile,
            Operation::ReadFile { path: "a".into() },
            Operation::WriteFile {
                path: "a".into(),
                content: String::new(),
            },
            Operation::OpenFileDialog,
            Operation::SaveFileDialog,
            Operation::ReadDirectory { path: "d".into() },
            Operation::CreateDirectory { path: "d".into() },
            Operation::GetSystemInfo,
        ];
        let names: Vec<&str> = ops.iter().map(Operation::channel).collect();
        assert_eq!(names, Operation::CHANNELS.to_vec());
    }

    #[test]
    fn wire_request_decodes_write_file() {
        let wire: WireRequest = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "op": "write-file",
            "args": ["/tmp/a.txt", "hello"],
        }))
        .unwrap();
        let request = wire.decode().unwrap();
        assert_eq!(
            request.operation,
            Operation::WriteFile {
                path: PathBuf::from("/tmp/a.txt"),
                content: "hello".to_string(),
            }
        );
        assert_eq!(request.request_id, wire.id);
    }

    #[test]
    fn unknown_operation_is_rejected_by_name() {
        let err = Operation::from_wire("delete-file", &[json!("/etc/passwd")]).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownOperation { ref name } if name == "delete-file"));
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let err = Operation::from_wire("read-file", &[]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ArgumentCount {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn non_string_argument_is_rejected() {
        let err = Operation::from_wire("create-directory", &[json!(42)]).unwrap_err();
        assert!(matches!(err, ProtocolError::ArgumentType { index: 0, .. }));
    }

    #[test]
    fn missing_args_field_defaults_to_empty() {
        let wire: WireRequest = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "op": "get-system-info",
        }))
        .unwrap();
        assert_eq!(wire.decode().unwrap().operation, Operation::GetSystemInfo);
    }

    #[test]
    fn picker_operations_are_flagged() {
        assert!(Operation::OpenFile.uses_picker());
        assert!(Operation::SaveFileDialog.uses_picker());
        assert!(!Operation::GetSystemInfo.uses_picker());
        assert!(!Operation::ReadFile { path: "x".into() }.uses_picker());
    }

    #[test]
    fn display_includes_path_and_size() {
        let op = Operation::WriteFile {
            path: "/tmp/a.txt".into(),
            content: "hello".into(),
        };
        assert_eq!(op.to_string(), "write-file(/tmp/a.txt, 5 bytes)");
        assert_eq!(Operation::OpenFile.to_string(), "open-file()");
    }
}
