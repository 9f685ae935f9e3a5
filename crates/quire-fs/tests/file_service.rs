// file_service.rs — Integration tests for the trusted file service.
//
// Every operation is driven through `FileService::handle` with a real
// request, the way the bridge host calls it, against a temp directory.
//
// VERIFY:
//   - Success payloads carry the documented fields
//   - Failures are structured (category + error + message), never panics
//   - Picker dismissal is a Cancelled outcome with no error
//   - The response id always matches the request id

use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use quire_fs::{FileService, PickerOutcome, ScriptedPicker};
use quire_protocol::{FailureCategory, Operation, Outcome, Payload, Request};

fn run(service: &FileService, operation: Operation) -> Outcome {
    let request = Request::new(operation);
    let response = service.handle(&request);
    assert_eq!(response.request_id, request.request_id);
    response.outcome
}

fn plain_service() -> FileService {
    FileService::new(ScriptedPicker::cancelling())
}

#[test]
fn open_file_returns_content_and_metadata() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "hello").unwrap();

    let service = FileService::new(ScriptedPicker::new([PickerOutcome::Selected(path.clone())]));
    match run(&service, Operation::OpenFile) {
        Outcome::Success(Payload::Opened(opened)) => {
            assert_eq!(opened.content, "hello");
            assert_eq!(opened.file_name, "a.txt");
            assert_eq!(opened.file_extension, ".txt");
            assert_eq!(opened.file_size, 5);
            assert_eq!(PathBuf::from(&opened.file_path), path);
        }
        other => panic!("expected opened payload, got {:?}", other),
    }
}

#[test]
fn dismissed_open_picker_is_cancelled_not_failed() {
    let outcome = run(&plain_service(), Operation::OpenFile);
    assert_eq!(
        outcome,
        Outcome::Cancelled {
            message: "No file selected".to_string()
        }
    );
    assert!(outcome.failure().is_none());
}

#[test]
fn dismissed_save_picker_is_cancelled() {
    let outcome = run(&plain_service(), Operation::SaveFileDialog);
    assert_eq!(
        outcome,
        Outcome::Cancelled {
            message: "Save dialog canceled".to_string()
        }
    );
}

#[test]
fn save_picker_returns_chosen_path_without_writing() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("new.md");
    let service = FileService::new(ScriptedPicker::new([PickerOutcome::Selected(target.clone())]));

    let outcome = run(&service, Operation::SaveFileDialog);
    assert_eq!(
        outcome,
        Outcome::Success(Payload::Picked {
            file_path: target.to_string_lossy().into_owned()
        })
    );
    assert!(!target.exists());
}

#[test]
fn open_picker_on_missing_file_fails_with_not_found() {
    let dir = tempdir().unwrap();
    let service = FileService::new(ScriptedPicker::new([PickerOutcome::Selected(
        dir.path().join("gone.txt"),
    )]));
    let outcome = run(&service, Operation::OpenFile);
    let failure = outcome.failure().expect("should fail");
    assert_eq!(failure.category, FailureCategory::NotFound);
    assert_eq!(failure.message.as_deref(), Some("Failed to open file"));
}

#[test]
fn write_then_read_returns_same_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    let service = plain_service();

    let written = run(
        &service,
        Operation::WriteFile {
            path: path.clone(),
            content: "# Title\nünïcödé\n".into(),
        },
    );
    assert_eq!(written, Outcome::Success(Payload::Written));

    let read = run(&service, Operation::ReadFile { path });
    assert_eq!(
        read,
        Outcome::Success(Payload::Content {
            content: "# Title\nünïcödé\n".into()
        })
    );
}

#[test]
fn write_does_not_create_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("a.txt");
    let outcome = run(
        &plain_service(),
        Operation::WriteFile {
            path: path.clone(),
            content: "x".into(),
        },
    );
    assert_eq!(
        outcome.failure().map(|f| f.category),
        Some(FailureCategory::NotFound)
    );
    assert!(!path.exists());
}

#[test]
fn read_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let outcome = run(
        &plain_service(),
        Operation::ReadFile {
            path: dir.path().join("nope.txt"),
        },
    );
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.category, FailureCategory::NotFound);
    assert!(!failure.error.is_empty());
}

#[test]
fn directory_listing_is_sorted_and_typed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();

    let outcome = run(
        &plain_service(),
        Operation::ReadDirectory {
            path: dir.path().to_path_buf(),
        },
    );
    let Outcome::Success(Payload::Listing { items }) = outcome else {
        panic!("expected listing");
    };
    let names: Vec<&str> = items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "src"]);
    assert!(items[0].is_file && !items[0].is_directory);
    assert!(items[2].is_directory && !items[2].is_file);
    assert_eq!(PathBuf::from(&items[2].path), dir.path().join("src"));
}

#[test]
fn listing_a_file_is_not_a_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "a").unwrap();
    let outcome = run(&plain_service(), Operation::ReadDirectory { path: file });
    assert_eq!(
        outcome.failure().map(|f| f.category),
        Some(FailureCategory::NotADirectory)
    );
}

#[test]
fn create_directory_is_recursive_and_idempotent() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("one").join("two");
    let service = plain_service();

    let first = run(&service, Operation::CreateDirectory { path: nested.clone() });
    assert_eq!(first, Outcome::Success(Payload::DirectoryCreated));
    assert!(nested.is_dir());

    let again = run(&service, Operation::CreateDirectory { path: nested });
    assert_eq!(again, Outcome::Success(Payload::DirectoryCreated));
}

#[test]
fn system_info_is_always_available() {
    let outcome = run(&plain_service(), Operation::GetSystemInfo);
    let Outcome::Success(Payload::SystemInfo { info }) = outcome else {
        panic!("expected system info");
    };
    assert_eq!(info.arch, std::env::consts::ARCH);
    assert!(info.pid > 0);
}

#[test]
fn response_wire_form_for_failure_has_no_cancelled_flag() {
    let dir = tempdir().unwrap();
    let request = Request::new(Operation::ReadFile {
        path: dir.path().join("nope"),
    });
    let response = plain_service().handle(&request);
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["success"], serde_json::json!(false));
    assert_eq!(value["category"], serde_json::json!("not_found"));
    assert!(value.get("cancelled").is_none());
    assert_eq!(value["requestId"], serde_json::json!(request.request_id.to_string()));
}
