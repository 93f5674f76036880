//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::io;

use framesift::{SiftError, VideoFile};

#[test]
fn open_nonexistent_file() {
    let result = VideoFile::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = VideoFile::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn error_messages_carry_context() {
    let cases = [
        (
            SiftError::VideoNotFound("clip.mp4".into()),
            "Video file not found: clip.mp4",
        ),
        (SiftError::DuplicateFrame(4), "Frame 4 was classified more than once"),
        (SiftError::WorkerPanicked("producer"), "The producer worker panicked"),
        (
            SiftError::Model {
                model: "wd14-vit-v2".to_string(),
                reason: "out of memory".to_string(),
            },
            "Model wd14-vit-v2 failed: out of memory",
        ),
        (SiftError::UnknownModel("x".to_string()), "Unknown model: x"),
    ];

    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn io_errors_convert() {
    let error: SiftError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
    assert!(matches!(error, SiftError::IoError(_)));
    assert!(error.to_string().starts_with("I/O error:"));
}

#[test]
fn errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SiftError>();
}
