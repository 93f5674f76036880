//! Archive writer integration tests.

mod common;

use std::{fs, fs::File};

use framesift::{Frame, SiftError, archive};

fn frames(indices: &[u64]) -> Vec<Frame> {
    indices
        .iter()
        .map(|&index| Frame {
            index,
            image: common::frame(index as f32, 0.0),
        })
        .collect()
}

fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── write_frames ───────────────────────────────────────────────────

#[test]
fn frames_are_numbered_by_position() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("clip");

    archive::write_frames(&frames(&[3, 7, 9]), &dir).unwrap();

    assert_eq!(
        file_names(&dir),
        ["frame_000000.png", "frame_000001.png", "frame_000002.png"]
    );
    let second = image::open(dir.join("frame_000001.png")).expect("Failed to read frame");
    assert_eq!(second.to_rgb8().get_pixel(0, 0).0[0], 70);
}

#[test]
fn existing_directory_is_replaced() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("clip");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("stale.txt"), b"old").unwrap();

    archive::write_frames(&frames(&[0]), &dir).unwrap();

    assert_eq!(file_names(&dir), ["frame_000000.png"]);
}

#[test]
fn empty_sequence_leaves_empty_directory() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("empty");

    archive::write_frames(&[], &dir).unwrap();

    assert!(dir.is_dir());
    assert!(file_names(&dir).is_empty());
}

// ── compress ───────────────────────────────────────────────────────

#[test]
fn compress_writes_sibling_zip() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("clip");
    archive::write_frames(&frames(&[0, 1]), dir.join("extracted")).unwrap();
    archive::write_frames(&frames(&[2]), dir.join("excluded")).unwrap();

    let zip_path = archive::compress(&dir).unwrap();
    assert_eq!(zip_path, temporary_directory.path().join("clip.zip"));

    let mut zip = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        [
            "excluded/",
            "excluded/frame_000000.png",
            "extracted/",
            "extracted/frame_000000.png",
            "extracted/frame_000001.png",
        ]
    );
    assert!(zip.by_name("extracted/frame_000001.png").unwrap().size() > 0);
}

#[test]
fn compress_missing_directory_fails_without_zip() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("missing");

    let result = archive::compress(&dir);

    assert!(matches!(result, Err(SiftError::ArchiveError(_))));
    assert!(!temporary_directory.path().join("missing.zip").exists());
}

#[test]
fn compress_stores_entries_in_name_order() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("clip");
    archive::write_frames(&frames(&[0, 1]), dir.join("b")).unwrap();
    archive::write_frames(&frames(&[2]), dir.join("a")).unwrap();
    fs::write(dir.join("notes.txt"), b"n").unwrap();

    let zip_path = archive::compress(&dir).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let names: Vec<String> = (0..zip.len())
        .map(|position| zip.by_index(position).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "a/",
            "a/frame_000000.png",
            "b/",
            "b/frame_000000.png",
            "b/frame_000001.png",
            "notes.txt",
        ]
    );
}

#[cfg(unix)]
#[test]
fn compress_does_not_follow_symlinked_directories() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temporary_directory.path().join("clip");
    archive::write_frames(&frames(&[0]), dir.join("extracted")).unwrap();
    std::os::unix::fs::symlink(&dir, dir.join("extracted").join("loop")).unwrap();

    let zip_path = archive::compress(&dir).unwrap();

    let zip = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, ["extracted/", "extracted/frame_000000.png"]);
}
