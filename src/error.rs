//! Error types for the `framesift` crate.
//!
//! This module defines [`SiftError`], the unified error type returned by all
//! fallible operations in the crate. Variants carry the path, frame index, or
//! model name involved so callers can report a failure without extra logging.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;
use zip::result::ZipError;

/// The unified error type for all `framesift` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiftError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The video path does not exist.
    #[error("Video file not found: {0}")]
    VideoNotFound(PathBuf),

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// A stride of zero was provided.
    #[error("Stride must be greater than zero")]
    InvalidStride,

    /// The minimum aesthetic score is greater than the maximum.
    #[error("Invalid score range: min ({min}) must not exceed max ({max})")]
    InvalidScoreRange {
        /// Lower bound of the range.
        min: f32,
        /// Upper bound of the range.
        max: f32,
    },

    /// A tagger or aesthetic model failed on a frame.
    #[error("Model {model} failed: {reason}")]
    Model {
        /// Name of the model that failed.
        model: String,
        /// Underlying reason.
        reason: String,
    },

    /// No model is registered under the requested name.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// A pipeline worker thread panicked.
    #[error("The {0} worker panicked")]
    WorkerPanicked(&'static str),

    /// The same sequence index was classified twice in one run.
    #[error("Frame {0} was classified more than once")]
    DuplicateFrame(u64),

    /// Writing or compressing an archive failed.
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for SiftError {
    fn from(error: FfmpegError) -> Self {
        SiftError::FfmpegError(error.to_string())
    }
}

impl From<ZipError> for SiftError {
    fn from(error: ZipError) -> Self {
        SiftError::ArchiveError(error.to_string())
    }
}
