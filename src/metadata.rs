//! Video metadata types.
//!
//! [`VideoMetadata`] is read once when a [`VideoFile`](crate::VideoFile) is
//! opened. [`VideoInfo`] is the short summary shown when a video is picked,
//! and never fails: an unreadable video reports zero length.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    time::Duration,
};

use crate::video::VideoFile;

/// Metadata for the best video stream of a file.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames. Taken from the container when it records one,
    /// otherwise estimated from duration and frame rate.
    pub frame_count: u64,
    /// Container duration.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

/// Length and frame count of a video, as shown next to the upload field.
///
/// # Example
///
/// ```no_run
/// use framesift::VideoInfo;
///
/// let info = VideoInfo::probe("input.mp4");
/// println!("{info}"); // Video length: 12.34 seconds, 370 frames
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoInfo {
    /// Length of the video in seconds.
    pub duration_seconds: f64,
    /// Number of raw frames in the video.
    pub frame_count: u64,
}

impl VideoInfo {
    /// Probe a video file. Unreadable files yield a zeroed `VideoInfo`.
    pub fn probe<P: AsRef<Path>>(path: P) -> Self {
        match VideoFile::open(path.as_ref()) {
            Ok(file) => Self::from(file.metadata()),
            Err(error) => {
                log::warn!("Could not probe {}: {error}", path.as_ref().display());
                Self::default()
            }
        }
    }
}

impl From<&VideoMetadata> for VideoInfo {
    fn from(metadata: &VideoMetadata) -> Self {
        let duration_seconds = if metadata.frames_per_second > 0.0 {
            metadata.frame_count as f64 / metadata.frames_per_second
        } else {
            metadata.duration.as_secs_f64()
        };
        Self {
            duration_seconds,
            frame_count: metadata.frame_count,
        }
    }
}

impl Display for VideoInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Video length: {:.2} seconds, {} frames",
            self.duration_seconds, self.frame_count
        )
    }
}
