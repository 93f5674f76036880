//! Status-reporting facade over the pipeline.
//!
//! A [`Session`] is what an interactive front end drives: every operation
//! returns a [`StatusReport`] with a message for the user and an optional
//! payload, and never an `Err`. A failure turns into a status starting with
//! `Error:` and no payload.
//!
//! The session remembers the last completed extraction so it can be
//! exported later. A failed extraction leaves the previous one in place.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{ModelRegistry, Selection, Session, SiftOptions};
//!
//! let mut models = ModelRegistry::new();
//! let mut session = Session::new();
//!
//! let report = session.extract("input.mp4", &SiftOptions::new(), &mut models);
//! println!("{}", report.status);
//!
//! let report = session.export(Selection::All, "exports");
//! if let Some(zip) = report.payload {
//!     println!("archive written to {}", zip.display());
//! }
//! session.unload(&mut models);
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};

use image::DynamicImage;

use crate::{
    archive,
    configuration::SiftOptions,
    error::SiftError,
    metadata::VideoInfo,
    models::ModelRegistry,
    pipeline::{Extraction, Pipeline},
    sample::{FrameSource, VideoSource},
};

/// Number of frames shown by [`Session::preview`].
pub const PREVIEW_FRAMES: u64 = 12;

const NOT_FOUND: &str = "Video file not found";

/// A user-facing message plus the operation's result, if it produced one.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport<T> {
    pub status: String,
    pub payload: Option<T>,
}

impl<T> StatusReport<T> {
    fn ok(status: impl Into<String>, payload: T) -> Self {
        Self {
            status: status.into(),
            payload: Some(payload),
        }
    }

    fn message(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            payload: None,
        }
    }

    fn failed(error: &SiftError) -> Self {
        log::error!("{error}");
        Self::message(format!("Error: {error}"))
    }

    /// Returns `true` if the operation failed.
    pub fn is_error(&self) -> bool {
        self.status.starts_with("Error:")
    }
}

/// Frames shown to the user after an extraction. At most the display limit
/// of each outcome.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    pub kept: Vec<DynamicImage>,
    pub excluded: Vec<DynamicImage>,
}

/// Which frames of the last extraction to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Kept,
    Excluded,
    /// Both, as `extracted/` and `excluded/` inside one archive.
    All,
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Selection::Kept => f.write_str("kept"),
            Selection::Excluded => f.write_str("excluded"),
            Selection::All => f.write_str("all"),
        }
    }
}

#[derive(Debug)]
struct CompletedRun {
    video_path: PathBuf,
    extraction: Extraction,
}

/// Holds the last completed extraction between user actions.
#[derive(Debug, Default)]
pub struct Session {
    last: Option<CompletedRun>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last completed extraction, if any.
    pub fn last_extraction(&self) -> Option<&Extraction> {
        self.last.as_ref().map(|run| &run.extraction)
    }

    /// The video the last completed extraction came from.
    pub fn last_video(&self) -> Option<&Path> {
        self.last.as_ref().map(|run| run.video_path.as_path())
    }

    /// Duration and frame count of a video.
    pub fn video_info<P: AsRef<Path>>(&self, path: P) -> StatusReport<VideoInfo> {
        let path = path.as_ref();
        if let Err(error) = require_video(path) {
            log::warn!("{error}");
            return StatusReport::message(NOT_FOUND);
        }
        let info = VideoInfo::probe(path);
        log::info!("{info}");
        StatusReport::ok(info.to_string(), info)
    }

    /// The first [`PREVIEW_FRAMES`] sampled frames of a video, without
    /// running any model.
    pub fn preview<P: AsRef<Path>>(&self, path: P, stride: u64) -> StatusReport<Vec<DynamicImage>> {
        let path = path.as_ref();
        log::info!("Showing preview of {}", path.display());
        if let Err(error) = require_video(path) {
            log::warn!("{error}");
            return StatusReport::message(NOT_FOUND);
        }

        match VideoSource::new(path, stride, Some(PREVIEW_FRAMES)) {
            Ok(source) => {
                let images = source.into_frames().map(|frame| frame.image).collect();
                StatusReport::ok(format!("Showed preview of {}", path.display()), images)
            }
            Err(error) => StatusReport::failed(&error),
        }
    }

    /// Classify a video and remember the result.
    pub fn extract<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &SiftOptions,
        models: &mut ModelRegistry,
    ) -> StatusReport<Gallery> {
        let path = path.as_ref();
        log::info!("Extracting frames from {}", path.display());
        if let Err(error) = require_video(path) {
            log::warn!("{error}");
            return StatusReport::message(NOT_FOUND);
        }

        match VideoSource::new(path, options.stride(), options.max_frames()) {
            Ok(source) => self.extract_source(path, source, options, models),
            Err(error) => StatusReport::failed(&error),
        }
    }

    /// Classify frames from any source, remembering them under `video_path`.
    pub fn extract_source<P, S>(
        &mut self,
        video_path: P,
        source: S,
        options: &SiftOptions,
        models: &mut ModelRegistry,
    ) -> StatusReport<Gallery>
    where
        P: AsRef<Path>,
        S: FrameSource,
    {
        let video_path = video_path.as_ref();
        let extraction = match Pipeline::new(options.clone()).run(models, source) {
            Ok(extraction) => extraction,
            Err(error) => return StatusReport::failed(&error),
        };

        let limit = options.display_limit();
        let (kept, excluded) = extraction.display(limit);
        let gallery = Gallery {
            kept: kept.into_iter().cloned().collect(),
            excluded: excluded.into_iter().cloned().collect(),
        };

        let mut status = format!("Extracting frames from {} completed!", video_path.display());
        if extraction.is_truncated(limit) {
            log::info!("Too many frames to show. Showing only {limit}");
            status = format!("Too many frames to show. Showing only {limit}. {status}");
        }

        self.last = Some(CompletedRun {
            video_path: video_path.to_path_buf(),
            extraction,
        });
        StatusReport::ok(status, gallery)
    }

    /// Write the selected frames of the last extraction under `work_dir` and
    /// zip them. The archive is named after the video's file stem.
    pub fn export<P: AsRef<Path>>(&self, selection: Selection, work_dir: P) -> StatusReport<PathBuf> {
        let Some(run) = &self.last else {
            return match selection {
                Selection::Excluded => StatusReport::message("No excluded frames"),
                Selection::Kept | Selection::All => StatusReport::message("No extracted frames"),
            };
        };

        match export_run(run, selection, work_dir.as_ref()) {
            Ok(zip_path) => StatusReport::ok("Compressing finished!", zip_path),
            Err(error) => StatusReport::failed(&error),
        }
    }

    /// Unload every model in `models`.
    pub fn unload(&self, models: &mut ModelRegistry) -> StatusReport<bool> {
        let clean = models.unload();
        log::info!("Model unloaded");
        StatusReport::ok("Model unloaded", clean)
    }
}

/// Fails with [`SiftError::VideoNotFound`] unless `path` exists.
fn require_video(path: &Path) -> Result<(), SiftError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SiftError::VideoNotFound(path.to_path_buf()))
    }
}

fn export_run(run: &CompletedRun, selection: Selection, work_dir: &Path) -> Result<PathBuf, SiftError> {
    let stem = run
        .video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "frames".to_string());
    let dir = work_dir.join(stem);
    let extraction = &run.extraction;

    log::info!("Exporting {selection} frames to {}", dir.display());
    match selection {
        Selection::Kept => archive::write_frames(extraction.kept(), &dir)?,
        Selection::Excluded => archive::write_frames(extraction.excluded(), &dir)?,
        Selection::All => {
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
            archive::write_frames(extraction.kept(), dir.join("extracted"))?;
            archive::write_frames(extraction.excluded(), dir.join("excluded"))?;
        }
    }

    archive::compress(&dir)
}
