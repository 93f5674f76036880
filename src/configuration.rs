//! Run configuration.
//!
//! [`SiftOptions`] is a builder that carries sampling, filtering, model
//! selection, and operational settings into a
//! [`Pipeline`](crate::Pipeline) or [`Session`](crate::Session) without
//! growing every function signature.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framesift::{BanList, ScoreRange, SiftOptions};
//!
//! let options = SiftOptions::new()
//!     .with_stride(30)
//!     .with_max_frames(100)
//!     .with_ban_list(BanList::parse("blurry, close-up", 0.5))
//!     .with_score_range(ScoreRange::new(6.0, 10.0)?)
//!     .with_poll_interval(Duration::from_millis(50));
//! options.validate()?;
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use crate::{
    aesthetic::AestheticModelKind,
    classify::{Classifier, ScoreRange},
    error::SiftError,
    progress::{NoOpProgress, ProgressCallback},
    tags::{BanList, TaggerModel},
};

/// Raw frames between two sampled frames, by default.
pub const DEFAULT_STRIDE: u64 = 60;

/// Capacity of the producer-to-consumer hand-off queue, by default.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// How many frames of each outcome are shown before truncating.
pub const DEFAULT_DISPLAY_LIMIT: usize = 30;

/// Settings for one classification run.
///
/// A default-constructed value samples every 60th frame, bans
/// `blurry` and `close-up` at 0.5, keeps scores in `[5, 10]`, and uses the
/// default tagger and aesthetic model.
#[derive(Clone)]
pub struct SiftOptions {
    pub(crate) stride: u64,
    pub(crate) max_frames: Option<u64>,
    pub(crate) ban_list: BanList,
    pub(crate) score_range: ScoreRange,
    pub(crate) tagger_model: String,
    pub(crate) aesthetic_model: String,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) poll_interval: Duration,
    pub(crate) queue_capacity: usize,
    pub(crate) display_limit: usize,
}

impl Debug for SiftOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SiftOptions")
            .field("stride", &self.stride)
            .field("max_frames", &self.max_frames)
            .field("ban_list", &self.ban_list)
            .field("score_range", &self.score_range)
            .field("tagger_model", &self.tagger_model)
            .field("aesthetic_model", &self.aesthetic_model)
            .field("has_progress", &true)
            .field("poll_interval", &self.poll_interval)
            .field("queue_capacity", &self.queue_capacity)
            .field("display_limit", &self.display_limit)
            .finish()
    }
}

impl Default for SiftOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SiftOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            max_frames: None,
            ban_list: BanList::parse(BanList::DEFAULT_TEXT, BanList::DEFAULT_THRESHOLD),
            score_range: ScoreRange::default(),
            tagger_model: TaggerModel::default().name().to_string(),
            aesthetic_model: AestheticModelKind::default().name().to_string(),
            progress: Arc::new(NoOpProgress),
            poll_interval: Duration::from_millis(100),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }

    /// Keep every `stride`-th raw frame. Zero is rejected by
    /// [`validate`](SiftOptions::validate).
    #[must_use]
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride;
        self
    }

    /// Stop after `max` sampled frames. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_max_frames(mut self, max: u64) -> Self {
        self.max_frames = Some(max.max(1));
        self
    }

    /// Replace the ban list. An empty list never excludes on tag grounds.
    #[must_use]
    pub fn with_ban_list(mut self, ban_list: BanList) -> Self {
        self.ban_list = ban_list;
        self
    }

    /// Set the closed interval of acceptable aesthetic scores.
    #[must_use]
    pub fn with_score_range(mut self, range: ScoreRange) -> Self {
        self.score_range = range;
        self
    }

    /// Name of the registered tagger to run.
    #[must_use]
    pub fn with_tagger_model(mut self, name: impl Into<String>) -> Self {
        self.tagger_model = name.into();
        self
    }

    /// Name of the registered aesthetic model to run.
    #[must_use]
    pub fn with_aesthetic_model(mut self, name: impl Into<String>) -> Self {
        self.aesthetic_model = name.into();
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// How long the collector waits for an outcome before checking again.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound of the hand-off queue. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Frames of each outcome shown before truncating. Clamped to a
    /// minimum of 1.
    #[must_use]
    pub fn with_display_limit(mut self, limit: usize) -> Self {
        self.display_limit = limit.max(1);
        self
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn max_frames(&self) -> Option<u64> {
        self.max_frames
    }

    pub fn ban_list(&self) -> &BanList {
        &self.ban_list
    }

    pub fn score_range(&self) -> ScoreRange {
        self.score_range
    }

    pub fn tagger_model(&self) -> &str {
        &self.tagger_model
    }

    pub fn aesthetic_model(&self) -> &str {
        &self.aesthetic_model
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Check the settings that cannot be made valid by clamping.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidStride`] if the stride is zero.
    pub fn validate(&self) -> Result<(), SiftError> {
        if self.stride == 0 {
            return Err(SiftError::InvalidStride);
        }
        Ok(())
    }

    pub(crate) fn classifier(&self) -> Classifier {
        Classifier::new(self.ban_list.clone(), self.score_range)
    }
}
