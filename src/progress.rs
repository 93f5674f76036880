//! Progress reporting.
//!
//! The collector of each pipeline run owns a fresh [`ProgressTracker`], so
//! progress starts at zero for every run and only the collector ever writes
//! it. Observers implement [`ProgressCallback`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesift::{ProgressCallback, ProgressInfo, SiftOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.2} % proceeded");
//!         }
//!     }
//! }
//!
//! let options = SiftOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of pipeline progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames classified as kept so far.
    pub kept: u64,
    /// Frames classified as excluded so far.
    pub excluded: u64,
    /// Expected number of frames. Best effort: the real count may differ.
    pub total: u64,
    /// Completion percentage in `[0, 100]`, if `total` is non-zero. Never
    /// decreases within a run.
    pub percentage: Option<f32>,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on throughput so far.
    pub estimated_remaining: Option<Duration>,
    /// `true` for the final report of a run.
    pub finished: bool,
}

impl ProgressInfo {
    /// Frames classified so far.
    pub fn processed(&self) -> u64 {
        self.kept + self.excluded
    }
}

/// Receives progress updates from the collector.
///
/// Callbacks are infallible: they observe a run but cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called after each classified frame and once more when the run ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Minimum percentage change between two log lines.
const LOG_STEP: f32 = 0.01;

/// Per-run progress state, written by the collector only.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    kept: u64,
    excluded: u64,
    last_percentage: f32,
    last_logged: f32,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            kept: 0,
            excluded: 0,
            last_percentage: 0.0,
            last_logged: 0.0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn record_kept(&mut self) {
        self.kept += 1;
        self.report(false);
    }

    pub(crate) fn record_excluded(&mut self) {
        self.excluded += 1;
        self.report(false);
    }

    pub(crate) fn processed(&self) -> u64 {
        self.kept + self.excluded
    }

    /// Emit the final report. A run that finished reports 100 %.
    pub(crate) fn finish(&mut self) {
        if self.total > 0 {
            self.last_percentage = 100.0;
        }
        self.report(true);
    }

    fn percentage(&mut self) -> Option<f32> {
        if self.total == 0 {
            return None;
        }
        let raw = (self.processed() as f32 / self.total as f32 * 100.0).min(100.0);
        self.last_percentage = self.last_percentage.max(raw);
        Some(self.last_percentage)
    }

    fn report(&mut self, finished: bool) {
        let elapsed = self.start_time.elapsed();
        let processed = self.processed();
        let percentage = self.percentage();

        if let Some(pct) = percentage {
            if pct - self.last_logged > LOG_STEP {
                log::debug!("{pct:.2} % proceeded");
                self.last_logged = pct;
            }
        }

        let estimated_remaining = if processed > 0 && !finished {
            let remaining = self.total.saturating_sub(processed);
            Some(elapsed.div_f64(processed as f64).mul_f64(remaining as f64))
        } else {
            None
        };

        let info = ProgressInfo {
            kept: self.kept,
            excluded: self.excluded,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            finished,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        infos: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.infos.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn percentage_is_capped_and_monotonic() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), 2);
        tracker.record_kept();
        tracker.record_excluded();
        tracker.record_kept();
        tracker.finish();

        let infos = recorder.infos.lock().unwrap();
        let percentages: Vec<f32> = infos.iter().filter_map(|info| info.percentage).collect();
        assert_eq!(percentages, vec![50.0, 100.0, 100.0, 100.0]);
        assert!(infos.last().unwrap().finished);
        assert_eq!(infos.last().unwrap().processed(), 3);
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), 0);
        tracker.record_kept();
        tracker.finish();

        let infos = recorder.infos.lock().unwrap();
        assert!(infos.iter().all(|info| info.percentage.is_none()));
    }
}
