//! The concurrent classification pipeline.
//!
//! A run has three participants:
//!
//! - the **producer** thread drains a [`FrameSource`] into a bounded
//!   hand-off queue, then closes it and raises the producer-done flag;
//! - the **consumer** thread pops frames, runs the tagger and the aesthetic
//!   model from the [`ModelRegistry`], classifies each frame, and sends a
//!   tagged outcome to the collector;
//! - the **collector** runs on the calling thread, polls the outcome channel
//!   with a short timeout, files every frame into the kept or excluded
//!   [`FrameSet`], and reports progress.
//!
//! The collector stops once the outcome channel is closed and drained,
//! which only happens after the consumer has seen the end of the hand-off
//! queue. The expected frame count only drives progress.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{ModelRegistry, Pipeline, SiftOptions, VideoSource};
//!
//! let mut models = ModelRegistry::new();
//! // register "wd14-vit-v2" and "sac+logos+ava1-l14-linearMSE" here
//! let options = SiftOptions::new();
//! let source = VideoSource::new("input.mp4", options.stride(), options.max_frames())?;
//! let extraction = Pipeline::new(options).run(&mut models, source)?;
//! println!("{}", extraction.summary());
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender},
    },
    thread,
    time::Duration,
};

use image::DynamicImage;

use crate::{
    aesthetic::AestheticScorer,
    classify::{Classifier, Outcome},
    configuration::SiftOptions,
    error::SiftError,
    frame_set::FrameSet,
    models::ModelRegistry,
    progress::ProgressTracker,
    sample::{Frame, FrameSource},
};

/// A classified frame on its way to the collector.
struct Classified {
    outcome: Outcome,
    frame: Frame,
}

/// Runs frames from a source through the models and partitions them.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: SiftOptions,
}

impl Pipeline {
    pub fn new(options: SiftOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SiftOptions {
        &self.options
    }

    /// Classify every frame of `source`.
    ///
    /// The tagger and aesthetic model named in the options are looked up in
    /// `models` and loaded on first use. They stay loaded after the run.
    ///
    /// # Errors
    ///
    /// - [`SiftError::InvalidStride`] if the options do not validate.
    /// - Any model error raised on a frame; the run stops and partial
    ///   results are discarded.
    /// - [`SiftError::WorkerPanicked`] if the producer or consumer panics.
    /// - [`SiftError::DuplicateFrame`] if a sequence index is classified
    ///   twice.
    pub fn run<S: FrameSource>(
        &self,
        models: &mut ModelRegistry,
        source: S,
    ) -> Result<Extraction, SiftError> {
        self.options.validate()?;

        let total = source.estimated_len();
        log::info!("Classifying about {total} frames");

        let classifier = self.options.classifier();
        let tagger = self.options.tagger_model.as_str();
        let scorer = self.options.aesthetic_model.as_str();
        let poll_interval = self.options.poll_interval;
        let mut tracker = ProgressTracker::new(self.options.progress.clone(), total);

        let producer_done = AtomicBool::new(false);
        let (frame_sender, frame_receiver) = mpsc::sync_channel(self.options.queue_capacity);
        let (outcome_sender, outcome_receiver) = mpsc::channel();

        let (collected, consumed, produced) = thread::scope(|scope| {
            let producer_done = &producer_done;
            let classifier = &classifier;

            let producer =
                scope.spawn(move || produce(source, frame_sender, producer_done));
            let consumer = scope.spawn(move || {
                consume(models, classifier, tagger, scorer, frame_receiver, outcome_sender)
            });

            let collected = collect(outcome_receiver, producer_done, &mut tracker, poll_interval);
            (collected, consumer.join(), producer.join())
        });

        let produced = produced.map_err(|_| SiftError::WorkerPanicked("producer"))?;
        consumed.map_err(|_| SiftError::WorkerPanicked("consumer"))??;
        let (kept, excluded) = collected?;

        tracker.finish();
        log::debug!(
            "Produced {produced} frames, collected {}",
            kept.len() + excluded.len()
        );

        let extraction = Extraction {
            summary: format!(
                "Extracted {} frames: {} kept, {} excluded",
                kept.len() + excluded.len(),
                kept.len(),
                excluded.len()
            ),
            kept: kept.into_ordered(),
            excluded: excluded.into_ordered(),
        };
        log::info!("{}", extraction.summary);
        Ok(extraction)
    }
}

/// Producer: push every sampled frame onto the hand-off queue.
fn produce<S: FrameSource>(source: S, frames: SyncSender<Frame>, done: &AtomicBool) -> u64 {
    let mut sent = 0;
    for frame in source.into_frames() {
        if frames.send(frame).is_err() {
            log::debug!("Consumer stopped after {sent} frames");
            break;
        }
        sent += 1;
    }
    drop(frames);
    done.store(true, Ordering::Release);
    sent
}

/// Consumer: tag, score and classify frames until the queue closes.
fn consume(
    models: &mut ModelRegistry,
    classifier: &Classifier,
    tagger: &str,
    scorer: &str,
    frames: Receiver<Frame>,
    outcomes: Sender<Classified>,
) -> Result<(), SiftError> {
    for frame in frames {
        let tags = models.interrogate(tagger, &frame.image)?;
        let score = models.predict(scorer, &frame.image)?;
        let outcome = classifier.classify(&tags, score);
        log::debug!("Frame {}: score {score:.2}, {outcome}", frame.index);

        if outcomes.send(Classified { outcome, frame }).is_err() {
            break;
        }
    }
    Ok(())
}

/// Collector: file outcomes by index until the consumer is finished.
fn collect(
    outcomes: Receiver<Classified>,
    producer_done: &AtomicBool,
    tracker: &mut ProgressTracker,
    poll_interval: Duration,
) -> Result<(FrameSet, FrameSet), SiftError> {
    let mut kept = FrameSet::new();
    let mut excluded = FrameSet::new();

    loop {
        match outcomes.recv_timeout(poll_interval) {
            Ok(Classified { outcome, frame }) => {
                if kept.contains(frame.index) || excluded.contains(frame.index) {
                    return Err(SiftError::DuplicateFrame(frame.index));
                }
                match outcome {
                    Outcome::Kept => {
                        kept.insert(frame);
                        tracker.record_kept();
                    }
                    Outcome::Excluded => {
                        excluded.insert(frame);
                        tracker.record_excluded();
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::trace!(
                    "No outcome within {poll_interval:?} (producer done: {})",
                    producer_done.load(Ordering::Acquire)
                );
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if !producer_done.load(Ordering::Acquire) {
        log::debug!(
            "Consumer stopped before the producer finished ({} frames collected)",
            tracker.processed()
        );
    }
    Ok((kept, excluded))
}

/// The outcome of a completed run: both partitions in index order.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    kept: Vec<Frame>,
    excluded: Vec<Frame>,
    summary: String,
}

impl Extraction {
    /// Frames that passed every filter, by ascending index.
    pub fn kept(&self) -> &[Frame] {
        &self.kept
    }

    /// Frames that were excluded, by ascending index.
    pub fn excluded(&self) -> &[Frame] {
        &self.excluded
    }

    /// Human-readable summary of the run.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Number of frames classified.
    pub fn len(&self) -> usize {
        self.kept.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if either partition has at least `limit` frames and
    /// would be cut by [`display`](Extraction::display).
    pub fn is_truncated(&self, limit: usize) -> bool {
        self.kept.len() >= limit || self.excluded.len() >= limit
    }

    /// The first `limit` images of each partition, for showing to a user.
    /// The stored partitions are not affected.
    pub fn display(&self, limit: usize) -> (Vec<&DynamicImage>, Vec<&DynamicImage>) {
        (first_images(&self.kept, limit), first_images(&self.excluded, limit))
    }

    /// Consume into `(kept, excluded)`.
    pub fn into_parts(self) -> (Vec<Frame>, Vec<Frame>) {
        (self.kept, self.excluded)
    }
}

fn first_images(frames: &[Frame], limit: usize) -> Vec<&DynamicImage> {
    frames.iter().take(limit).map(|frame| &frame.image).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(kept: u64, excluded: u64) -> Extraction {
        let frames = |range: std::ops::Range<u64>| {
            range
                .map(|index| Frame {
                    index,
                    image: DynamicImage::new_luma8(1, 1),
                })
                .collect()
        };
        Extraction {
            kept: frames(0..kept),
            excluded: frames(kept..kept + excluded),
            summary: String::new(),
        }
    }

    #[test]
    fn display_truncates_without_touching_storage() {
        let extraction = extraction(45, 3);
        assert!(extraction.is_truncated(30));
        let (kept, excluded) = extraction.display(30);
        assert_eq!(kept.len(), 30);
        assert_eq!(excluded.len(), 3);
        assert_eq!(extraction.kept().len(), 45);
    }

    #[test]
    fn small_runs_are_not_truncated() {
        assert!(!extraction(29, 29).is_truncated(30));
        assert!(extraction(30, 0).is_truncated(30));
    }
}
