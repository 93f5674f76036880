//! # framesift
//!
//! Sift the frames of a video into the ones worth keeping.
//!
//! `framesift` samples a video every `stride` frames, runs an aesthetic
//! regressor and a multi-label tagger on each sampled frame, and partitions
//! the frames into **kept** and **excluded** sets. A frame is excluded when
//! a ban-list tag reaches its threshold or its aesthetic score falls outside
//! the accepted range. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Classify a Video
//!
//! ```no_run
//! use framesift::{CommandScorer, CommandTagger, ModelRegistry, Pipeline, SiftOptions, VideoSource};
//!
//! let mut models = ModelRegistry::new();
//! models.register_tagger("wd14-vit-v2", || {
//!     Ok(Box::new(CommandTagger::new("wd14-tag").arg("--model").arg("wd14-vit-v2")))
//! });
//! models.register_scorer("sac+logos+ava1-l14-linearMSE", || {
//!     Ok(Box::new(CommandScorer::new("laion-score", "sac+logos+ava1-l14-linearMSE")))
//! });
//!
//! let options = SiftOptions::new().with_stride(30);
//! let source = VideoSource::new("input.mp4", options.stride(), options.max_frames())?;
//! let extraction = Pipeline::new(options).run(&mut models, source)?;
//!
//! framesift::archive::write_frames(extraction.kept(), "kept")?;
//! models.unload();
//! # Ok::<(), framesift::SiftError>(())
//! ```
//!
//! ### Sample Without Models
//!
//! ```no_run
//! use framesift::{FrameSource, VideoSource};
//!
//! let source = VideoSource::new("input.mp4", 60, Some(12))?;
//! for frame in source.into_frames() {
//!     frame.image.save(format!("preview_{}.png", frame.index))?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - **Strided sampling**: lazy, bounded, index-numbered frames from any
//!   video FFmpeg can decode
//! - **Concurrent pipeline**: a decoding producer, a model-running consumer
//!   and a collecting caller, joined by a bounded queue
//! - **Pluggable models**: [`TagClassifier`] and [`AestheticModel`] traits,
//!   with adapters that shell out to any external program
//! - **Explicit model lifecycle**: a caller-owned [`ModelRegistry`] with lazy
//!   load and explicit unload
//! - **Progress**: per-run, monotonic [`ProgressCallback`] reports
//! - **Export**: numbered PNG sequences, zipped
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod aesthetic;
pub mod archive;
pub mod classify;
pub mod configuration;
mod conversion;
pub mod error;
pub mod external;
pub mod ffmpeg;
pub mod frame_set;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod sample;
pub mod session;
pub mod tags;
pub mod video;

pub use aesthetic::{AestheticModel, AestheticModelKind, AestheticScorer};
pub use classify::{Classifier, Outcome, ScoreRange};
pub use configuration::SiftOptions;
pub use error::SiftError;
pub use external::{CommandScorer, CommandTagger};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use frame_set::FrameSet;
pub use metadata::{VideoInfo, VideoMetadata};
pub use models::ModelRegistry;
pub use pipeline::{Extraction, Pipeline};
pub use progress::{ProgressCallback, ProgressInfo};
pub use sample::{Frame, FrameSource, ImageSequence, Strided, VideoSource, estimate_emitted};
pub use session::{Gallery, Selection, Session, StatusReport};
pub use tags::{BanList, TagClassifier, TagMap, TaggerModel, any_tag_over_threshold};
pub use video::{RawFrames, VideoFile};
