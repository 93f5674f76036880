//! Strided frame sampling.
//!
//! A sampled stream keeps every `stride`-th raw frame, starting with raw
//! frame 0, and numbers the kept frames with a contiguous **sequence index**
//! (0, 1, 2, ...). The index is what the rest of the crate orders by; it is
//! never the raw video frame number.
//!
//! [`Strided`] does the sampling over any raw frame iterator.
//! [`FrameSource`] is what the [`Pipeline`](crate::Pipeline) consumes: it is
//! moved into the producer thread and only turned into an iterator there, so
//! the decoder itself never crosses threads.
//!
//! # Example
//!
//! ```
//! use framesift::{FrameSource, ImageSequence};
//! use image::DynamicImage;
//!
//! let raw = vec![DynamicImage::new_rgb8(4, 4); 120];
//! let source = ImageSequence::new(raw, 60, None)?;
//! let indices: Vec<u64> = source.into_frames().map(|frame| frame.index).collect();
//! assert_eq!(indices, vec![0, 1]);
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::path::PathBuf;

use image::DynamicImage;

use crate::{error::SiftError, video::VideoFile};

/// A decoded frame and its position in the sampled stream.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based position among emitted frames.
    pub index: u64,
    /// Decoded image data.
    pub image: DynamicImage,
}

/// Lazy sampler that keeps raw frames whose position is a multiple of
/// `stride`, stopping after `max_frames` emitted frames.
#[derive(Debug)]
pub struct Strided<I> {
    raw: I,
    stride: u64,
    max_frames: Option<u64>,
    raw_position: u64,
    emitted: u64,
}

impl<I> Strided<I>
where
    I: Iterator<Item = DynamicImage>,
{
    /// Wrap a raw frame iterator.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidStride`] if `stride` is zero.
    pub fn new(raw: I, stride: u64, max_frames: Option<u64>) -> Result<Self, SiftError> {
        if stride == 0 {
            return Err(SiftError::InvalidStride);
        }
        Ok(Self {
            raw,
            stride,
            max_frames,
            raw_position: 0,
            emitted: 0,
        })
    }

    /// Number of frames emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl<I> Iterator for Strided<I>
where
    I: Iterator<Item = DynamicImage>,
{
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.max_frames.is_some_and(|max| self.emitted >= max) {
            return None;
        }

        loop {
            let image = self.raw.next()?;
            let position = self.raw_position;
            self.raw_position += 1;

            if position % self.stride == 0 {
                let frame = Frame {
                    index: self.emitted,
                    image,
                };
                self.emitted += 1;
                return Some(frame);
            }
        }
    }
}

/// Best-effort number of frames a stride will emit from `raw_count` frames.
///
/// This is `floor(raw_count / stride)`, capped by `max_frames`. It is used
/// for progress reporting only and may be one short of the real count.
pub fn estimate_emitted(raw_count: u64, stride: u64, max_frames: Option<u64>) -> u64 {
    let estimate = raw_count / stride.max(1);
    match max_frames {
        Some(max) => estimate.min(max),
        None => estimate,
    }
}

/// A finite, non-restartable producer of sampled frames.
///
/// Implementations are moved into the pipeline's producer thread, hence
/// `Send`. The iterator returned by [`into_frames`](FrameSource::into_frames)
/// is created on that thread and does not need to be `Send`.
pub trait FrameSource: Send {
    /// Expected number of emitted frames, used for progress only.
    fn estimated_len(&self) -> u64;

    /// Consume the source and return the lazy frame sequence.
    ///
    /// Failures to open or decode are logged and end the sequence early;
    /// they are never reported as errors.
    fn into_frames(self) -> Box<dyn Iterator<Item = Frame>>;
}

/// A [`FrameSource`] over a video file on disk.
#[derive(Debug, Clone)]
pub struct VideoSource {
    path: PathBuf,
    stride: u64,
    max_frames: Option<u64>,
    estimated_len: u64,
}

impl VideoSource {
    /// Create a source that samples `path` every `stride` raw frames.
    ///
    /// The file is probed once here to estimate the frame count; an
    /// unreadable file gives an estimate of zero and an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidStride`] if `stride` is zero.
    pub fn new<P: Into<PathBuf>>(
        path: P,
        stride: u64,
        max_frames: Option<u64>,
    ) -> Result<Self, SiftError> {
        if stride == 0 {
            return Err(SiftError::InvalidStride);
        }
        let path = path.into();
        let raw_count = match VideoFile::open(&path) {
            Ok(file) => file.metadata().frame_count,
            Err(_) => 0,
        };
        Ok(Self {
            estimated_len: estimate_emitted(raw_count, stride, max_frames),
            path,
            stride,
            max_frames,
        })
    }
}

impl FrameSource for VideoSource {
    fn estimated_len(&self) -> u64 {
        self.estimated_len
    }

    fn into_frames(self) -> Box<dyn Iterator<Item = Frame>> {
        let stride = self.stride;
        let opened = VideoFile::open(&self.path).and_then(|file| file.into_sampled_frames(stride));
        let raw = match opened {
            Ok(raw) => raw,
            Err(error) => {
                log::warn!("Could not open the video file {}: {error}", self.path.display());
                return Box::new(std::iter::empty());
            }
        };

        let path = self.path;
        let decoded = raw.map_while(move |result| match result {
            Ok(image) => Some(image),
            Err(error) => {
                log::warn!("Stopped decoding {}: {error}", path.display());
                None
            }
        });

        // The decoder already dropped the frames between strides.
        match Strided::new(decoded, 1, self.max_frames) {
            Ok(frames) => Box::new(frames),
            Err(_) => Box::new(std::iter::empty()),
        }
    }
}

/// A [`FrameSource`] over frames that are already decoded.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    images: Vec<DynamicImage>,
    stride: u64,
    max_frames: Option<u64>,
}

impl ImageSequence {
    /// Sample `images` (raw frames in order) every `stride` frames.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidStride`] if `stride` is zero.
    pub fn new(
        images: Vec<DynamicImage>,
        stride: u64,
        max_frames: Option<u64>,
    ) -> Result<Self, SiftError> {
        if stride == 0 {
            return Err(SiftError::InvalidStride);
        }
        Ok(Self {
            images,
            stride,
            max_frames,
        })
    }
}

impl FrameSource for ImageSequence {
    fn estimated_len(&self) -> u64 {
        estimate_emitted(self.images.len() as u64, self.stride, self.max_frames)
    }

    fn into_frames(self) -> Box<dyn Iterator<Item = Frame>> {
        match Strided::new(self.images.into_iter(), self.stride, self.max_frames) {
            Ok(frames) => Box::new(frames),
            Err(_) => Box::new(std::iter::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(count: usize) -> impl Iterator<Item = DynamicImage> {
        (0..count).map(|_| DynamicImage::new_rgb8(2, 2))
    }

    #[test]
    fn zero_stride_rejected() {
        assert!(matches!(
            Strided::new(raw(3), 0, None),
            Err(SiftError::InvalidStride)
        ));
    }

    #[test]
    fn emitted_counter_tracks_output() {
        let mut frames = Strided::new(raw(10), 3, None).unwrap();
        frames.next();
        frames.next();
        assert_eq!(frames.emitted(), 2);
    }

    #[test]
    fn estimate_is_floor_and_capped() {
        assert_eq!(estimate_emitted(120, 60, None), 2);
        assert_eq!(estimate_emitted(121, 60, None), 2);
        assert_eq!(estimate_emitted(1000, 1, Some(12)), 12);
        assert_eq!(estimate_emitted(5, 0, None), 5);
    }
}
