//! FFmpeg-backed video decoding.
//!
//! [`VideoFile`] opens a container, picks the best video stream, and caches
//! its [`VideoMetadata`]. [`RawFrames`] takes ownership of the file and
//! decodes every frame in presentation order, one packet at a time, so the
//! whole video is never held in memory.
//!
//! # Example
//!
//! ```no_run
//! use framesift::VideoFile;
//!
//! let file = VideoFile::open("input.mp4")?;
//! println!("{} frames", file.metadata().frame_count);
//!
//! for (raw_position, result) in file.into_raw_frames()?.enumerate() {
//!     let image = result?;
//!     image.save(format!("raw_{raw_position}.png"))?;
//! }
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{conversion, error::SiftError, metadata::VideoMetadata};

/// An opened video file.
///
/// Created via [`VideoFile::open`]. Holds the demuxer context and the
/// metadata of the best video stream.
pub struct VideoFile {
    input_context: Input,
    metadata: VideoMetadata,
    stream_index: usize,
    path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("metadata", &self.metadata)
            .field("stream_index", &self.stream_index)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, and reads the
    /// metadata of the best video stream.
    ///
    /// # Errors
    ///
    /// - [`SiftError::FileOpen`] if the file cannot be opened or its codec
    ///   parameters cannot be read.
    /// - [`SiftError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SiftError> {
        let path = path.as_ref().to_path_buf();

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| SiftError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SiftError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SiftError::NoVideoStream)?;
        let stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| SiftError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frames_per_second = conversion::rate_to_fps(stream.avg_frame_rate())
            .or_else(|| conversion::rate_to_fps(stream.rate()))
            .unwrap_or(0.0);

        let frame_count = match stream.frames() {
            count if count > 0 => count as u64,
            _ => (duration.as_secs_f64() * frames_per_second) as u64,
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec,
        };

        log::info!(
            "Opened video file: {} ({}x{}, {:.2} fps, {} frames, codec={})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            metadata,
            stream_index,
            path,
        })
    }

    /// Metadata of the video stream, read at open time.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn the file into a lazy iterator over every decoded frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder or the RGB converter cannot be
    /// created for this stream.
    pub fn into_raw_frames(self) -> Result<RawFrames, SiftError> {
        RawFrames::new(self, 1)
    }

    /// Turn the file into a lazy iterator over every `stride`-th decoded
    /// frame, starting with raw frame 0.
    ///
    /// Skipped frames are decoded but never converted to RGB.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidStride`] if `stride` is zero, or an error
    /// if the decoder or the RGB converter cannot be created.
    pub fn into_sampled_frames(self, stride: u64) -> Result<RawFrames, SiftError> {
        if stride == 0 {
            return Err(SiftError::InvalidStride);
        }
        RawFrames::new(self, stride)
    }
}

/// A lazy iterator over the decoded frames of a [`VideoFile`], as RGB8.
///
/// Yields the frames at raw positions 0, `stride`, 2 * `stride`, ... in
/// decode order. After the first error the iterator is fused.
pub struct RawFrames {
    file: VideoFile,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    width: u32,
    height: u32,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    stride: u64,
    position: u64,
    eof_sent: bool,
    done: bool,
}

impl RawFrames {
    fn new(file: VideoFile, stride: u64) -> Result<Self, SiftError> {
        let stream = file
            .input_context
            .stream(file.stream_index)
            .ok_or(SiftError::NoVideoStream)?;
        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        Ok(Self {
            file,
            decoder,
            scaler,
            width,
            height,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            stride,
            position: 0,
            eof_sent: false,
            done: false,
        })
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, SiftError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let buffer = conversion::frame_to_buffer(&self.rgb_frame, self.width, self.height, 3);
        let image = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            SiftError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }

    fn fail(&mut self, error: SiftError) -> Option<Result<DynamicImage, SiftError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for RawFrames {
    type Item = Result<DynamicImage, SiftError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let position = self.position;
                self.position += 1;
                if position % self.stride != 0 {
                    continue;
                }
                return match self.convert_current_frame() {
                    Ok(image) => Some(Ok(image)),
                    Err(error) => self.fail(error),
                };
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.file.input_context) {
                Ok(()) => {
                    if packet.stream() == self.file.stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            return self.fail(error.into());
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(error.into());
                    }
                    self.eof_sent = true;
                }
                // Corrupt packet; skip it and keep reading.
                Err(_) => {}
            }
        }
    }
}
