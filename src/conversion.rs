//! Internal conversion helpers shared by the decoding modules.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg pads rows to its own alignment, so rows are copied one at a time
/// whenever the line size differs from `width * bytes_per_pixel`.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let line_size = video_frame.stride(0);
    let packed_row = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if line_size == packed_row {
        data[..packed_row * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(packed_row * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * line_size;
            buffer.extend_from_slice(&data[row_start..row_start + packed_row]);
        }
        buffer
    }
}

/// Frames per second from a rational rate, or `None` for a zero denominator.
pub(crate) fn rate_to_fps(rate: Rational) -> Option<f64> {
    if rate.denominator() == 0 || rate.numerator() <= 0 {
        None
    } else {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::rate_to_fps;
    use ffmpeg_next::Rational;

    #[test]
    fn rate_to_fps_handles_zero_denominator() {
        assert_eq!(rate_to_fps(Rational::new(30, 0)), None);
        assert_eq!(rate_to_fps(Rational::new(0, 1)), None);
    }

    #[test]
    fn rate_to_fps_ntsc() {
        let fps = rate_to_fps(Rational::new(30_000, 1_001)).unwrap();
        assert!((fps - 29.97).abs() < 0.01);
    }
}
