//! Index-keyed result sets.
//!
//! Frames reach the collector in whatever order the consumer finishes them.
//! [`FrameSet`] keys them by sequence index so reading it back is always in
//! ascending index order, however they arrived.

use std::collections::BTreeMap;

use image::DynamicImage;

use crate::sample::Frame;

/// Frames of one outcome, keyed by sequence index.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    frames: BTreeMap<u64, DynamicImage>,
}

impl FrameSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a frame. Returns the image previously stored at the same
    /// index, if any.
    pub fn insert(&mut self, frame: Frame) -> Option<DynamicImage> {
        self.frames.insert(frame.index, frame.image)
    }

    /// Returns `true` if a frame with this index is present.
    pub fn contains(&self, index: u64) -> bool {
        self.frames.contains_key(&index)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the set holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sequence indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.frames.keys().copied()
    }

    /// Consume the set into frames ordered by index.
    pub fn into_ordered(self) -> Vec<Frame> {
        self.frames
            .into_iter()
            .map(|(index, image)| Frame { index, image })
            .collect()
    }
}

impl FromIterator<Frame> for FrameSet {
    fn from_iter<T: IntoIterator<Item = Frame>>(iter: T) -> Self {
        let mut set = Self::new();
        for frame in iter {
            set.insert(frame);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: u64) -> Frame {
        Frame {
            index,
            image: DynamicImage::new_luma8(1, 1),
        }
    }

    #[test]
    fn out_of_order_inserts_read_back_sorted() {
        let set: FrameSet = [5, 1, 3, 0].into_iter().map(frame).collect();
        assert_eq!(set.indices().collect::<Vec<_>>(), vec![0, 1, 3, 5]);
    }

    #[test]
    fn insert_reports_previous() {
        let mut set = FrameSet::new();
        assert!(set.insert(frame(2)).is_none());
        assert!(set.insert(frame(2)).is_some());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordered_conversion_is_idempotent() {
        let set: FrameSet = [4, 0, 2, 9, 1].into_iter().map(frame).collect();

        let first_read: Vec<u64> = set.indices().collect();
        let second_read: Vec<u64> = set.indices().collect();
        assert_eq!(first_read, second_read);

        let ordered: Vec<u64> = set.clone().into_ordered().iter().map(|f| f.index).collect();
        assert_eq!(ordered, first_read);

        let rebuilt: FrameSet = set.into_ordered().into_iter().collect();
        let reordered: Vec<u64> = rebuilt.into_ordered().iter().map(|f| f.index).collect();
        assert_eq!(reordered, ordered);
    }
}
