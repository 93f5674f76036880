//! Multi-label tagging and the ban list.
//!
//! A [`TagClassifier`] turns a frame into a [`TagMap`] of tag name to
//! confidence. A [`BanList`] names tags that must not appear: a frame is
//! banned as soon as one ban-list tag present in its tag map reaches the
//! tag's threshold. Tags missing from the map never match.

use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use image::DynamicImage;

use crate::error::SiftError;

/// Tag name to confidence in `[0, 1]`, produced fresh for each frame.
pub type TagMap = HashMap<String, f32>;

/// Confidence above which a tag is reported in debug logs.
const HIT_LOG_THRESHOLD: f32 = 0.35;

/// A multi-label image tagger.
///
/// Only the pipeline's consumer thread calls a classifier, so
/// implementations may keep mutable state without locking.
pub trait TagClassifier: Send {
    /// Tag a frame.
    fn interrogate(&mut self, image: &DynamicImage) -> Result<TagMap, SiftError>;

    /// Release the underlying model. Returns `true` once nothing is loaded;
    /// calling it again is harmless.
    fn unload(&mut self) -> bool;
}

/// The tagging models the extension offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaggerModel {
    /// `wd14-vit-v2`, the faster model. This is the default.
    #[default]
    Wd14VitV2,
    /// `wd14-swinv2-v2`, slower but more accurate.
    Wd14SwinV2V2,
}

impl TaggerModel {
    /// All known tagger models.
    pub const ALL: [TaggerModel; 2] = [TaggerModel::Wd14VitV2, TaggerModel::Wd14SwinV2V2];

    /// Registry name of the model.
    pub fn name(self) -> &'static str {
        match self {
            TaggerModel::Wd14VitV2 => "wd14-vit-v2",
            TaggerModel::Wd14SwinV2V2 => "wd14-swinv2-v2",
        }
    }

    /// Map the speed choice shown to users (`faster` / `slower`) to a model.
    pub fn from_speed(speed: &str) -> Option<Self> {
        match speed.trim().to_ascii_lowercase().as_str() {
            "faster" => Some(TaggerModel::Wd14VitV2),
            "slower" => Some(TaggerModel::Wd14SwinV2V2),
            _ => None,
        }
    }

    /// Look a model up by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.name() == name)
    }
}

impl Display for TaggerModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Ordered mapping of forbidden tag to confidence threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BanList {
    entries: Vec<(String, f32)>,
}

impl BanList {
    /// Tags banned when nothing else is configured.
    pub const DEFAULT_TEXT: &'static str = "blurry, close-up";
    /// Threshold used when nothing else is configured.
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    /// An empty ban list. It never bans anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma-separated ban-word field.
    ///
    /// Entries are trimmed, empty entries dropped, and inner spaces replaced
    /// with underscores to match tagger vocabulary (`"simple background"`
    /// becomes `simple_background`). Every tag gets `threshold`.
    ///
    /// ```
    /// use framesift::BanList;
    ///
    /// let ban = BanList::parse("blurry, , simple background", 0.5);
    /// assert_eq!(ban.tags().collect::<Vec<_>>(), ["blurry", "simple_background"]);
    /// ```
    pub fn parse(text: &str, threshold: f32) -> Self {
        let mut ban = Self::new();
        for tag in text.split(',').map(str::trim).filter(|tag| !tag.is_empty()) {
            ban.insert(tag.replace(' ', "_"), threshold);
        }
        ban
    }

    /// Add a tag, or replace its threshold if it is already listed.
    pub fn insert<S: Into<String>>(&mut self, tag: S, threshold: f32) {
        let tag = tag.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == tag) {
            Some(entry) => entry.1 = threshold,
            None => self.entries.push((tag, threshold)),
        }
    }

    /// Builder form of [`insert`](BanList::insert).
    #[must_use]
    pub fn with<S: Into<String>>(mut self, tag: S, threshold: f32) -> Self {
        self.insert(tag, threshold);
        self
    }

    /// Banned tag names in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tag, _)| tag.as_str())
    }

    /// Threshold for `tag`, if it is banned.
    pub fn threshold(&self, tag: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == tag)
            .map(|(_, threshold)| *threshold)
    }

    /// Number of banned tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is banned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first banned tag whose confidence meets its threshold, with that
    /// confidence.
    ///
    /// Checks stop at the first match; the result as a boolean does not
    /// depend on ban-list order.
    pub fn first_match<'a>(&'a self, tags: &TagMap) -> Option<(&'a str, f32)> {
        if log::log_enabled!(log::Level::Debug) {
            let mut hits: Vec<&str> = tags
                .iter()
                .filter(|(_, confidence)| **confidence >= HIT_LOG_THRESHOLD)
                .map(|(tag, _)| tag.as_str())
                .collect();
            hits.sort_unstable();
            log::debug!("Hit tags: {hits:?}");
        }

        for (tag, threshold) in &self.entries {
            let Some(&confidence) = tags.get(tag) else {
                continue;
            };
            if confidence >= *threshold {
                log::debug!("Matched: {tag}: {:.2}%", confidence * 100.0);
                return Some((tag.as_str(), confidence));
            }
            log::debug!("Not matched: {tag}: {:.2}%", confidence * 100.0);
        }
        None
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for BanList {
    fn from_iter<T: IntoIterator<Item = (S, f32)>>(iter: T) -> Self {
        let mut ban = Self::new();
        for (tag, threshold) in iter {
            ban.insert(tag, threshold);
        }
        ban
    }
}

/// Returns `true` if any ban-list tag present in `tags` meets its threshold.
pub fn any_tag_over_threshold(tags: &TagMap, ban: &BanList) -> bool {
    ban.first_match(tags).is_some()
}
