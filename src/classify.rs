//! Kept / excluded classification.
//!
//! A frame is excluded when a ban-list tag fires or its aesthetic score
//! falls outside the closed [`ScoreRange`]. Either condition is enough.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{
    error::SiftError,
    tags::{BanList, TagMap},
};

/// Closed interval of acceptable aesthetic scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    min: f32,
    max: f32,
}

impl ScoreRange {
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidScoreRange`] if `min > max` or either
    /// bound is NaN.
    pub fn new(min: f32, max: f32) -> Result<Self, SiftError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(SiftError::InvalidScoreRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Returns `true` if `score` lies within `[min, max]`.
    pub fn contains(&self, score: f32) -> bool {
        score >= self.min && score <= self.max
    }
}

impl Default for ScoreRange {
    /// `[5, 10]`.
    fn default() -> Self {
        Self {
            min: 5.0,
            max: 10.0,
        }
    }
}

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The frame passes every filter.
    Kept,
    /// A banned tag fired or the score is out of range.
    Excluded,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Outcome::Kept => f.write_str("kept"),
            Outcome::Excluded => f.write_str("excluded"),
        }
    }
}

/// The filters applied to every frame of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classifier {
    ban_list: BanList,
    score_range: ScoreRange,
}

impl Classifier {
    /// Combine a ban list and a score range.
    pub fn new(ban_list: BanList, score_range: ScoreRange) -> Self {
        Self {
            ban_list,
            score_range,
        }
    }

    /// The configured ban list.
    pub fn ban_list(&self) -> &BanList {
        &self.ban_list
    }

    /// The configured score range.
    pub fn score_range(&self) -> ScoreRange {
        self.score_range
    }

    /// Returns `true` if the frame must be excluded.
    pub fn excludes(&self, tags: &TagMap, score: f32) -> bool {
        self.ban_list.first_match(tags).is_some() || !self.score_range.contains(score)
    }

    /// Classify a frame from its tags and score.
    pub fn classify(&self, tags: &TagMap, score: f32) -> Outcome {
        if self.excludes(tags, score) {
            Outcome::Excluded
        } else {
            Outcome::Kept
        }
    }
}
