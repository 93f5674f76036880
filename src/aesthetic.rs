//! Aesthetic scoring.
//!
//! An [`AestheticScorer`] maps a frame to a scalar quality score, usually
//! in `[0, 10]`. The scorer is addressed by model name because one registry
//! holds several regressors side by side.

use std::fmt::{Display, Formatter, Result as FmtResult};

use image::DynamicImage;

use crate::error::SiftError;

/// Scores frames with a named aesthetic model.
pub trait AestheticScorer: Send {
    /// Score `image` with the model registered as `model`.
    fn predict(&mut self, model: &str, image: &DynamicImage) -> Result<f32, SiftError>;

    /// Release every loaded regressor together with its embedding backbone.
    fn unload(&mut self);
}

/// A single aesthetic regressor, as held by a
/// [`ModelRegistry`](crate::ModelRegistry).
pub trait AestheticModel: Send {
    /// Score a frame.
    fn score(&mut self, image: &DynamicImage) -> Result<f32, SiftError>;

    /// Release the model's resources. Idempotent.
    fn unload(&mut self);
}

/// The aesthetic regressors the extension offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AestheticModelKind {
    /// `sac+logos+ava1-l14-linearMSE`. This is the default.
    #[default]
    SacLogosAva1,
    /// `ava+logos-l14-linearMSE`.
    AvaLogos,
}

impl AestheticModelKind {
    /// All known aesthetic models.
    pub const ALL: [AestheticModelKind; 2] =
        [AestheticModelKind::SacLogosAva1, AestheticModelKind::AvaLogos];

    /// Registry name of the model.
    pub fn name(self) -> &'static str {
        match self {
            AestheticModelKind::SacLogosAva1 => "sac+logos+ava1-l14-linearMSE",
            AestheticModelKind::AvaLogos => "ava+logos-l14-linearMSE",
        }
    }

    /// Look a model up by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl Display for AestheticModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
