//! Adapters that run an external program per frame.
//!
//! Each frame is written to a temporary PNG and its path is passed as the
//! last argument. [`CommandTagger`] expects a JSON object of tag name to
//! confidence on stdout; [`CommandScorer`] expects a single number and is
//! called with `--model <name>` before the image path. Any tagger or
//! regressor that can be wrapped in a script can drive the pipeline this way.

use std::{
    ffi::OsString,
    path::Path,
    process::{Command, Output},
};

use image::{DynamicImage, ImageFormat};
use serde_json::Value;

use crate::{
    aesthetic::AestheticModel,
    error::SiftError,
    tags::{TagClassifier, TagMap},
};

#[derive(Debug, Clone)]
struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    fn label(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn model_error(&self, reason: impl Into<String>) -> SiftError {
        SiftError::Model {
            model: self.label(),
            reason: reason.into(),
        }
    }

    /// Run the program on `image` with `extra` arguments and return stdout.
    fn run(&self, extra: &[&str], image: &DynamicImage) -> Result<String, SiftError> {
        let file = tempfile::Builder::new()
            .prefix("framesift-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(file.path(), ImageFormat::Png)?;

        let output = self.spawn(extra, file.path())?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.model_error(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| self.model_error("output is not valid UTF-8"))
    }

    fn spawn(&self, extra: &[&str], image_path: &Path) -> Result<Output, SiftError> {
        Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .arg(image_path)
            .output()
            .map_err(|error| self.model_error(format!("failed to start: {error}")))
    }
}

/// A [`TagClassifier`] backed by an external command.
///
/// # Example
///
/// ```no_run
/// use framesift::{CommandTagger, TagClassifier};
/// use image::DynamicImage;
///
/// let mut tagger = CommandTagger::new("wd14-tag").arg("--model").arg("wd14-vit-v2");
/// let tags = tagger.interrogate(&DynamicImage::new_rgb8(64, 64))?;
/// # Ok::<(), framesift::SiftError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CommandTagger {
    invocation: Invocation,
}

impl CommandTagger {
    /// Tag with `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            invocation: Invocation::new(program),
        }
    }

    /// Append a fixed argument passed before the image path.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.invocation.args.push(arg.into());
        self
    }
}

impl TagClassifier for CommandTagger {
    fn interrogate(&mut self, image: &DynamicImage) -> Result<TagMap, SiftError> {
        let stdout = self.invocation.run(&[], image)?;
        parse_tag_map(&stdout).map_err(|reason| self.invocation.model_error(reason))
    }

    fn unload(&mut self) -> bool {
        // One process per frame; nothing stays resident.
        true
    }
}

/// An [`AestheticModel`] backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandScorer {
    invocation: Invocation,
    model: String,
}

impl CommandScorer {
    /// Score with `program`, passing `--model <model>` on every call.
    pub fn new(program: impl Into<OsString>, model: impl Into<String>) -> Self {
        Self {
            invocation: Invocation::new(program),
            model: model.into(),
        }
    }

    /// Append a fixed argument passed before `--model`.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.invocation.args.push(arg.into());
        self
    }
}

impl AestheticModel for CommandScorer {
    fn score(&mut self, image: &DynamicImage) -> Result<f32, SiftError> {
        let stdout = self.invocation.run(&["--model", &self.model], image)?;
        parse_score(&stdout).map_err(|reason| self.invocation.model_error(reason))
    }

    fn unload(&mut self) {}
}

fn parse_tag_map(stdout: &str) -> Result<TagMap, String> {
    let value: Value =
        serde_json::from_str(stdout.trim()).map_err(|error| format!("invalid JSON: {error}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "expected a JSON object of tag confidences".to_string())?;

    object
        .iter()
        .map(|(tag, confidence)| {
            confidence
                .as_f64()
                .map(|c| (tag.clone(), c as f32))
                .ok_or_else(|| format!("confidence for {tag} is not a number"))
        })
        .collect()
}

fn parse_score(stdout: &str) -> Result<f32, String> {
    let trimmed = stdout.trim();
    let score = trimmed
        .parse::<f32>()
        .map_err(|_| format!("expected a score, got {trimmed:?}"))?;
    if score.is_finite() {
        Ok(score)
    } else {
        Err(format!("score is not finite: {score}"))
    }
}
