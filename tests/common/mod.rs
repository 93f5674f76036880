//! Scripted models and synthetic frames shared by the integration tests.
//!
//! A synthetic frame carries its test data in its first pixel: the red
//! channel is ten times the aesthetic score and the green channel is the
//! `blurry` confidence scaled to `0..=255`.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use framesift::{AestheticModel, ModelRegistry, SiftError, TagClassifier, TagMap};
use image::{DynamicImage, Rgb, RgbImage};

pub const TAGGER: &str = "wd14-vit-v2";
pub const SCORER: &str = "sac+logos+ava1-l14-linearMSE";

/// A 2x2 frame that scores `score` and tags `blurry` at `blurry`.
pub fn frame(score: f32, blurry: f32) -> DynamicImage {
    let red = (score * 10.0).round() as u8;
    let green = (blurry * 255.0).round() as u8;
    DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([red, green, 0])))
}

/// `count` frames that all score `score` with no blurry tag.
pub fn frames(count: usize, score: f32) -> Vec<DynamicImage> {
    vec![frame(score, 0.0); count]
}

fn pixel(image: &DynamicImage) -> [u8; 3] {
    image.to_rgb8().get_pixel(0, 0).0
}

/// Tags `blurry` from the green channel.
pub struct PixelTagger;

impl TagClassifier for PixelTagger {
    fn interrogate(&mut self, image: &DynamicImage) -> Result<TagMap, SiftError> {
        let [_, green, _] = pixel(image);
        let mut tags = TagMap::new();
        tags.insert("blurry".to_string(), f32::from(green) / 255.0);
        tags.insert("1girl".to_string(), 0.9);
        Ok(tags)
    }

    fn unload(&mut self) -> bool {
        true
    }
}

/// Scores from the red channel. A blue channel of 255 fails the frame and
/// 254 panics.
pub struct PixelScorer;

impl AestheticModel for PixelScorer {
    fn score(&mut self, image: &DynamicImage) -> Result<f32, SiftError> {
        let [red, _, blue] = pixel(image);
        match blue {
            255 => Err(SiftError::Model {
                model: SCORER.to_string(),
                reason: "scripted failure".to_string(),
            }),
            254 => panic!("scripted panic"),
            _ => Ok(f32::from(red) / 10.0),
        }
    }

    fn unload(&mut self) {}
}

/// A frame that makes [`PixelScorer`] fail.
pub fn failing_frame() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([60, 0, 255])))
}

/// A frame that makes [`PixelScorer`] panic.
pub fn panicking_frame() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([60, 0, 254])))
}

/// Registry with the pixel models under the default names, plus a counter
/// of loader calls.
pub fn registry() -> (ModelRegistry, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let mut models = ModelRegistry::new();

    let counter = loads.clone();
    models.register_tagger(TAGGER, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(PixelTagger))
    });
    let counter = loads.clone();
    models.register_scorer(SCORER, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(PixelScorer))
    });

    (models, loads)
}

pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}
