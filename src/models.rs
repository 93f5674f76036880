//! Caller-owned model registry.
//!
//! [`ModelRegistry`] holds every tagger and aesthetic model by name. Models
//! are registered as loaders and only constructed on first use, or when
//! [`load_tagger`](ModelRegistry::load_tagger) /
//! [`load_scorer`](ModelRegistry::load_scorer) is called. [`unload`]
//! releases and drops everything that was loaded; the loaders stay, so the
//! next run loads again.
//!
//! The registry is passed by `&mut` into [`Pipeline::run`](crate::Pipeline)
//! and is only touched from the consumer thread during a run.
//!
//! [`unload`]: ModelRegistry::unload
//!
//! # Example
//!
//! ```no_run
//! use framesift::{CommandScorer, CommandTagger, ModelRegistry};
//!
//! let mut models = ModelRegistry::new();
//! models.register_tagger("wd14-vit-v2", || {
//!     Ok(Box::new(CommandTagger::new("wd14-tag").arg("--model").arg("wd14-vit-v2")))
//! });
//! models.register_scorer("sac+logos+ava1-l14-linearMSE", || {
//!     Ok(Box::new(CommandScorer::new("laion-score", "sac+logos+ava1-l14-linearMSE")))
//! });
//! ```

use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter, Result as FmtResult},
};

use image::DynamicImage;

use crate::{
    aesthetic::{AestheticModel, AestheticScorer},
    error::SiftError,
    tags::{TagClassifier, TagMap},
};

type Loader<M> = Box<dyn FnMut() -> Result<M, SiftError> + Send>;

struct Slot<M> {
    loader: Loader<M>,
    loaded: Option<M>,
}

impl<M> Slot<M> {
    fn new(loader: Loader<M>) -> Self {
        Self {
            loader,
            loaded: None,
        }
    }

    fn get_or_load(&mut self, name: &str) -> Result<&mut M, SiftError> {
        if self.loaded.is_none() {
            log::info!("Loading model {name}...");
            self.loaded = Some((self.loader)()?);
        }
        self.loaded.as_mut().ok_or_else(|| SiftError::UnknownModel(name.to_string()))
    }
}

/// Registry of named taggers and aesthetic models with explicit load and
/// unload.
#[derive(Default)]
pub struct ModelRegistry {
    taggers: BTreeMap<String, Slot<Box<dyn TagClassifier>>>,
    scorers: BTreeMap<String, Slot<Box<dyn AestheticModel>>>,
}

impl Debug for ModelRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ModelRegistry")
            .field("taggers", &self.tagger_names().collect::<Vec<_>>())
            .field("scorers", &self.scorer_names().collect::<Vec<_>>())
            .field("loaded", &self.loaded_models())
            .finish()
    }
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tagger under `name`. Replaces any previous registration,
    /// dropping a loaded instance.
    pub fn register_tagger<F>(&mut self, name: impl Into<String>, loader: F)
    where
        F: FnMut() -> Result<Box<dyn TagClassifier>, SiftError> + Send + 'static,
    {
        self.taggers.insert(name.into(), Slot::new(Box::new(loader)));
    }

    /// Register an aesthetic model under `name`. Replaces any previous
    /// registration, dropping a loaded instance.
    pub fn register_scorer<F>(&mut self, name: impl Into<String>, loader: F)
    where
        F: FnMut() -> Result<Box<dyn AestheticModel>, SiftError> + Send + 'static,
    {
        self.scorers.insert(name.into(), Slot::new(Box::new(loader)));
    }

    /// Names of registered taggers.
    pub fn tagger_names(&self) -> impl Iterator<Item = &str> {
        self.taggers.keys().map(String::as_str)
    }

    /// Names of registered aesthetic models.
    pub fn scorer_names(&self) -> impl Iterator<Item = &str> {
        self.scorers.keys().map(String::as_str)
    }

    /// Load the tagger registered as `name` if it is not loaded yet.
    ///
    /// # Errors
    ///
    /// [`SiftError::UnknownModel`] if nothing is registered under `name`,
    /// or the loader's error.
    pub fn load_tagger(&mut self, name: &str) -> Result<(), SiftError> {
        self.tagger_mut(name).map(|_| ())
    }

    /// Load the aesthetic model registered as `name` if it is not loaded yet.
    ///
    /// # Errors
    ///
    /// [`SiftError::UnknownModel`] if nothing is registered under `name`,
    /// or the loader's error.
    pub fn load_scorer(&mut self, name: &str) -> Result<(), SiftError> {
        self.scorer_mut(name).map(|_| ())
    }

    /// Returns `true` if a model with this name is currently loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.taggers.get(name).is_some_and(|slot| slot.loaded.is_some())
            || self.scorers.get(name).is_some_and(|slot| slot.loaded.is_some())
    }

    /// Names of every loaded model.
    pub fn loaded_models(&self) -> Vec<&str> {
        let taggers = self
            .taggers
            .iter()
            .filter(|(_, slot)| slot.loaded.is_some())
            .map(|(name, _)| name.as_str());
        let scorers = self
            .scorers
            .iter()
            .filter(|(_, slot)| slot.loaded.is_some())
            .map(|(name, _)| name.as_str());
        taggers.chain(scorers).collect()
    }

    /// Tag a frame with the tagger registered as `tagger`, loading it first
    /// if needed.
    ///
    /// # Errors
    ///
    /// [`SiftError::UnknownModel`], a load error, or the tagger's error.
    pub fn interrogate(&mut self, tagger: &str, image: &DynamicImage) -> Result<TagMap, SiftError> {
        self.tagger_mut(tagger)?.interrogate(image)
    }

    /// Unload every loaded tagger and aesthetic model.
    ///
    /// Returns `true` when every tagger reported a clean unload.
    pub fn unload(&mut self) -> bool {
        let mut clean = true;
        for (name, slot) in &mut self.taggers {
            if let Some(mut tagger) = slot.loaded.take() {
                log::info!("Unloading tagger {name}");
                clean &= tagger.unload();
            }
        }
        AestheticScorer::unload(self);
        clean
    }

    fn tagger_mut(&mut self, name: &str) -> Result<&mut Box<dyn TagClassifier>, SiftError> {
        if !self.taggers.contains_key(name) {
            return Err(unknown_model("tagger", name, self.tagger_names()));
        }
        self.taggers
            .get_mut(name)
            .ok_or_else(|| SiftError::UnknownModel(name.to_string()))?
            .get_or_load(name)
    }

    fn scorer_mut(&mut self, name: &str) -> Result<&mut Box<dyn AestheticModel>, SiftError> {
        if !self.scorers.contains_key(name) {
            return Err(unknown_model("aesthetic model", name, self.scorer_names()));
        }
        self.scorers
            .get_mut(name)
            .ok_or_else(|| SiftError::UnknownModel(name.to_string()))?
            .get_or_load(name)
    }
}

fn unknown_model<'a>(
    kind: &str,
    name: &str,
    registered: impl Iterator<Item = &'a str>,
) -> SiftError {
    let registered = registered.collect::<Vec<_>>();
    if registered.is_empty() {
        log::warn!("No {kind} named {name}; none are registered");
    } else {
        log::warn!("No {kind} named {name}; registered: {}", registered.join(", "));
    }
    SiftError::UnknownModel(name.to_string())
}

impl AestheticScorer for ModelRegistry {
    fn predict(&mut self, model: &str, image: &DynamicImage) -> Result<f32, SiftError> {
        self.scorer_mut(model)?.score(image)
    }

    fn unload(&mut self) {
        for (name, slot) in &mut self.scorers {
            if let Some(mut scorer) = slot.loaded.take() {
                log::info!("Unloading aesthetic model {name}");
                scorer.unload();
            }
        }
    }
}
