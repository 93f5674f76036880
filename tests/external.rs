//! External command adapter tests.
//!
//! The "models" are small `sh` scripts, so these only run on Unix.

#![cfg(unix)]

mod common;

use std::time::Duration;

use framesift::{
    AestheticModel, BanList, CommandScorer, CommandTagger, ImageSequence, ModelRegistry, Pipeline,
    SiftError, SiftOptions, TagClassifier,
};

fn tagger(script: &str) -> CommandTagger {
    // `sh -c script name image`: the image path arrives as $1.
    CommandTagger::new("sh").arg("-c").arg(script).arg("tagger")
}

fn scorer(script: &str) -> CommandScorer {
    // The scorer adds `--model <name>`, so the image path arrives as $3.
    CommandScorer::new("sh", "sac+logos+ava1-l14-linearMSE")
        .arg("-c")
        .arg(script)
        .arg("scorer")
}

// ── Tagger ─────────────────────────────────────────────────────────

#[test]
fn tagger_reads_json_object() {
    let mut tagger = tagger(r#"test -s "$1" && echo '{"blurry": 0.75, "1girl": 0.5}'"#);
    let tags = tagger.interrogate(&common::frame(6.0, 0.0)).unwrap();

    assert_eq!(tags.len(), 2);
    assert!((tags["blurry"] - 0.75).abs() < 1e-6);
    assert!(tagger.unload());
}

#[test]
fn tagger_rejects_bad_output() {
    let mut tagger = tagger("echo '[1, 2]'");
    let result = tagger.interrogate(&common::frame(6.0, 0.0));
    assert!(matches!(result, Err(SiftError::Model { model, .. }) if model == "sh"));
}

#[test]
fn failing_command_is_a_model_error() {
    let mut tagger = tagger("echo broken >&2; exit 3");
    let error = tagger.interrogate(&common::frame(6.0, 0.0)).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("broken"), "unexpected message: {message}");
}

#[test]
fn missing_program_is_a_model_error() {
    let mut tagger = CommandTagger::new("framesift-no-such-tagger");
    let error = tagger.interrogate(&common::frame(6.0, 0.0)).unwrap_err();
    assert!(error.to_string().contains("failed to start"));
}

// ── Scorer ─────────────────────────────────────────────────────────

#[test]
fn scorer_passes_model_name() {
    let mut scorer = scorer(
        r#"test "$1" = --model && test "$2" = sac+logos+ava1-l14-linearMSE && test -s "$3" && echo 6.5"#,
    );
    assert_eq!(scorer.score(&common::frame(0.0, 0.0)).unwrap(), 6.5);
}

#[test]
fn scorer_rejects_non_numbers() {
    let mut scorer = scorer("echo excellent");
    assert!(matches!(
        scorer.score(&common::frame(0.0, 0.0)),
        Err(SiftError::Model { .. })
    ));
}

// ── Through the pipeline ───────────────────────────────────────────

#[test]
fn command_models_drive_a_run() {
    let mut models = ModelRegistry::new();
    models.register_tagger(common::TAGGER, || {
        Ok(Box::new(tagger(r#"echo '{"blurry": 0.1}'"#)))
    });
    models.register_scorer(common::SCORER, || Ok(Box::new(scorer("echo 7"))));

    let source = ImageSequence::new(common::frames(3, 0.0), 1, None).unwrap();
    let options = SiftOptions::new()
        .with_ban_list(BanList::new().with("blurry", 0.5))
        .with_poll_interval(Duration::from_millis(5));
    let extraction = Pipeline::new(options).run(&mut models, source).unwrap();

    assert_eq!(extraction.kept().len(), 3);
    assert!(extraction.excluded().is_empty());
}
