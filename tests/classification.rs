//! Ban list and classification tests.

use framesift::{
    BanList, Classifier, Outcome, ScoreRange, SiftError, TagMap, TaggerModel,
    any_tag_over_threshold,
};

fn tags(pairs: &[(&str, f32)]) -> TagMap {
    pairs.iter().map(|(tag, confidence)| (tag.to_string(), *confidence)).collect()
}

// ── Ban list ───────────────────────────────────────────────────────

#[test]
fn parse_default_ban_text() {
    let ban = BanList::parse(BanList::DEFAULT_TEXT, BanList::DEFAULT_THRESHOLD);
    assert_eq!(ban.tags().collect::<Vec<_>>(), ["blurry", "close-up"]);
    assert_eq!(ban.threshold("close-up"), Some(0.5));
}

#[test]
fn parse_normalises_entries() {
    let ban = BanList::parse(" simple background ,, blurry ,", 0.3);
    assert_eq!(ban.tags().collect::<Vec<_>>(), ["simple_background", "blurry"]);
    assert_eq!(ban.len(), 2);
    assert!(BanList::parse(" , ", 0.3).is_empty());
}

#[test]
fn threshold_is_inclusive() {
    let ban = BanList::new().with("blurry", 0.5);
    assert!(any_tag_over_threshold(&tags(&[("blurry", 0.5)]), &ban));
    assert!(!any_tag_over_threshold(&tags(&[("blurry", 0.49)]), &ban));
}

#[test]
fn missing_tags_never_match() {
    let ban = BanList::new().with("blurry", 0.0);
    assert!(!any_tag_over_threshold(&tags(&[("sharp", 1.0)]), &ban));
}

#[test]
fn empty_ban_list_never_matches() {
    let ban = BanList::new();
    assert!(!any_tag_over_threshold(&tags(&[("blurry", 1.0)]), &ban));
}

#[test]
fn first_match_follows_list_order() {
    let ban: BanList = [("close-up", 0.5), ("blurry", 0.5)].into_iter().collect();
    let frame_tags = tags(&[("blurry", 0.9), ("close-up", 0.8)]);
    assert_eq!(ban.first_match(&frame_tags).map(|(tag, _)| tag), Some("close-up"));
}

#[test]
fn tagger_speeds() {
    assert_eq!(TaggerModel::from_speed("faster"), Some(TaggerModel::Wd14VitV2));
    assert_eq!(TaggerModel::from_speed("slower"), Some(TaggerModel::Wd14SwinV2V2));
    assert_eq!(TaggerModel::from_speed("fastest"), None);
    assert_eq!(TaggerModel::Wd14SwinV2V2.name(), "wd14-swinv2-v2");
}

// ── Classification ─────────────────────────────────────────────────

#[test]
fn blurry_frame_is_excluded_regardless_of_score() {
    let classifier = Classifier::new(BanList::new().with("blurry", 0.5), ScoreRange::default());
    let frame_tags = tags(&[("blurry", 0.6)]);
    for score in [0.0, 5.0, 7.5, 10.0] {
        assert_eq!(classifier.classify(&frame_tags, score), Outcome::Excluded);
    }
}

#[test]
fn score_bounds_are_kept() {
    let classifier = Classifier::new(BanList::new(), ScoreRange::new(5.0, 10.0).unwrap());
    let frame_tags = TagMap::new();
    assert_eq!(classifier.classify(&frame_tags, 5.0), Outcome::Kept);
    assert_eq!(classifier.classify(&frame_tags, 10.0), Outcome::Kept);
    assert_eq!(classifier.classify(&frame_tags, 3.0), Outcome::Excluded);
    assert_eq!(classifier.classify(&frame_tags, 10.5), Outcome::Excluded);
}

#[test]
fn classification_is_deterministic() {
    let classifier = Classifier::new(BanList::new().with("blurry", 0.5), ScoreRange::default());
    let frame_tags = tags(&[("blurry", 0.2), ("1girl", 0.99)]);
    let first = classifier.classify(&frame_tags, 6.0);
    for _ in 0..10 {
        assert_eq!(classifier.classify(&frame_tags, 6.0), first);
    }
    assert_eq!(first, Outcome::Kept);
}

#[test]
fn inverted_score_range_is_rejected() {
    let error = ScoreRange::new(8.0, 2.0).unwrap_err();
    assert!(matches!(error, SiftError::InvalidScoreRange { .. }));
    assert!(error.to_string().contains("min (8) must not exceed max (2)"));
}
