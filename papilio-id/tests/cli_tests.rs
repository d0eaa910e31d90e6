//! papilio-identify rendering and exit status
//!
//! Runs the one-shot identification against the fixture root with a
//! deterministic model, the same way the binary does after startup.

mod helpers;

use helpers::*;
use papilio_id::cli::{exit_code, identify_image, CliOutcome, IMAGE_PREVIEW_CHARS};
use serde_json::Value;
use std::path::PathBuf;

fn photo(fixture: &Fixture) -> PathBuf {
    let path = fixture.root.path().join("photo.png");
    std::fs::write(&path, png_bytes()).unwrap();
    path
}

#[test]
fn test_identified_exits_zero_with_truncated_image() {
    let fixture = Fixture::new();
    let identifier = fixture.identifier(&SPECIES, MONARCH_ID);

    let result = identify_image(&identifier, &photo(&fixture), false);
    assert_eq!(exit_code(&result), 0);

    let (outcome, output) = result.unwrap();
    assert_eq!(outcome, CliOutcome::Identified);

    let report: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["name"], "MONARCH");
    assert_eq!(report["wingspan_mm"], 95);

    let image = report["image"].as_str().unwrap();
    assert!(image.starts_with("data:image/jpeg;base64,"));
    assert!(image.ends_with("..."));
    assert_eq!(image.chars().count(), IMAGE_PREVIEW_CHARS + 3);
}

#[test]
fn test_full_image_is_not_truncated() {
    let fixture = Fixture::new();
    let identifier = fixture.identifier(&SPECIES, MONARCH_ID);

    let (_, output) = identify_image(&identifier, &photo(&fixture), true).unwrap();
    let report: Value = serde_json::from_str(&output).unwrap();
    let image = report["image"].as_str().unwrap();

    assert!(image.chars().count() > IMAGE_PREVIEW_CHARS + 3);
    assert!(!image.ends_with("..."));
}

#[test]
fn test_label_mismatch_exits_two() {
    let fixture = Fixture::new();
    let mut labels = SPECIES.to_vec();
    labels.swap(44, 45);
    let identifier = fixture.identifier(&labels, MONARCH_ID);

    let result = identify_image(&identifier, &photo(&fixture), false);
    assert_eq!(exit_code(&result), 2);

    let (outcome, message) = result.unwrap();
    assert_eq!(outcome, CliOutcome::NotIdentified);
    assert!(message.starts_with("Could not identify"));
}

#[test]
fn test_unreadable_image_exits_one() {
    let fixture = Fixture::new();
    let identifier = fixture.identifier(&SPECIES, MONARCH_ID);

    let result = identify_image(&identifier, &fixture.root.path().join("missing.png"), false);
    assert_eq!(exit_code(&result), 1);
    assert!(format!("{:#}", result.unwrap_err()).contains("missing.png"));
}
