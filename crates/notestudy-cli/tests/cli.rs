use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn notestudy() -> Command {
    Command::cargo_bin("notestudy").unwrap()
}

#[test]
fn test_extract_text_file_to_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(
        &input,
        "What is mitosis? Cell division.\nCapital of France: Paris\n\nThe sky looked grey today.",
    )
    .unwrap();

    let output = notestudy()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .arg("extract")
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let cards: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cards = cards.as_array().unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["question"], "What is mitosis?");
    assert_eq!(cards[0]["answer"], "Cell division.");
    assert_eq!(cards[1]["question"], "Capital of France");
    assert_eq!(cards[1]["answer"], "Paris");
}

#[test]
fn test_extract_stdin_as_text() {
    let dir = tempdir().unwrap();

    notestudy()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["extract", "-", "--format", "text"])
        .write_stdin("Photosynthesis is the process plants use to convert light into energy")
        .assert()
        .success()
        .stdout(predicate::str::contains("Q: Photosynthesis"))
        .stdout(predicate::str::contains(
            "A: the process plants use to convert light into energy",
        ));
}

#[test]
fn test_extract_csv_header() {
    let dir = tempdir().unwrap();

    notestudy()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["extract", "-", "--format", "csv"])
        .write_stdin("Capital of France: Paris")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,question,answer,source_note_id"))
        .stdout(predicate::str::contains("Capital of France,Paris"));
}

#[test]
fn test_extract_missing_file_fails() {
    let dir = tempdir().unwrap();

    notestudy()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .arg("extract")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_config_set_then_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");

    notestudy()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "batch.max_concurrent_notes", "8"])
        .assert()
        .success();

    notestudy()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "batch.max_concurrent_notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = tempdir().unwrap();

    notestudy()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["config", "set", "ocr.nonexistent", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = tempdir().unwrap();
    let pattern = dir.path().join("*.png");

    notestudy()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}
