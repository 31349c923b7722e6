//! Output of the precis binary on a small article
//!
//! Snapshots are inline: the expected text is part of the test.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const ARTICLE: &str = r#"{
  "url": "https://example.com/markets",
  "title": "Markets",
  "keywords": ["analysts"],
  "paragraphs": [
    {
      "sentences": [
        { "text": "Markets rose today.", "rank": 90 },
        { "text": "Analysts were  surprised.", "rank": 40 },
        { "text": "Trading volume was light.", "rank": 85 }
      ]
    },
    { "sentences": [{ "text": "More at eleven.", "rank": 95 }] }
  ]
}"#;

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let article = dir.path().join("markets.json");
    std::fs::write(&article, ARTICLE).unwrap();
    (dir, article)
}

fn run(args: &[&str], article: &Path) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_precis"))
        .arg(args[0])
        .arg(article)
        .args(&args[1..])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run precis");
    assert!(
        output.status.success(),
        "precis {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim_end().to_string()
}

#[test]
fn show_prints_visible_sentences_per_paragraph() {
    let (_dir, article) = workspace();
    insta::assert_snapshot!(run(&["show"], &article), @r###"
    # Markets

    Markets rose today. Trading volume was light.
    More at eleven.
    "###);
}

#[test]
fn show_with_keyword_reveals_matching_sentence() {
    let (_dir, article) = workspace();
    let output = run(&["show", "--keyword", "analysts"], &article);
    assert_eq!(
        output.lines().nth(2),
        Some("Markets rose today. Analysts were surprised. Trading volume was light.")
    );
}

#[test]
fn overlay_prints_one_segment_per_line() {
    let (_dir, article) = workspace();
    let output = run(&["overlay", "--range", "0/2:0,0/4:5", "--width", "10"], &article);
    insta::assert_snapshot!(output, @r###"
    0/2:0,0/4:5 "rose today"
    segment 0: top=20 left=0 width=40 height=20
    segment 1: top=40 left=0 width=40 height=20
    extent: top=20 left=0 width=40 height=40
    "###);
}

#[test]
fn overlay_of_hidden_range_reports_nothing_visible() {
    let (_dir, article) = workspace();
    let output = run(&["overlay", "--range", "1/0:0,1/0:8"], &article);
    assert_eq!(
        output,
        "1/0:0,1/0:8 \"Analysts\"\n(range is not visible at threshold 80)"
    );
}

#[test]
fn annotate_then_list_notes() {
    let (dir, article) = workspace();
    let store = dir.path().join("notes.json");
    let store = store.to_str().unwrap();

    assert_eq!(
        run(&["notes", "--store", store], &article),
        "No notes for https://example.com/markets"
    );
    assert_eq!(
        run(
            &[
                "annotate",
                "--store",
                store,
                "--range",
                "0/2:0,0/4:5",
                "--comment",
                "which index?",
                "--author",
                "ann",
            ],
            &article,
        ),
        "Stored note on \"rose today\""
    );
    insta::assert_snapshot!(run(&["notes", "--store", store], &article), @r###"
    note 1: "rose today"
      ann: which index?
    "###);
}
