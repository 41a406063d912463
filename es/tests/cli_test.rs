//! End-to-end tests for the `es` binary

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

fn feed_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create feed file");
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// Run `es` from an empty directory with no user config in reach
fn es(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("es").unwrap();
    cmd.current_dir(workdir.path())
        .env("XDG_CONFIG_HOME", workdir.path())
        .env("HOME", workdir.path());
    cmd
}

fn stdout_events(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_feed_streams_events_as_json_lines() {
    let workdir = TempDir::new().unwrap();
    let feed = feed_file(&[
        r#"{"kind":"think","content":"look around"}"#,
        r#"{"kind":"tool_result","tool":"bash","args":{"command":"ls"},"raw":"a.txt"}"#,
        r#"{"kind":"tool_result","tool":"finish","args":{"result":"done"}}"#,
    ]);

    let output = es(&workdir).arg("feed").arg(feed.path()).output().unwrap();
    assert!(output.status.success());

    let events = stdout_events(&output.stdout);
    let types: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap().to_string()).collect();
    assert_eq!(types, vec!["think", "toolUsed", "toolUsed", "complete"]);
    assert_eq!(events[1]["tool_detail"]["bash"]["command"], "ls");
    assert_eq!(events[3]["content"], "done");
}

#[test]
fn test_feed_reports_rejected_records() {
    let workdir = TempDir::new().unwrap();
    let feed = feed_file(&[
        r#"{"kind":"tool_result","tool":"browser_use","args":{"action":"go_back"},"raw":"plain"}"#,
        r#"{"kind":"error","message":"browser crashed"}"#,
    ]);

    es(&workdir)
        .arg("feed")
        .arg(feed.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("rejected"))
        .stdout(predicate::str::contains("statusUpdate"))
        .stdout(predicate::str::contains("browser_use").not());
}

#[test]
fn test_feed_snapshot_respects_capacity() {
    let workdir = TempDir::new().unwrap();
    let feed = feed_file(&[
        r#"{"kind":"think","content":"one"}"#,
        r#"{"kind":"think","content":"two"}"#,
        r#"{"kind":"think","content":"three"}"#,
    ]);

    let output = es(&workdir)
        .args(["feed", "--snapshot", "--capacity", "2"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let events = stdout_events(&output.stdout);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["content"], "two");
    assert_eq!(events[1]["content"], "three");
}

#[test]
fn test_feed_uses_config_file() {
    let workdir = TempDir::new().unwrap();
    let config = workdir.path().join("custom.yml");
    std::fs::write(&config, "history-capacity: 1\n").unwrap();
    let feed = feed_file(&[r#"{"kind":"think","content":"a"}"#, r#"{"kind":"think","content":"b"}"#]);

    let output = es(&workdir)
        .arg("--config")
        .arg(&config)
        .args(["feed", "--snapshot"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_events(&output.stdout).len(), 1);
}

fn three_thoughts() -> NamedTempFile {
    feed_file(&[
        r#"{"kind":"think","content":"one"}"#,
        r#"{"kind":"think","content":"two"}"#,
        r#"{"kind":"think","content":"three"}"#,
    ])
}

fn contents(events: &[Value]) -> Vec<String> {
    events.iter().map(|e| e["content"].as_str().unwrap().to_string()).collect()
}

#[test]
fn test_late_session_replays_history_unless_disabled() {
    let workdir = TempDir::new().unwrap();
    let feed = three_thoughts();

    let output = es(&workdir).arg("feed").arg(feed.path()).output().unwrap();
    assert!(output.status.success());
    assert_eq!(contents(&stdout_events(&output.stdout)), vec!["one", "two", "three"]);

    let output = es(&workdir).args(["feed", "--no-replay"]).arg(feed.path()).output().unwrap();
    assert!(output.status.success());
    assert!(stdout_events(&output.stdout).is_empty());
}

#[test]
fn test_join_after_splits_replayed_and_live_events() {
    let workdir = TempDir::new().unwrap();
    let feed = three_thoughts();

    let output = es(&workdir)
        .args(["feed", "--join-after", "1"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert_eq!(contents(&stdout_events(&output.stdout)), vec!["one", "two", "three"]);

    let output = es(&workdir)
        .args(["feed", "--join-after", "1", "--no-replay"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert_eq!(contents(&stdout_events(&output.stdout)), vec!["two", "three"]);
}

#[test]
fn test_replay_limited_by_capacity() {
    let workdir = TempDir::new().unwrap();
    let feed = three_thoughts();

    let output = es(&workdir)
        .args(["feed", "--capacity", "2", "--join-after", "2"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert_eq!(contents(&stdout_events(&output.stdout)), vec!["one", "two", "three"]);

    let output = es(&workdir)
        .args(["feed", "--capacity", "1", "--join-after", "2"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert_eq!(contents(&stdout_events(&output.stdout)), vec!["two", "three"]);
}

#[test]
fn test_config_can_disable_replay() {
    let workdir = TempDir::new().unwrap();
    let config = workdir.path().join("quiet.yml");
    std::fs::write(&config, "replay: false\n").unwrap();
    let feed = three_thoughts();

    let output = es(&workdir)
        .arg("--config")
        .arg(&config)
        .args(["feed", "--join-after", "2"])
        .arg(feed.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(contents(&stdout_events(&output.stdout)), vec!["three"]);
}

#[test]
fn test_feed_missing_file_fails() {
    let workdir = TempDir::new().unwrap();
    es(&workdir)
        .args(["feed", "does-not-exist.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.jsonl"));
}
