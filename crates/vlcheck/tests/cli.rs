//! Command-line behaviour of vlcheck.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PARALLELS: &str = r#"{
  "key": "C", "timeSig": "2/4", "tempo": 90,
  "staves": [
    {"voice": "bass", "clef": "bass", "notes": [{"name": "C3", "type": "quarter"}, {"name": "D3", "type": "quarter"}]},
    {"voice": "tenor", "clef": "bass", "notes": [{"name": "G3", "type": "quarter"}, {"name": "A3", "type": "quarter"}]},
    {"voice": "alto", "clef": "treble", "notes": [{"name": "C4", "type": "quarter"}, {"name": "D4", "type": "quarter"}]},
    {"voice": "soprano", "clef": "treble", "notes": [{"name": "E4", "type": "quarter"}, {"name": "F4", "type": "quarter"}]}
  ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn vlcheck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vlcheck").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("VOICELEAD_RULES")
        .env_remove("VOICELEAD_OUTPUT")
        .env_remove("VOICELEAD_LOG_LEVEL");
    cmd
}

#[test]
fn check_reports_mistakes_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let score = write(&dir, "score.json", PARALLELS);

    vlcheck(&dir)
        .arg("check")
        .arg(&score)
        .assert()
        .success()
        .stdout(predicate::str::contains("C major triad (root position)"))
        .stdout(predicate::str::contains("Parallel fifths between the bass and tenor"))
        .stdout(predicate::str::contains("Parallel octaves between the bass and alto"))
        .stdout(predicate::str::contains("2 mistakes"));
}

#[test]
fn check_respects_rule_selection() {
    let dir = TempDir::new().unwrap();
    let score = write(&dir, "score.json", PARALLELS);

    vlcheck(&dir)
        .args(["check", "--rules", "p_octaves,range"])
        .arg(&score)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parallel octaves"))
        .stdout(predicate::str::contains("Parallel fifths").not());
}

#[test]
fn check_json_output() {
    let dir = TempDir::new().unwrap();
    let score = write(&dir, "score.json", PARALLELS);

    let output = vlcheck(&dir)
        .args(["check", "--json"])
        .arg(&score)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let chords = json["chords"].as_array().unwrap();
    assert_eq!(chords.len(), 2);
    assert_eq!(chords[0]["chord_type"], "major_triad");
    assert_eq!(chords[0]["mistakes"][0]["kind"], "ParallelFifths");
}

#[test]
fn check_with_blank_rules_runs_every_rule() {
    let dir = TempDir::new().unwrap();
    let score = write(&dir, "score.json", PARALLELS);

    vlcheck(&dir)
        .args(["check", "--rules", ""])
        .arg(&score)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parallel fifths"))
        .stdout(predicate::str::contains("2 mistakes"));
}

#[test]
fn check_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let score = write(&dir, "score.json", PARALLELS);
    write(&dir, "voicelead.toml", "[rules]\nenabled = [\"p_fifths\"]\n");

    vlcheck(&dir)
        .arg("check")
        .arg(&score)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parallel fifths"))
        .stdout(predicate::str::contains("Parallel octaves").not())
        .stdout(predicate::str::contains("1 mistake"));
}

#[test]
fn check_fails_on_missing_file() {
    let dir = TempDir::new().unwrap();

    vlcheck(&dir)
        .args(["check", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read score"));
}

#[test]
fn check_fails_on_misaligned_rhythm() {
    let dir = TempDir::new().unwrap();
    let score = write(
        &dir,
        "eighths.json",
        &PARALLELS.replacen(r#""name": "C4", "type": "quarter""#, r#""name": "C4", "type": "eighth""#, 1),
    );

    vlcheck(&dir)
        .arg("check")
        .arg(&score)
        .assert()
        .failure()
        .stderr(predicate::str::contains("alto note 0"));
}

#[test]
fn rules_lists_every_rule() {
    let dir = TempDir::new().unwrap();

    let output = vlcheck(&dir).arg("rules").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for id in [
        "p_fifths", "p_octaves", "p_unisons", "sevenths", "intervals", "spacing", "range",
        "crossing", "doubling",
    ] {
        assert!(stdout.contains(id), "missing {id} in:\n{stdout}");
    }
    assert_eq!(stdout.lines().count(), 9);
}

#[test]
fn config_shows_sources() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "custom.toml", "[output]\nformat = \"json\"\n");

    vlcheck(&dir)
        .arg("config")
        .arg("--config")
        .arg(&config)
        .env("VOICELEAD_LOG_LEVEL", "debug")
        .assert()
        .success()
        .stdout(predicate::str::contains("format = \"json\""))
        .stdout(predicate::str::contains("log_level = \"debug\""))
        .stdout(predicate::str::contains("custom.toml"))
        .stdout(predicate::str::contains("$VOICELEAD_LOG_LEVEL"));
}
