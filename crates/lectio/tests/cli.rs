use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const AUGUSTO: &str = "Augusto divenne imperatore.\x0cOttaviano Augusto nacque nel 63 a.C. a Roma.";

/// Command isolated from the user's config directory and `LECTIO_*` variables.
fn lectio(home: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("lectio").into();
    cmd.env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("LECTIO_CONFIG")
        .env_remove("LECTIO_NUM_TOPICS")
        .env_remove("LECTIO_NUM_WORDS")
        .env_remove("LECTIO_SEED")
        .env_remove("LECTIO_TOP_N")
        .env_remove("LECTIO_DELETE_SOURCE")
        .env_remove("RUST_LOG");
    cmd
}

fn write_doc(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// --- Binary startup ---

#[test]
fn binary_runs() {
    let tmp = TempDir::new().unwrap();
    lectio(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lectio"));
}

#[test]
fn process_requires_paths() {
    let tmp = TempDir::new().unwrap();
    lectio(tmp.path()).arg("process").assert().failure();
}

// --- Normalize ---

#[test]
fn normalize_joins_broken_lines() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "gatto.txt", "Il gatto\n  mangia   il pesce.");

    lectio(tmp.path())
        .arg("normalize")
        .arg(&doc)
        .assert()
        .success()
        .stdout("Il gatto mangia il pesce.\n");
}

#[test]
fn normalize_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    lectio(tmp.path())
        .args(["normalize", "nope.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// --- Entities ---

#[test]
fn entities_ranks_merged_names() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "augusto.txt", AUGUSTO);

    lectio(tmp.path())
        .arg("entities")
        .arg(&doc)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Persons:\n  Ottaviano Augusto (2)")
                .and(predicate::str::contains("Locations:\n  Roma (1)"))
                .and(predicate::str::contains("Dates: 63 a.C.")),
        );
}

// --- Topics ---

#[test]
fn topics_prints_descriptors() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(
        tmp.path(),
        "impero.txt",
        "L'impero conquistò la provincia. L'impero governava la provincia e il senato.",
    );

    lectio(tmp.path())
        .arg("topics")
        .arg(&doc)
        .args(["--words", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Topic 0: 0.").and(predicate::str::contains("*\"impero\"")));
}

#[test]
fn topics_rejects_zero() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "impero.txt", "L'impero");

    lectio(tmp.path())
        .arg("topics")
        .arg(&doc)
        .args(["--topics", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("num_topics"));
}

// --- Process ---

#[test]
fn process_prints_json_result() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "augusto.txt", AUGUSTO);

    let output = lectio(tmp.path())
        .arg("process")
        .arg(&doc)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let results = stdout_json(&output);
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result["status"], "success");
    assert_eq!(result["persons"][0]["name"], "Ottaviano Augusto");
    assert_eq!(result["persons"][0]["count"], 2);
    assert_eq!(result["source"]["title"], "augusto.txt");
    assert_eq!(result["source"]["page_count"], 2);
    assert_eq!(result["topics"].as_array().map(Vec::len), Some(1));
    assert!(result["subject"].is_null());
    assert!(doc.exists());
}

#[test]
fn process_reports_failures_in_json() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.txt");

    let output = lectio(tmp.path())
        .arg("process")
        .arg(&missing)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let results = stdout_json(&output);
    assert_eq!(results[0]["status"], "error");
    assert_eq!(results[0]["error_kind"], "io");
}

#[test]
fn process_directory() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    write_doc(&docs, "a.txt", "Dante nacque a Firenze.");
    write_doc(&docs, "b.txt", "Petrarca visse ad Avignone.");
    write_doc(&docs, "c.png", "not a document");

    let output = lectio(tmp.path())
        .arg("process")
        .arg(&docs)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 processed, 0 failed"))
        .get_output()
        .stdout
        .clone();

    assert_eq!(stdout_json(&output).len(), 2);
}

#[test]
fn process_pretty() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "nota.txt", "Cesare attraversò il Rubicone.");

    lectio(tmp.path())
        .arg("process")
        .arg(&doc)
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"status\": \"success\""));
}

#[test]
fn process_deletes_source_when_configured() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "nota.txt", "Cesare attraversò il Rubicone.");

    lectio(tmp.path())
        .env("LECTIO_DELETE_SOURCE", "1")
        .arg("process")
        .arg(&doc)
        .assert()
        .success();

    assert!(!doc.exists());
}

#[test]
fn process_classify_without_key_fails() {
    let tmp = TempDir::new().unwrap();
    let doc = write_doc(tmp.path(), "nota.txt", "Cesare attraversò il Rubicone.");
    let config = write_doc(
        tmp.path(),
        "lectio.toml",
        "[classifier]\napi_key_env = \"LECTIO_TEST_MISSING_KEY\"\n",
    );

    lectio(tmp.path())
        .env_remove("LECTIO_TEST_MISSING_KEY")
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&doc)
        .arg("--classify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("LECTIO_TEST_MISSING_KEY"));
}

// --- Config ---

#[test]
fn config_prints_defaults() {
    let tmp = TempDir::new().unwrap();
    lectio(tmp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[topics]")
                .and(predicate::str::contains("num_topics = 1"))
                .and(predicate::str::contains("api_key_env = \"GEMINI_API_KEY\"")),
        );
}

#[test]
fn config_file_and_env_overrides() {
    let tmp = TempDir::new().unwrap();
    let config = write_doc(tmp.path(), "custom.toml", "[topics]\nnum_topics = 3\nnum_words = 4\n");

    lectio(tmp.path())
        .env("LECTIO_NUM_WORDS", "9")
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("num_topics = 3").and(predicate::str::contains("num_words = 9")),
        );
}

#[test]
fn malformed_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config = write_doc(tmp.path(), "broken.toml", "[topics\nnum_topics =");

    lectio(tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}
