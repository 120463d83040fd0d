//! CLI surface: validate and run subcommands against real job files.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn docflow() -> Command {
    Command::cargo_bin("docflow").expect("binary exists")
}

#[test]
fn validate_prints_the_resolved_plugin_set() {
    let dir = tempdir().expect("job dir");
    let job_path = dir.path().join("sync.docflow.json");
    fs::write(
        &job_path,
        r#"{
            "name": "sync-docs",
            "sources": [{ "name": "filesystem", "paths": ["docs/**/*.md"] }],
            "outputs": [{ "name": "filesystem", "path": "out" }]
        }"#,
    )
    .expect("job file written");

    docflow()
        .arg("validate")
        .arg("--job")
        .arg(&job_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("sync-docs").and(predicate::str::contains("filesystem")));
}

#[test]
fn validate_rejects_duplicate_plugin_declarations() {
    let dir = tempdir().expect("job dir");
    let job_path = dir.path().join("dup.docflow.json");
    fs::write(
        &job_path,
        r#"{
            "name": "duplicated",
            "plugins": [{ "name": "filesystem" }, { "name": "filesystem" }],
            "sources": [{ "name": "filesystem", "paths": ["**/*.md"] }],
            "outputs": []
        }"#,
    )
    .expect("job file written");

    docflow()
        .arg("validate")
        .arg("--job")
        .arg(&job_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate plugin declaration"));
}

#[test]
fn run_round_trips_a_filesystem_job() {
    let root = tempdir().expect("run root");
    let target = tempdir().expect("target dir");
    fs::create_dir_all(root.path().join("docs")).expect("docs dir");
    fs::write(root.path().join("docs/guide.md"), "# Guide\n").expect("source file written");

    let job_path = root.path().join("mirror.docflow.json");
    let job = serde_json::json!({
        "name": "mirror",
        "sources": [{ "name": "filesystem", "paths": ["docs/**/*.md"] }],
        "outputs": [{ "name": "filesystem", "path": target.path() }],
    });
    fs::write(&job_path, serde_json::to_string_pretty(&job).expect("job serializes"))
        .expect("job file written");

    docflow()
        .arg("run")
        .arg("--job")
        .arg(&job_path)
        .arg("--root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed"));

    assert_eq!(
        fs::read_to_string(target.path().join("docs/guide.md")).expect("mirrored file"),
        "# Guide\n"
    );
}

#[test]
fn run_fails_for_a_source_without_the_needed_capability() {
    let dir = tempdir().expect("job dir");
    let job_path = dir.path().join("bad.docflow.json");
    // github provides no output capability.
    fs::write(
        &job_path,
        r#"{
            "name": "bad-routing",
            "sources": [],
            "outputs": [{ "name": "github", "organization": "o", "repo": "r", "path": "x" }]
        }"#,
    )
    .expect("job file written");

    docflow()
        .arg("run")
        .arg("--job")
        .arg(&job_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no output capability"));
}
