//! Job-file loading: single files, directory scans, and loader validation.

use std::fs;

use tempfile::tempdir;

use docflow::load_job::{load_job_file, load_jobs};

const MINIMAL_JOB: &str = r#"{
    "name": "minimal",
    "sources": [{ "name": "filesystem", "paths": ["**/*.md"] }],
    "outputs": [{ "name": "filesystem", "path": "out" }]
}"#;

#[test]
fn loads_a_single_job_file() {
    let dir = tempdir().expect("job dir");
    let path = dir.path().join("minimal.docflow.json");
    fs::write(&path, MINIMAL_JOB).expect("job file written");

    let jobs = load_jobs(&path).expect("loading should succeed");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "minimal");
    assert_eq!(jobs[0].sources.len(), 1);
    assert_eq!(jobs[0].sources[0].name, "filesystem");
    assert!(jobs[0].plugins.is_empty(), "plugins default to empty");
}

#[test]
fn directory_scan_picks_up_job_files_in_filename_order() {
    let dir = tempdir().expect("job dir");
    fs::write(
        dir.path().join("b.docflow.json"),
        MINIMAL_JOB.replace("minimal", "second"),
    )
    .expect("job file written");
    fs::write(
        dir.path().join("a.docflow.json"),
        MINIMAL_JOB.replace("minimal", "first"),
    )
    .expect("job file written");
    fs::write(dir.path().join("README.md"), "not a job").expect("readme written");
    fs::write(dir.path().join("other.json"), "{}").expect("other file written");

    let jobs = load_jobs(dir.path()).expect("loading should succeed");
    let names: Vec<_> = jobs.iter().map(|job| job.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn plugin_specific_fields_are_kept_opaque_on_the_spec() {
    let dir = tempdir().expect("job dir");
    let path = dir.path().join("opaque.docflow.json");
    fs::write(
        &path,
        r#"{
            "name": "opaque",
            "plugins": [{ "name": "aws-s3", "region": "eu-west-1" }],
            "sources": [{ "name": "aws-s3", "bucket": "b", "keys": ["k"] }],
            "outputs": []
        }"#,
    )
    .expect("job file written");

    let job = load_job_file(&path).expect("loading should succeed");
    assert_eq!(job.plugins[0].options["region"], "eu-west-1");
    assert_eq!(job.sources[0].options["bucket"], "b");
}

#[test]
fn rejects_a_job_missing_required_fields() {
    let dir = tempdir().expect("job dir");
    let path = dir.path().join("broken.docflow.json");
    fs::write(&path, r#"{ "name": "broken", "sources": [] }"#).expect("job file written");

    let error = load_job_file(&path).expect_err("a job without outputs must be rejected");
    assert!(error.to_string().contains("invalid job file"), "unexpected error: {error}");
}

#[test]
fn rejects_malformed_json() {
    let dir = tempdir().expect("job dir");
    let path = dir.path().join("mangled.docflow.json");
    fs::write(&path, "{ not json").expect("job file written");

    assert!(load_job_file(&path).is_err());
}

#[test]
fn missing_path_is_an_error() {
    let dir = tempdir().expect("job dir");
    assert!(load_jobs(dir.path().join("nope.docflow.json")).is_err());
}
