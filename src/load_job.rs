//! Job-file loading: one JSON file per job, or a directory of them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::job::Job;

/// Suffix a file must carry to be picked up by a directory scan.
pub const JOB_FILE_SUFFIX: &str = ".docflow.json";

/// Load jobs from `path`: a file loads as a single job, a directory loads
/// every `*.docflow.json` directly inside it, in filename order.
///
/// Typed deserialization doubles as validation: a job missing `name`,
/// `sources` or `outputs` is rejected here, before the engine sees it.
pub fn load_jobs(path: impl AsRef<Path>) -> Result<Vec<Job>> {
    let path = path.as_ref();
    let metadata =
        fs::metadata(path).with_context(|| format!("failed to read {}", path.display()))?;
    if metadata.is_dir() {
        load_directory(path)
    } else {
        Ok(vec![load_job_file(path)?])
    }
}

fn load_directory(dir: &Path) -> Result<Vec<Job>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    let mut job_paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if entry.file_name().to_string_lossy().ends_with(JOB_FILE_SUFFIX) {
            job_paths.push(entry.path());
        }
    }
    job_paths.sort();

    let mut jobs = Vec::with_capacity(job_paths.len());
    for job_path in &job_paths {
        jobs.push(load_job_file(job_path)?);
    }
    Ok(jobs)
}

/// Read and validate a single job file.
pub fn load_job_file(path: &Path) -> Result<Job> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file {}", path.display()))?;
    let job: Job = serde_json::from_str(&contents)
        .with_context(|| format!("invalid job file {}", path.display()))?;
    info!(job = %job.name, file = %path.display(), "loaded job");
    Ok(job)
}
