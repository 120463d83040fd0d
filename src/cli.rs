//! Command-line interface for docflow.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::job::RunContext;
use crate::load_job::load_jobs;
use crate::plugins::builtin_registry;
use crate::processor::VerbatimProcessor;
use crate::resolve::resolve_plugin_names;
use crate::run::run_job;

/// CLI for docflow: run declarative document-pipeline jobs.
#[derive(Parser)]
#[clap(
    name = "docflow",
    version,
    about = "Run declarative document-pipeline jobs against pluggable sources and outputs"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every job in the given job file or directory
    Run {
        /// Path to a job file or a directory of *.docflow.json files
        #[clap(long)]
        job: PathBuf,
        /// Root directory source paths resolve against
        #[clap(long, default_value = ".")]
        root: PathBuf,
    },
    /// Load jobs and resolve their plugin sets without running anything
    Validate {
        /// Path to a job file or a directory of *.docflow.json files
        #[clap(long)]
        job: PathBuf,
    },
}

/// Extracted async CLI entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { job, root } => run_jobs(&job, &root).await,
        Commands::Validate { job } => validate_jobs(&job),
    }
}

async fn run_jobs(job_path: &Path, root: &Path) -> Result<()> {
    let jobs = load_jobs(job_path)?;
    if jobs.is_empty() {
        bail!("no jobs found at {}", job_path.display());
    }

    let registry = builtin_registry();
    let mut aborted = false;
    for job in &jobs {
        let context = RunContext::new(root)
            .with_context(|| format!("failed to resolve run root {}", root.display()))?;
        // Fresh processor per job: its subscription is tied to this job's
        // listeners.
        let processor = VerbatimProcessor::new();
        let report = run_job(job, &context, &registry, &processor)
            .await
            .with_context(|| format!("job '{}' failed", job.name))?;
        println!("{report:#?}");
        if !report.outcome.is_completed() {
            aborted = true;
        }
    }

    if aborted {
        bail!("one or more jobs aborted; see the logs above");
    }
    Ok(())
}

fn validate_jobs(job_path: &Path) -> Result<()> {
    let jobs = load_jobs(job_path)?;
    if jobs.is_empty() {
        bail!("no jobs found at {}", job_path.display());
    }
    for job in &jobs {
        let names = resolve_plugin_names(job)
            .with_context(|| format!("job '{}' is invalid", job.name))?;
        println!("job '{}': plugins {names:?}", job.name);
        info!(job = %job.name, plugins = ?names, "job validated");
    }
    Ok(())
}
