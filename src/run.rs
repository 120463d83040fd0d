//! Run orchestration: one job, one processor session, documents in, outputs
//! out.
//!
//! A run moves through fixed steps: resolve plugins, build output listeners
//! and register a single processor subscription that broadcasts to them,
//! collect documents from all sources, then parse and process the documents
//! strictly one at a time. Processing waits for listeners, so every output
//! side effect for document *i* is complete before document *i+1* parses;
//! outputs writing into overlapping targets never race.
//!
//! Failure contract: configuration, resolution and capability problems return
//! an [`EngineError`] before any document I/O. A parse failure ends the run
//! early and is reported on the [`RunReport`]; outputs already written for
//! earlier documents stand. Listener failures are contained at the broadcast
//! site and stop nothing.

use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::collect::collect_documents;
use crate::contract::{DocumentProcessor, ParseDiagnostic, ProcessOptions};
use crate::dispatch::{broadcast, build_listeners};
use crate::error::EngineError;
use crate::job::{Job, RunContext};
use crate::resolve::PluginRegistry;

/// What one run did, returned to the caller alongside the logs.
#[derive(Debug)]
pub struct RunReport {
    pub job: String,
    pub documents_collected: usize,
    pub documents_processed: usize,
    pub outcome: RunOutcome,
}

/// Terminal state of a run that got past plugin resolution.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every collected document was parsed and processed.
    Completed,
    /// A document failed to parse. It and every later document were skipped;
    /// outputs already written for earlier documents stand.
    AbortedOnParse {
        document: PathBuf,
        errors: Vec<ParseDiagnostic>,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Run one job to completion against `registry` and `processor`.
pub async fn run_job<P: DocumentProcessor>(
    job: &Job,
    context: &RunContext,
    registry: &PluginRegistry,
    processor: &P,
) -> Result<RunReport, EngineError> {
    info!(
        run = %context.run_id,
        job = %job.name,
        root = %context.root.display(),
        "starting run"
    );

    let plugins = registry.resolve(job, context).await?;
    info!(run = %context.run_id, plugins = plugins.len(), "plugins resolved");

    // One subscription for the whole run; every processed document fans out
    // to all listeners in output-declaration order.
    let listeners = Arc::new(build_listeners(&plugins, &job.outputs).await?);
    {
        let listeners = Arc::clone(&listeners);
        processor.subscribe(Arc::new(move |event| {
            let listeners = Arc::clone(&listeners);
            async move { broadcast(&listeners, &event).await }.boxed()
        }));
    }

    let documents = collect_documents(&plugins, &job.sources).await?;
    let documents_collected = documents.len();
    info!(run = %context.run_id, documents = documents_collected, "documents collected");

    let mut documents_processed = 0;
    for document in documents {
        let path = document.path.clone();
        let result = processor.parse(document).await;
        if !result.errors.is_empty() {
            for diagnostic in &result.errors {
                error!(run = %context.run_id, document = %path.display(), "parse error: {diagnostic}");
            }
            warn!(
                run = %context.run_id,
                document = %path.display(),
                "aborting run; remaining documents are skipped"
            );
            return Ok(RunReport {
                job: job.name.clone(),
                documents_collected,
                documents_processed,
                outcome: RunOutcome::AbortedOnParse { document: path, errors: result.errors },
            });
        }

        processor
            .process(result, ProcessOptions { wait_for_listeners: true })
            .await
            .map_err(|cause| EngineError::ProcessFailed { document: path, source: cause })?;
        documents_processed += 1;
    }

    info!(run = %context.run_id, processed = documents_processed, "run complete");
    Ok(RunReport {
        job: job.name.clone(),
        documents_collected,
        documents_processed,
        outcome: RunOutcome::Completed,
    })
}
