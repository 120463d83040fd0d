//! Contracts between the engine, plugin bodies, and the document processor.
//!
//! This module holds the traits plugin implementations satisfy ([`Plugin`]
//! with its optional [`SourceCapability`] and [`OutputCapability`]), the
//! [`Listener`] invoked once per processed document, and the engine's view of
//! the external [`DocumentProcessor`], together with the plain data types
//! flowing between them.
//!
//! The async traits are annotated for `mockall` (behind the
//! `test-export-mocks` feature) so both this crate's tests and downstream
//! consumers can substitute deterministic mocks.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::BoxedError;
use crate::job::{OutputSpec, SourceSpec};

/// A unit of content flowing from a source through the processor to outputs.
///
/// Owned by the source that produced it until handed to the processor; the
/// processor and listeners only read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    /// Final path component, e.g. `"README.md"`.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The directory the document lives in.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// One diagnostic reported by the processor's parse step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub line: Option<u32>,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of parsing one document. Diagnostics are carried on the result
/// rather than as an `Err`; an empty `errors` list means the document parsed
/// cleanly.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub document: Document,
    pub errors: Vec<ParseDiagnostic>,
}

/// Event delivered to subscribers and listeners for every processed document.
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    pub parse_result: ParseResult,
    /// The processed document, as outputs should persist it.
    pub document: Document,
}

/// Options for one `process` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// When set, `process` returns only after every subscriber has finished,
    /// so listener side effects are complete before the caller moves on.
    pub wait_for_listeners: bool,
}

/// Callback registered on the processor, invoked once per processed document.
pub type Subscriber = Arc<dyn Fn(ProcessedEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Document-producing capability of a plugin.
#[async_trait]
pub trait SourceCapability: Send + Sync {
    /// Fetch every document the spec describes, in the order they should be
    /// processed. The returned list is authoritative: a plugin may resolve
    /// its internal fan-out best-effort, but the engine does not retry.
    async fn documents(&self, spec: &SourceSpec) -> Result<Vec<Document>, BoxedError>;
}

/// Listener-producing capability of a plugin.
#[async_trait]
pub trait OutputCapability: Send + Sync {
    async fn listener(&self, spec: &OutputSpec) -> Result<Box<dyn Listener>, BoxedError>;
}

/// A named plugin implementation, alive for the duration of one run.
///
/// Capabilities are optional: a plugin may act as a source, as an output, or
/// as both. Routing a source or output through a plugin that lacks the
/// matching capability is a fatal configuration error caught by the engine.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> Option<&dyn SourceCapability> {
        None
    }

    fn output(&self) -> Option<&dyn OutputCapability> {
        None
    }
}

/// Side-effecting sink behind one output declaration.
///
/// Invoked once per processed document; outlives individual documents and
/// must be safe to call repeatedly during a run. The event is shared with
/// other listeners and must be treated as read-only.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Listener: Send + Sync {
    async fn on_document(&self, event: &ProcessedEvent) -> Result<(), BoxedError>;
}

/// The engine's view of the external document processor.
///
/// The processor owns parsing and transformation; the engine only sequences
/// it: one `subscribe` per run, then `parse`/`process` per document.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// Register a callback invoked for every processed document.
    fn subscribe(&self, subscriber: Subscriber);

    /// Parse one raw document.
    async fn parse(&self, document: Document) -> ParseResult;

    /// Apply the processor's transformations to a parse result and notify
    /// subscribers with the processed document.
    async fn process(&self, result: ParseResult, options: ProcessOptions) -> Result<(), BoxedError>;
}
