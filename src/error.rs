//! Failure taxonomy of the orchestration engine.
//!
//! Engine failures are enumerated here; plugin bodies and listeners report
//! boxed errors ([`BoxedError`]) which the engine wraps with the name of the
//! offending declaration. Parse diagnostics are not an [`EngineError`]: they
//! end a run early and are reported on the run report instead.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Boundary error type for plugin implementations and listeners.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// The two optional capabilities a plugin can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Source,
    Output,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Source => write!(f, "source"),
            Capability::Output => write!(f, "output"),
        }
    }
}

/// Fatal engine failures.
///
/// Everything here terminates the run: configuration and resolution errors
/// before any I/O happens, source/output/process failures at the step that
/// hit them. Listener failures never surface as an `EngineError`; they are
/// contained at the broadcast site.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two explicit `plugins` entries in one job share a name.
    #[error("duplicate plugin declaration: {0}")]
    DuplicatePlugin(String),

    /// A job names a plugin the registry has no factory for.
    #[error("no plugin registered under name: {0}")]
    PluginNotFound(String),

    /// A source or output names a plugin that lacks the needed capability.
    #[error("plugin '{plugin}' has no {capability} capability")]
    MissingCapability { plugin: String, capability: Capability },

    /// A plugin factory failed while instantiating its plugin.
    #[error("plugin '{plugin}' failed to set up")]
    PluginSetup { plugin: String, source: BoxedError },

    /// A source invocation failed as a whole; its return value is
    /// authoritative and is not retried.
    #[error("source '{plugin}' failed")]
    SourceFailed { plugin: String, source: BoxedError },

    /// An output plugin failed to produce its listener.
    #[error("output '{plugin}' failed to produce a listener")]
    OutputFailed { plugin: String, source: BoxedError },

    /// The external processor failed while processing a parsed document.
    #[error("processing failed for {}", .document.display())]
    ProcessFailed { document: PathBuf, source: BoxedError },
}
