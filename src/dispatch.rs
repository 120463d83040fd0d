//! Output fan-out: one listener per declared output, broadcast per document.

use tracing::error;

use crate::contract::{Listener, ProcessedEvent};
use crate::error::{Capability, EngineError};
use crate::job::OutputSpec;
use crate::resolve::Plugins;

/// Build one listener per output, in output-declaration order.
///
/// An output naming a plugin without the output capability is fatal and
/// aborts listener construction.
pub async fn build_listeners(
    plugins: &Plugins,
    outputs: &[OutputSpec],
) -> Result<Vec<Box<dyn Listener>>, EngineError> {
    let mut listeners = Vec::with_capacity(outputs.len());
    for spec in outputs {
        let plugin = plugins.get(&spec.name)?;
        let output = plugin.output().ok_or_else(|| EngineError::MissingCapability {
            plugin: spec.name.clone(),
            capability: Capability::Output,
        })?;
        let listener = output
            .listener(spec)
            .await
            .map_err(|cause| EngineError::OutputFailed { plugin: spec.name.clone(), source: cause })?;
        listeners.push(listener);
    }
    Ok(listeners)
}

/// Deliver one processed-document event to every listener, in
/// output-declaration order.
///
/// Outputs are independent sinks: a failing listener is logged and skipped so
/// the remaining listeners still receive the document, in their declared
/// order. This is the only point in the engine that tolerates a partial
/// failure.
pub async fn broadcast(listeners: &[Box<dyn Listener>], event: &ProcessedEvent) {
    for (position, listener) in listeners.iter().enumerate() {
        if let Err(cause) = listener.on_document(event).await {
            error!(
                output = position,
                document = %event.document.path.display(),
                error = %cause,
                "output listener failed"
            );
        }
    }
}
