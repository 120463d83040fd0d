//! Source fan-in: pull documents from every declared source.

use tracing::debug;

use crate::contract::Document;
use crate::error::{Capability, EngineError};
use crate::job::SourceSpec;
use crate::resolve::Plugins;

/// Collect documents from every source, in source-declaration order.
///
/// Declaration order matters: later sources' documents are processed after
/// earlier ones', which is what outputs keying off processing order observe.
/// Each plugin's internal ordering is preserved, and documents are not
/// deduplicated across sources; overlapping sources may legitimately emit the
/// same path more than once.
///
/// A source naming a plugin without the source capability aborts the whole
/// collection before any later source is invoked.
pub async fn collect_documents(
    plugins: &Plugins,
    sources: &[SourceSpec],
) -> Result<Vec<Document>, EngineError> {
    let mut documents = Vec::new();
    for spec in sources {
        let plugin = plugins.get(&spec.name)?;
        let source = plugin.source().ok_or_else(|| EngineError::MissingCapability {
            plugin: spec.name.clone(),
            capability: Capability::Source,
        })?;
        let batch = source
            .documents(spec)
            .await
            .map_err(|cause| EngineError::SourceFailed { plugin: spec.name.clone(), source: cause })?;
        debug!(plugin = %spec.name, count = batch.len(), "collected documents from source");
        documents.extend(batch);
    }
    Ok(documents)
}
