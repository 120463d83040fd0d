//! Filesystem plugin: glob-based document source and mirror-to-directory
//! output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::contract::{
    Document, Listener, OutputCapability, Plugin, ProcessedEvent, SourceCapability,
};
use crate::error::BoxedError;
use crate::job::{OutputSpec, PluginRef, RunContext, SourceSpec};
use crate::resolve::PluginFactory;

/// Source config: glob patterns resolved against the run root.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemSource {
    pub paths: Vec<String>,
    #[serde(default)]
    pub ignore_paths: Vec<String>,
}

/// Output config: directory the processed tree is mirrored into.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemOutput {
    pub path: PathBuf,
}

pub struct FilesystemPlugin {
    root: PathBuf,
}

pub struct Factory;

#[async_trait]
impl PluginFactory for Factory {
    async fn setup(
        &self,
        context: &RunContext,
        _config: Option<&PluginRef>,
    ) -> Result<Arc<dyn Plugin>, BoxedError> {
        Ok(Arc::new(FilesystemPlugin { root: context.root.clone() }))
    }
}

impl Plugin for FilesystemPlugin {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn source(&self) -> Option<&dyn SourceCapability> {
        Some(self)
    }

    fn output(&self) -> Option<&dyn OutputCapability> {
        Some(self)
    }
}

#[async_trait]
impl SourceCapability for FilesystemPlugin {
    async fn documents(&self, spec: &SourceSpec) -> Result<Vec<Document>, BoxedError> {
        let config: FilesystemSource = spec.config()?;
        let ignore = build_ignore_set(&config.ignore_paths)?;

        // Resolve every pattern; a bad pattern is logged and dropped so the
        // remaining patterns' matches still flow.
        let resolutions = join_all(
            config
                .paths
                .iter()
                .map(|pattern| resolve_pattern(&self.root, pattern, &ignore)),
        )
        .await;

        let mut seen = HashSet::new();
        let mut filenames = Vec::new();
        for (pattern, resolution) in config.paths.iter().zip(resolutions) {
            match resolution {
                Ok(matches) => {
                    for path in matches {
                        if seen.insert(path.clone()) {
                            filenames.push(path);
                        }
                    }
                }
                Err(cause) => {
                    warn!(pattern = %pattern, error = %cause, "skipping unresolvable source pattern");
                }
            }
        }

        let mut documents = Vec::with_capacity(filenames.len());
        for path in filenames {
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| -> BoxedError {
                    format!("failed to read {}: {e}", path.display()).into()
                })?;
            documents.push(Document::new(path, text));
        }
        Ok(documents)
    }
}

#[async_trait]
impl OutputCapability for FilesystemPlugin {
    async fn listener(&self, spec: &OutputSpec) -> Result<Box<dyn Listener>, BoxedError> {
        let config: FilesystemOutput = spec.config()?;
        Ok(Box::new(FilesystemListener { root: self.root.clone(), target: config.path }))
    }
}

/// Mirrors each processed document under `target`, preserving the document's
/// path relative to the run root.
struct FilesystemListener {
    root: PathBuf,
    target: PathBuf,
}

#[async_trait]
impl Listener for FilesystemListener {
    async fn on_document(&self, event: &ProcessedEvent) -> Result<(), BoxedError> {
        let document = &event.document;
        // Documents from non-filesystem sources already carry relative paths.
        let relative = document
            .directory()
            .strip_prefix(&self.root)
            .unwrap_or(document.directory());
        let directory = self.target.join(relative);
        tokio::fs::create_dir_all(&directory).await?;
        let target_path = directory.join(document.basename());
        tokio::fs::write(&target_path, document.text.as_bytes()).await?;
        debug!(
            document = %document.path.display(),
            target = %target_path.display(),
            "wrote document"
        );
        Ok(())
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, BoxedError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}

async fn resolve_pattern(
    root: &Path,
    pattern: &str,
    ignore: &GlobSet,
) -> Result<Vec<PathBuf>, BoxedError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut matches = Vec::new();
    walk(root, &mut |path| {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if matcher.is_match(relative) && !ignore.is_match(relative) {
            matches.push(path.to_path_buf());
        }
    })?;
    matches.sort();
    Ok(matches)
}

fn walk(dir: &Path, visit: &mut impl FnMut(&Path)) -> Result<(), std::io::Error> {
    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, visit)?;
        } else if path.is_file() {
            visit(&path);
        }
    }
    Ok(())
}
