//! GitHub plugin: a repository file tree as a document source.
//!
//! Source-only. Lists the repo tree through the Git trees API, filters blobs
//! by path prefix, then fetches each file's raw contents. Authentication is a
//! bearer token from the plugin declaration or the `GITHUB_TOKEN` environment
//! variable; public repositories work without one.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::contract::{Document, Plugin, SourceCapability};
use crate::error::BoxedError;
use crate::job::{PluginRef, RunContext, SourceSpec};
use crate::resolve::PluginFactory;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Plugin-level config, carried on the job's explicit `plugins` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubPluginConfig {
    /// API endpoint override, e.g. a GitHub Enterprise host.
    #[serde(default)]
    pub api_base: Option<String>,
    /// Access token; falls back to the `GITHUB_TOKEN` environment variable.
    #[serde(default)]
    pub token: Option<String>,
}

/// Source config: one repository file tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSource {
    pub organization: String,
    pub repo: String,
    #[serde(default)]
    pub branch: Option<String>,
    /// Path prefixes to include; empty means the whole tree.
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub ignore_paths: Vec<String>,
}

pub struct GithubPlugin {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

pub struct Factory;

#[async_trait]
impl PluginFactory for Factory {
    async fn setup(
        &self,
        _context: &RunContext,
        config: Option<&PluginRef>,
    ) -> Result<Arc<dyn Plugin>, BoxedError> {
        let config: GithubPluginConfig = match config {
            Some(declared) => declared.config()?,
            None => GithubPluginConfig::default(),
        };
        let client = reqwest::Client::builder()
            .user_agent(concat!("docflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Arc::new(GithubPlugin {
            client,
            api_base: config.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            token: config.token.or_else(|| std::env::var("GITHUB_TOKEN").ok()),
        }))
    }
}

impl Plugin for GithubPlugin {
    fn name(&self) -> &str {
        "github"
    }

    fn source(&self) -> Option<&dyn SourceCapability> {
        Some(self)
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[async_trait]
impl SourceCapability for GithubPlugin {
    async fn documents(&self, spec: &SourceSpec) -> Result<Vec<Document>, BoxedError> {
        let config: GithubSource = spec.config()?;
        let reference = config.branch.as_deref().unwrap_or("HEAD");

        let tree_url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base, config.organization, config.repo, reference
        );
        let tree: TreeResponse = self
            .request(&tree_url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if tree.truncated {
            warn!(
                repo = %config.repo,
                "repository tree was truncated by the API; some files may be missing"
            );
        }

        let wanted: Vec<&TreeEntry> = tree
            .tree
            .iter()
            .filter(|entry| entry.kind == "blob")
            .filter(|entry| selected(&entry.path, &config.paths, &config.ignore_paths))
            .collect();
        debug!(repo = %config.repo, files = wanted.len(), "resolved repository tree");

        let mut documents = Vec::with_capacity(wanted.len());
        for entry in wanted {
            let contents_url = format!(
                "{}/repos/{}/{}/contents/{}?ref={}",
                self.api_base, config.organization, config.repo, entry.path, reference
            );
            let text = self
                .request(&contents_url)
                .header(header::ACCEPT, "application/vnd.github.raw")
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            debug!(path = %entry.path, bytes = text.len(), "fetched file");
            documents.push(Document::new(&entry.path, text));
        }
        Ok(documents)
    }
}

impl GithubPlugin {
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }
}

/// Prefix selection over the repository tree.
fn selected(path: &str, paths: &[String], ignore_paths: &[String]) -> bool {
    if ignore_paths.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    paths.is_empty() || paths.iter().any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::selected;

    #[test]
    fn empty_paths_select_everything_not_ignored() {
        assert!(selected("docs/guide.md", &[], &[]));
        assert!(!selected("docs/guide.md", &[], &["docs/".to_string()]));
    }

    #[test]
    fn paths_are_prefix_filters_with_ignore_taking_precedence() {
        let paths = vec!["docs/".to_string()];
        let ignore = vec!["docs/internal/".to_string()];
        assert!(selected("docs/guide.md", &paths, &ignore));
        assert!(!selected("src/lib.rs", &paths, &ignore));
        assert!(!selected("docs/internal/notes.md", &paths, &ignore));
    }
}
