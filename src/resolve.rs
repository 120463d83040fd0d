//! Plugin resolution: which plugins a job needs, and one live implementation
//! per name.
//!
//! Plugins are looked up in an init-time [`PluginRegistry`] mapping names to
//! factories. Resolution computes the required name set from the job, loads
//! each name exactly once, and assembles the [`Plugins`] map used by the rest
//! of the run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;

use crate::contract::Plugin;
use crate::error::{BoxedError, EngineError};
use crate::job::{Job, PluginRef, RunContext};

/// Builds a plugin implementation for one run.
///
/// The engine calls `setup` at most once per run, passing the run context and
/// the job's explicit declaration for this plugin when one exists.
#[async_trait]
pub trait PluginFactory: Send + Sync {
    async fn setup(
        &self,
        context: &RunContext,
        config: Option<&PluginRef>,
    ) -> Result<Arc<dyn Plugin>, BoxedError>;
}

/// Resolved plugin implementations for one run, at most one per name.
#[derive(Default)]
pub struct Plugins {
    by_name: HashMap<String, Arc<dyn Plugin>>,
}

impl std::fmt::Debug for Plugins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugins")
            .field("by_name", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Plugins {
    /// Add an implementation under its own name. A second implementation for
    /// an already-present name is an error, never a silent overwrite.
    pub fn insert(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), EngineError> {
        let name = plugin.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(EngineError::DuplicatePlugin(name));
        }
        self.by_name.insert(name, plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Plugin>, EngineError> {
        self.by_name
            .get(name)
            .ok_or_else(|| EngineError::PluginNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Every plugin name the job requires.
///
/// Explicit declarations come first, in declaration order, followed by names
/// inferred from sources and then outputs in first-seen order. An inferred
/// name that repeats an explicit declaration is expected; two explicit
/// declarations sharing a name are a configuration error, caught here before
/// any plugin loads.
pub fn resolve_plugin_names(job: &Job) -> Result<Vec<String>, EngineError> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for declared in &job.plugins {
        if !seen.insert(declared.name.clone()) {
            return Err(EngineError::DuplicatePlugin(declared.name.clone()));
        }
        names.push(declared.name.clone());
    }

    let inferred = job
        .sources
        .iter()
        .map(|source| &source.name)
        .chain(job.outputs.iter().map(|output| &output.name));
    for name in inferred {
        if seen.insert(name.clone()) {
            names.push(name.clone());
        }
    }

    Ok(names)
}

/// Init-time registry mapping plugin names to their factories.
pub struct PluginRegistry {
    factories: HashMap<String, Arc<dyn PluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Register a factory under `name`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn PluginFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Look up and set up the plugin registered under `name`.
    pub async fn load(
        &self,
        name: &str,
        context: &RunContext,
        config: Option<&PluginRef>,
    ) -> Result<Arc<dyn Plugin>, EngineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::PluginNotFound(name.to_string()))?;
        debug!(plugin = name, "setting up plugin");
        factory
            .setup(context, config)
            .await
            .map_err(|cause| EngineError::PluginSetup { plugin: name.to_string(), source: cause })
    }

    /// Resolve every plugin the job needs, setting each up exactly once.
    ///
    /// Instantiation across distinct names runs concurrently; the name set is
    /// deduplicated before loading, so no name is set up twice within one
    /// resolution.
    pub async fn resolve(&self, job: &Job, context: &RunContext) -> Result<Plugins, EngineError> {
        let names = resolve_plugin_names(job)?;
        let loads = names.iter().map(|name| {
            let declared = job.plugins.iter().find(|declared| &declared.name == name);
            self.load(name, context, declared)
        });
        let implementations = try_join_all(loads).await?;

        let mut plugins = Plugins::default();
        for implementation in implementations {
            plugins.insert(implementation)?;
        }
        Ok(plugins)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
