//! Job and run data model.
//!
//! A [`Job`] is the declarative description of one run: named sources, named
//! outputs, and optional explicit plugin declarations. Source, output and
//! plugin declarations are open tagged records keyed by `name`: the engine
//! reads only the name and hands the whole declaration to the plugin, which
//! deserializes its own typed configuration from the remaining fields.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A declarative pipeline job, normally loaded from a `*.docflow.json` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    /// Explicit plugin declarations. Optional: plugins named only by sources
    /// and outputs are inferred. Declaring one explicitly lets a job carry
    /// plugin-level configuration such as credentials.
    #[serde(default)]
    pub plugins: Vec<PluginRef>,
    pub sources: Vec<SourceSpec>,
    pub outputs: Vec<OutputSpec>,
}

/// Explicit plugin declaration: a name plus whatever plugin-specific
/// configuration the declaration carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRef {
    pub name: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// A configured origin of documents, handled by the plugin of the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// A configured destination for processed documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl PluginRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: Map::new() }
    }

    /// Deserialize the plugin-specific fields of this declaration.
    pub fn config<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.options.clone()))
    }
}

impl SourceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: Map::new() }
    }

    /// Deserialize the plugin-specific fields of this spec.
    pub fn config<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.options.clone()))
    }
}

impl OutputSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: Map::new() }
    }

    /// Deserialize the plugin-specific fields of this spec.
    pub fn config<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.options.clone()))
    }
}

/// Immutable per-run metadata, constructed once per run and shared by every
/// plugin at setup time.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Absolute root directory relative paths resolve against.
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Correlation id tying together the log lines of one run.
    pub run_id: Uuid,
}

impl RunContext {
    /// Build a context rooted at `root`, resolved to an absolute path.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            root: std::path::absolute(root)?,
            started_at: Utc::now(),
            run_id: Uuid::new_v4(),
        })
    }
}
