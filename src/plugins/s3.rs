//! AWS S3 plugin: bucket objects as documents, processed documents as
//! objects.
//!
//! Region and static credentials come from the plugin declaration; without
//! them the ambient AWS configuration chain (environment, profiles, instance
//! metadata) applies.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use serde::Deserialize;
use tracing::{debug, error};

use crate::contract::{
    Document, Listener, OutputCapability, Plugin, ProcessedEvent, SourceCapability,
};
use crate::error::BoxedError;
use crate::job::{OutputSpec, PluginRef, RunContext, SourceSpec};
use crate::resolve::PluginFactory;

/// Plugin-level config, carried on the job's explicit `plugins` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3PluginConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub credentials: Option<S3Credentials>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Source config: named objects in one bucket.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Source {
    pub bucket: String,
    pub keys: Vec<String>,
    #[serde(default)]
    pub ignore_keys: Vec<String>,
}

/// Output config: bucket (and optional key prefix) processed documents are
/// stored under.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Output {
    pub bucket: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

pub struct S3Plugin {
    client: aws_sdk_s3::Client,
}

pub struct Factory;

#[async_trait]
impl PluginFactory for Factory {
    async fn setup(
        &self,
        _context: &RunContext,
        config: Option<&PluginRef>,
    ) -> Result<Arc<dyn Plugin>, BoxedError> {
        let config: S3PluginConfig = match config {
            Some(declared) => declared.config()?,
            None => S3PluginConfig::default(),
        };

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region {
            loader = loader.region(Region::new(region));
        }
        if let Some(credentials) = config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id,
                credentials.secret_access_key,
                credentials.session_token,
                None,
                "job-declaration",
            ));
        }
        let shared = loader.load().await;
        Ok(Arc::new(S3Plugin { client: aws_sdk_s3::Client::new(&shared) }))
    }
}

impl Plugin for S3Plugin {
    fn name(&self) -> &str {
        "aws-s3"
    }

    fn source(&self) -> Option<&dyn SourceCapability> {
        Some(self)
    }

    fn output(&self) -> Option<&dyn OutputCapability> {
        Some(self)
    }
}

#[async_trait]
impl SourceCapability for S3Plugin {
    async fn documents(&self, spec: &SourceSpec) -> Result<Vec<Document>, BoxedError> {
        let config: S3Source = spec.config()?;
        let mut documents = Vec::new();
        for key in &config.keys {
            if config.ignore_keys.contains(key) {
                continue;
            }
            // Best effort per key: an unreadable object is logged and the
            // remaining keys still resolve.
            match self.fetch(&config.bucket, key).await {
                Ok(text) => {
                    debug!(bucket = %config.bucket, key = %key, bytes = text.len(), "fetched object");
                    documents.push(Document::new(key, text));
                }
                Err(cause) => {
                    error!(bucket = %config.bucket, key = %key, error = %cause, "failed to fetch object");
                }
            }
        }
        Ok(documents)
    }
}

impl S3Plugin {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<String, BoxedError> {
        let object = self.client.get_object().bucket(bucket).key(key).send().await?;
        let bytes = object.body.collect().await?.into_bytes();
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| -> BoxedError { format!("object {key} is not valid UTF-8: {e}").into() })?;
        Ok(text)
    }
}

#[async_trait]
impl OutputCapability for S3Plugin {
    async fn listener(&self, spec: &OutputSpec) -> Result<Box<dyn Listener>, BoxedError> {
        let config: S3Output = spec.config()?;
        Ok(Box::new(S3Listener {
            client: self.client.clone(),
            bucket: config.bucket,
            prefix: config.prefix,
        }))
    }
}

struct S3Listener {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: Option<String>,
}

#[async_trait]
impl Listener for S3Listener {
    async fn on_document(&self, event: &ProcessedEvent) -> Result<(), BoxedError> {
        let document = &event.document;
        let name = document.path.to_string_lossy();
        let key = match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), name),
            None => name.into_owned(),
        };
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(document.text.clone().into_bytes()))
            .send()
            .await?;
        debug!(bucket = %self.bucket, key = %key, "stored document");
        Ok(())
    }
}
