//! Built-in plugins and the registry that serves them.
//!
//! Each plugin module exposes a `Factory` plus the typed configuration its
//! declarations carry. Out-of-tree plugins register through
//! [`PluginRegistry::register`](crate::resolve::PluginRegistry::register)
//! on top of [`builtin_registry`].

pub mod filesystem;
pub mod github;
pub mod s3;

use std::sync::Arc;

use crate::resolve::PluginRegistry;

/// A registry preloaded with every built-in plugin.
pub fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register("filesystem", Arc::new(filesystem::Factory));
    registry.register("github", Arc::new(github::Factory));
    registry.register("aws-s3", Arc::new(s3::Factory));
    registry
}
