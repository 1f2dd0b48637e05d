//! Aggregate teardown of set-up plugins

use crate::descriptor::PluginDescriptor;
use crate::error::{PluginRuntimeError, Result};
use ordo_plugin_api::{Factory, PluginError};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Close operation of one closeable plugin
#[derive(Debug, Clone)]
pub struct CloseEntry {
    key: String,
    factory: Arc<dyn Factory>,
}

impl CloseEntry {
    /// Capture the close operation of a set-up plugin
    ///
    /// Returns `None` unless the plugin was captured as closeable.
    pub fn from_descriptor(descriptor: &PluginDescriptor) -> Option<Self> {
        descriptor.capabilities.closeable.then(|| Self {
            key: descriptor.key().to_string(),
            factory: Arc::clone(&descriptor.factory),
        })
    }

    /// Key of the plugin this entry closes
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn close(&self) -> Result<()> {
        let result = match self.factory.as_closer() {
            Some(closer) => closer.close().await,
            None => Err(PluginError::close("closer no longer available")),
        };

        result.map_err(|source| PluginRuntimeError::CloseFailed {
            key: self.key.clone(),
            source,
        })
    }
}

/// Teardown handle returned by a successful orchestration run
///
/// [`close`](PluginCloser::close) closes every closeable plugin in reverse
/// order of setup completion and consumes the handle, so each plugin is
/// closed at most once.
#[derive(Debug, Default)]
#[must_use = "plugins are only closed when `close` is called"]
pub struct PluginCloser {
    entries: Vec<CloseEntry>,
    setup_order: Vec<String>,
}

impl PluginCloser {
    /// Create a closer over entries given in setup completion order
    pub fn new(entries: Vec<CloseEntry>, setup_order: Vec<String>) -> Self {
        Self {
            entries,
            setup_order,
        }
    }

    /// Keys of every set-up plugin, in setup completion order
    pub fn setup_order(&self) -> &[String] {
        &self.setup_order
    }

    /// Keys of closeable plugins, in the order they will be closed
    pub fn close_order(&self) -> Vec<&str> {
        self.entries.iter().rev().map(CloseEntry::key).collect()
    }

    /// Number of closeable plugins
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there is nothing to close
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Close all plugins, last set up first
    ///
    /// Stops at the first failing close; the remaining plugins are left open.
    pub async fn close(self) -> Result<()> {
        let total = self.entries.len();

        for entry in self.entries.into_iter().rev() {
            debug!(plugin = %entry.key(), "Closing plugin");
            if let Err(e) = entry.close().await {
                error!(plugin = %entry.key(), error = %e, "Plugin close failed");
                return Err(e);
            }
        }

        info!(plugins = total, "All plugins closed");
        Ok(())
    }
}
