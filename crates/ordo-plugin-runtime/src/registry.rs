//! Factory registry: `plugin type -> plugin name -> factory`

use dashmap::DashMap;
use ordo_plugin_api::Factory;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve a configured plugin to its factory
///
/// This is the only view of the registry the orchestrator needs, so hosts
/// can plug in their own storage.
pub trait FactoryLookup: Send + Sync + fmt::Debug {
    /// Factory registered for `plugin_type` under `name`
    fn lookup(&self, plugin_type: &str, name: &str) -> Option<Arc<dyn Factory>>;
}

/// Thread-safe factory registry
///
/// Registering a second factory under the same type and name replaces the
/// first one.
#[derive(Clone, Debug, Default)]
pub struct FactoryRegistry {
    /// Registered factories (type -> name -> factory)
    factories: Arc<DashMap<String, HashMap<String, Arc<dyn Factory>>>>,
}

impl FactoryRegistry {
    /// Create a new factory registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name` for its own plugin type
    pub fn register(&self, name: impl Into<String>, factory: Arc<dyn Factory>) {
        let name = name.into();
        let plugin_type = factory.plugin_type().to_string();

        let replaced = self
            .factories
            .entry(plugin_type.clone())
            .or_default()
            .insert(name.clone(), factory)
            .is_some();

        if replaced {
            debug!(plugin_type = %plugin_type, plugin = %name, "Factory replaced");
        }
        info!(plugin_type = %plugin_type, plugin = %name, "Factory registered");
    }

    /// Remove the factory registered for `plugin_type` under `name`
    pub fn unregister(&self, plugin_type: &str, name: &str) -> Option<Arc<dyn Factory>> {
        let removed = self
            .factories
            .get_mut(plugin_type)
            .and_then(|mut names| names.remove(name));

        if removed.is_some() {
            info!(plugin_type = %plugin_type, plugin = %name, "Factory unregistered");
        }
        removed
    }

    /// Get a factory by type and name
    pub fn get(&self, plugin_type: &str, name: &str) -> Option<Arc<dyn Factory>> {
        self.factories
            .get(plugin_type)
            .and_then(|names| names.get(name).cloned())
    }

    /// Check if a factory is registered
    pub fn contains(&self, plugin_type: &str, name: &str) -> bool {
        self.factories
            .get(plugin_type)
            .is_some_and(|names| names.contains_key(name))
    }

    /// List registered `(type, name)` pairs, sorted
    pub fn list(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .factories
            .iter()
            .flat_map(|entry| {
                let plugin_type = entry.key().clone();
                entry
                    .value()
                    .keys()
                    .map(|name| (plugin_type.clone(), name.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        entries.sort();
        entries
    }

    /// Get factory count
    pub fn len(&self) -> usize {
        self.factories.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if no factory is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FactoryLookup for FactoryRegistry {
    fn lookup(&self, plugin_type: &str, name: &str) -> Option<Arc<dyn Factory>> {
        self.get(plugin_type, name)
    }
}
