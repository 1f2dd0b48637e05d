//! Per-run plugin descriptor

use ordo_plugin_api::{plugin_key, Capabilities, Factory};
use std::sync::Arc;

/// Runtime record binding a factory to its configured identity
///
/// Built once per configured `(type, name)` pair for a single orchestration
/// run. Capabilities are queried from the factory when the descriptor is
/// built and never again.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    /// Factory instance
    pub factory: Arc<dyn Factory>,

    /// Plugin type
    pub plugin_type: String,

    /// Plugin name
    pub name: String,

    /// Raw plugin configuration
    pub config: serde_json::Value,

    /// Optional roles supported by the factory
    pub capabilities: Capabilities,

    key: String,
}

impl PluginDescriptor {
    /// Create a descriptor for the plugin configured at `plugin_type -> name`
    pub fn new(
        factory: Arc<dyn Factory>,
        plugin_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        let plugin_type = plugin_type.into();
        let name = name.into();
        let capabilities = factory.capabilities();

        Self {
            key: plugin_key(&plugin_type, &name),
            factory,
            plugin_type,
            name,
            config,
            capabilities,
        }
    }

    /// Unique key (`type-name`), used to reference the plugin as a dependency
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Strong dependency keys, if the factory declares any
    pub fn depends_on(&self) -> Option<&[String]> {
        self.capabilities.depends_on.as_deref()
    }

    /// Weak dependency keys, if the factory declares any
    pub fn flex_depends_on(&self) -> Option<&[String]> {
        self.capabilities.flex_depends_on.as_deref()
    }
}
