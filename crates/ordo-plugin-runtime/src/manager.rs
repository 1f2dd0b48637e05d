//! Plugin manager: the orchestration entry point

use crate::closer::PluginCloser;
use crate::config::PluginConfig;
use crate::descriptor::PluginDescriptor;
use crate::error::{PluginRuntimeError, Result};
use crate::options::SetupOptions;
use crate::registry::{FactoryLookup, FactoryRegistry};
use crate::scheduler;
use ordo_plugin_api::PluginError;
use std::sync::Arc;
use tracing::{error, info};

/// Sets up configured plugins and hands back their teardown
///
/// The manager is the explicit context of an orchestration run: it owns the
/// factory lookup and the limits the run is held to.
#[derive(Clone, Debug)]
pub struct PluginManager {
    lookup: Arc<dyn FactoryLookup>,
    options: SetupOptions,
}

impl PluginManager {
    /// Create a manager over `lookup`, using the global default options
    pub fn new(lookup: Arc<dyn FactoryLookup>) -> Self {
        Self {
            lookup,
            options: SetupOptions::global(),
        }
    }

    /// Create a manager over a factory registry
    pub fn with_registry(registry: FactoryRegistry) -> Self {
        Self::new(Arc::new(registry))
    }

    /// Override the options for this manager
    pub fn with_options(mut self, options: SetupOptions) -> Self {
        self.options = options;
        self
    }

    /// Options applied to runs of this manager
    pub fn options(&self) -> &SetupOptions {
        &self.options
    }

    /// Set up every configured plugin and return their combined close handle
    ///
    /// Plugins are set up once each, dependencies first. After all setups
    /// succeed, finish notifications are sent in setup order. Any error
    /// aborts the run and no close handle is returned; plugins that were
    /// already set up are not closed.
    pub async fn setup_closables(&self, config: &PluginConfig) -> Result<PluginCloser> {
        let count = config.len();
        if count > self.options.max_plugins {
            error!(
                count,
                max = self.options.max_plugins,
                "Too many plugins configured"
            );
            return Err(PluginRuntimeError::TooManyPlugins {
                count,
                max: self.options.max_plugins,
            });
        }

        let descriptors = self.descriptors(config)?;
        info!(plugins = descriptors.len(), "Setting up plugins");

        let schedule = scheduler::run(descriptors, &self.options).await?;

        for descriptor in &schedule.completed {
            if !descriptor.capabilities.finish_notified {
                continue;
            }
            if let Err(source) = notify_finish(descriptor).await {
                error!(plugin = %descriptor.key(), error = %source, "Finish notification failed");
                return Err(PluginRuntimeError::FinishFailed {
                    key: descriptor.key().to_string(),
                    source,
                });
            }
        }

        let setup_order = schedule
            .completed
            .iter()
            .map(|d| d.key().to_string())
            .collect();

        Ok(PluginCloser::new(schedule.closers, setup_order))
    }

    /// Resolve the factory of every configured plugin
    fn descriptors(&self, config: &PluginConfig) -> Result<Vec<PluginDescriptor>> {
        config
            .iter()
            .map(|(plugin_type, name, value)| {
                let factory = self.lookup.lookup(plugin_type, name).ok_or_else(|| {
                    error!(plugin_type = %plugin_type, plugin = %name, "Plugin not registered");
                    PluginRuntimeError::not_found(plugin_type, name)
                })?;
                Ok(PluginDescriptor::new(factory, plugin_type, name, value.clone()))
            })
            .collect()
    }
}

/// Send the finish notification of a plugin captured as finish-notified
async fn notify_finish(descriptor: &PluginDescriptor) -> std::result::Result<(), PluginError> {
    match descriptor.factory.as_finish_notifier() {
        Some(notifier) => notifier.on_finish(&descriptor.name).await,
        None => Err(PluginError::finish("finish notifier no longer available")),
    }
}
