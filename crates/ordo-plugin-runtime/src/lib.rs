//! # Ordo Plugin Runtime
//!
//! Dependency-ordered setup and reverse-order teardown of configured plugins.
//!
//! ## Features
//!
//! - **Factory Registry**: `type -> name -> factory` lookup
//! - **Dependency Ordering**: strong and weak dependencies, cycle detection
//! - **Setup Timeout**: each plugin's setup is bounded
//! - **Finish Notification**: plugins learn when every setup is done
//! - **Teardown**: one close handle, reverse setup order
//!
//! ## Example
//!
//! ```rust,no_run
//! use ordo_plugin_runtime::*;
//!
//! # async fn example() -> Result<()> {
//! let registry = FactoryRegistry::new();
//! // registry.register("default", Arc::new(MyLogFactory::new()));
//!
//! let config = PluginConfig::from_path("plugins.yaml")?;
//! let manager = PluginManager::with_registry(registry);
//!
//! let closer = manager.setup_closables(&config).await?;
//!
//! // ... run the application ...
//!
//! closer.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod closer;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod scheduler;

pub use closer::{CloseEntry, PluginCloser};
pub use config::{ConfigFormat, PluginConfig};
pub use descriptor::PluginDescriptor;
pub use error::{PluginRuntimeError, Result};
pub use manager::PluginManager;
pub use options::{SetupOptions, TimeoutPolicy, DEFAULT_MAX_PLUGINS, DEFAULT_SETUP_TIMEOUT};
pub use registry::{FactoryLookup, FactoryRegistry};
pub use resolver::StatusMap;

// Re-export plugin API types for convenience
pub use ordo_plugin_api::{
    decoder, factory, plugin_key, Capabilities, Closer, Decoder, Depender, Factory,
    FinishNotifier, FlexDepender, PluginError, ValueDecoder,
};

/// Prelude module with commonly used types
pub mod prelude {
    pub use crate::closer::PluginCloser;
    pub use crate::config::PluginConfig;
    pub use crate::error::{PluginRuntimeError, Result};
    pub use crate::manager::PluginManager;
    pub use crate::options::SetupOptions;
    pub use crate::registry::{FactoryLookup, FactoryRegistry};
    pub use ordo_plugin_api::prelude::*;
}
