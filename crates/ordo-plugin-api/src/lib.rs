//! # Ordo Plugin API
//!
//! Contracts implemented by plugin factories managed by the Ordo plugin
//! orchestrator.
//!
//! ## Capabilities
//!
//! - **Factory**: mandatory; sets the plugin up from its configuration
//! - **Depender**: strong dependencies that must exist and set up first
//! - **FlexDepender**: weak dependencies, ignored when not configured
//! - **Closer**: teardown, run in reverse setup order
//! - **FinishNotifier**: called once every plugin has been set up
//!
//! ## Example
//!
//! ```rust,no_run
//! use ordo_plugin_api::*;
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct ConsoleLog;
//!
//! #[async_trait]
//! impl Factory for ConsoleLog {
//!     fn plugin_type(&self) -> &str { "log" }
//!
//!     async fn setup(&self, name: &str, decoder: &dyn Decoder) -> Result<(), PluginError> {
//!         let _config: serde_json::Value = decoder.decode()?;
//!         Ok(())
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod decoder;
pub mod error;
pub mod factory;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export commonly used types
pub use decoder::{Decoder, ValueDecoder};
pub use error::PluginError;
pub use factory::{
    plugin_key, Capabilities, Closer, Depender, Factory, FinishNotifier, FlexDepender,
};

/// Prelude module with commonly used types
pub mod prelude {
    pub use crate::decoder::{Decoder, ValueDecoder};
    pub use crate::error::PluginError;
    pub use crate::factory::{Closer, Depender, Factory, FinishNotifier, FlexDepender};
    pub use async_trait::async_trait;
}
