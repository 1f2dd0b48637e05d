//! Plugin factory trait and optional capabilities

use crate::decoder::Decoder;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Core trait every plugin factory must implement
///
/// A factory is registered under a name for its [`plugin_type`](Factory::plugin_type)
/// and is set up once per orchestration run with the configuration found at
/// `type -> name` in the plugin configuration.
///
/// Optional roles are exposed through the `as_*` accessors. Override the
/// accessor to return `Some(self)` when the factory implements the role.
#[async_trait]
pub trait Factory: Send + Sync + fmt::Debug {
    /// Plugin type, e.g. `log`, `config`, `selector`
    fn plugin_type(&self) -> &str;

    /// Set up the plugin registered under `name`
    ///
    /// The plugin decodes its own configuration from `decoder`.
    async fn setup(&self, name: &str, decoder: &dyn Decoder) -> Result<()>;

    /// Strong dependencies (if any)
    fn as_depender(&self) -> Option<&dyn Depender> {
        None
    }

    /// Weak dependencies (if any)
    fn as_flex_depender(&self) -> Option<&dyn FlexDepender> {
        None
    }

    /// Teardown support (if any)
    fn as_closer(&self) -> Option<&dyn Closer> {
        None
    }

    /// Finish notification support (if any)
    fn as_finish_notifier(&self) -> Option<&dyn FinishNotifier> {
        None
    }

    /// Collect the optional roles this factory supports
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            depends_on: self.as_depender().map(|d| d.depends_on()),
            flex_depends_on: self.as_flex_depender().map(|d| d.flex_depends_on()),
            closeable: self.as_closer().is_some(),
            finish_notified: self.as_finish_notifier().is_some(),
        }
    }
}

/// Strong dependency declaration
///
/// Every listed key (`type-name`) must be configured and must finish setup
/// before the declaring plugin is set up.
pub trait Depender: Send + Sync {
    /// Keys of the plugins this plugin depends on
    fn depends_on(&self) -> Vec<String>;
}

/// Weak dependency declaration
///
/// Listed keys that are not configured are ignored. Configured ones must
/// finish setup first.
pub trait FlexDepender: Send + Sync {
    /// Keys of the plugins this plugin optionally depends on
    fn flex_depends_on(&self) -> Vec<String>;
}

/// Plugin teardown
#[async_trait]
pub trait Closer: Send + Sync {
    /// Release the resources acquired during setup
    async fn close(&self) -> Result<()>;
}

/// Notification that every configured plugin has been set up
#[async_trait]
pub trait FinishNotifier: Send + Sync {
    /// Called once, after all plugins completed setup
    async fn on_finish(&self, name: &str) -> Result<()>;
}

/// Optional roles supported by a factory, captured once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Strong dependency keys
    pub depends_on: Option<Vec<String>>,

    /// Weak dependency keys
    pub flex_depends_on: Option<Vec<String>>,

    /// Whether the factory implements [`Closer`]
    pub closeable: bool,

    /// Whether the factory implements [`FinishNotifier`]
    pub finish_notified: bool,
}

impl Capabilities {
    /// Check if the plugin declares any dependency
    pub fn has_dependencies(&self) -> bool {
        self.depends_on.as_ref().is_some_and(|d| !d.is_empty())
            || self.flex_depends_on.as_ref().is_some_and(|d| !d.is_empty())
    }
}

/// Build the key identifying a configured plugin
pub fn plugin_key(plugin_type: &str, name: &str) -> String {
    format!("{plugin_type}-{name}")
}
