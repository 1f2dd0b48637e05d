//! Plugin runtime error types

use ordo_plugin_api::PluginError;
use std::fmt;
use std::time::Duration;

/// Plugin runtime error type
///
/// Every variant is fatal for the orchestration run that produced it.
#[derive(Debug, thiserror::Error)]
pub enum PluginRuntimeError {
    /// No factory registered for the configured type and name
    #[error("Plugin not found: {plugin_type}-{name}")]
    PluginNotFound {
        /// Configured plugin type
        plugin_type: String,
        /// Configured plugin name
        name: String,
    },

    /// More plugins configured than allowed
    #[error("Too many plugins: {count} configured, at most {max} allowed")]
    TooManyPlugins {
        /// Number of configured plugins
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// Plugin lists its own key as a dependency
    #[error("plugin not allowed to depend on itself: {key}")]
    SelfDependency {
        /// Offending plugin key
        key: String,
    },

    /// Strong dependency is not configured
    #[error("Dependency missing: {plugin} depends on non-existent plugin {dependency}")]
    DependencyMissing {
        /// Dependent plugin key
        plugin: String,
        /// Missing dependency key
        dependency: String,
    },

    /// Dependency cycle detected
    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    /// Plugin setup returned an error
    #[error("Setup failed for plugin {key}: {source}")]
    SetupFailed {
        /// Plugin key
        key: String,
        /// Error reported by the plugin
        #[source]
        source: PluginError,
    },

    /// Plugin setup did not complete in time
    #[error("Setup timed out for plugin {key} after {timeout:?}")]
    SetupTimeout {
        /// Plugin key
        key: String,
        /// Configured setup timeout
        timeout: Duration,
    },

    /// Finish notification failed
    #[error("Finish notification failed for plugin {key}: {source}")]
    FinishFailed {
        /// Plugin key
        key: String,
        /// Error reported by the plugin
        #[source]
        source: PluginError,
    },

    /// Plugin close failed
    #[error("Close failed for plugin {key}: {source}")]
    CloseFailed {
        /// Plugin key
        key: String,
        /// Error reported by the plugin
        #[source]
        source: PluginError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for plugin runtime operations
pub type Result<T> = std::result::Result<T, PluginRuntimeError>;

impl PluginRuntimeError {
    /// Create a new plugin not found error
    pub fn not_found(plugin_type: impl fmt::Display, name: impl fmt::Display) -> Self {
        Self::PluginNotFound {
            plugin_type: plugin_type.to_string(),
            name: name.to_string(),
        }
    }

    /// Create a new self dependency error
    pub fn self_dependency(key: impl fmt::Display) -> Self {
        Self::SelfDependency {
            key: key.to_string(),
        }
    }

    /// Create a new dependency missing error
    pub fn dependency_missing(plugin: impl fmt::Display, dependency: impl fmt::Display) -> Self {
        Self::DependencyMissing {
            plugin: plugin.to_string(),
            dependency: dependency.to_string(),
        }
    }

    /// Create a new dependency cycle error
    pub fn dependency_cycle(msg: impl fmt::Display) -> Self {
        Self::DependencyCycle(msg.to_string())
    }

    /// Create a new config error
    pub fn config(msg: impl fmt::Display) -> Self {
        Self::ConfigError(msg.to_string())
    }

    /// Key of the plugin the error is attributed to, if any
    pub fn plugin_key(&self) -> Option<&str> {
        match self {
            Self::SelfDependency { key }
            | Self::SetupFailed { key, .. }
            | Self::SetupTimeout { key, .. }
            | Self::FinishFailed { key, .. }
            | Self::CloseFailed { key, .. } => Some(key),
            Self::DependencyMissing { plugin, .. } => Some(plugin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PluginRuntimeError::not_found("log", "default");
        assert!(matches!(err, PluginRuntimeError::PluginNotFound { .. }));

        let err = PluginRuntimeError::self_dependency("log-default");
        assert!(matches!(err, PluginRuntimeError::SelfDependency { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = PluginRuntimeError::not_found("log", "default");
        assert_eq!(err.to_string(), "Plugin not found: log-default");

        let err = PluginRuntimeError::self_dependency("log-self");
        assert_eq!(
            err.to_string(),
            "plugin not allowed to depend on itself: log-self"
        );

        let err = PluginRuntimeError::dependency_missing("db-main", "log-missing");
        assert_eq!(
            err.to_string(),
            "Dependency missing: db-main depends on non-existent plugin log-missing"
        );
    }

    #[test]
    fn test_plugin_key() {
        let err = PluginRuntimeError::SetupFailed {
            key: "db-main".to_string(),
            source: PluginError::setup("boom"),
        };
        assert_eq!(err.plugin_key(), Some("db-main"));
        assert_eq!(
            err.to_string(),
            "Setup failed for plugin db-main: Setup failed: boom"
        );

        let err = PluginRuntimeError::dependency_cycle("log-a, log-b");
        assert_eq!(err.plugin_key(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "plugins.yaml");
        let err: PluginRuntimeError = io.into();
        assert!(matches!(err, PluginRuntimeError::IoError(_)));
        assert_eq!(err.to_string(), "I/O error: plugins.yaml");
    }
}
