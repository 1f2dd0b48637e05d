//! Orchestration limits and process-wide defaults

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum number of configured plugins
pub const DEFAULT_MAX_PLUGINS: usize = 1000;

/// Default per-plugin setup timeout
pub const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(3);

static GLOBAL_OPTIONS: Lazy<RwLock<SetupOptions>> =
    Lazy::new(|| RwLock::new(SetupOptions::default()));

/// What happens to a setup call that outlives its timeout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Leave the setup task running and discard its result
    #[default]
    Detach,

    /// Abort the setup task at its next await point
    Abort,
}

/// Limits applied to an orchestration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupOptions {
    /// Maximum number of configured plugins
    pub max_plugins: usize,

    /// Per-plugin setup timeout
    #[serde(with = "humantime_serde")]
    pub setup_timeout: Duration,

    /// Handling of timed-out setup calls
    pub timeout_policy: TimeoutPolicy,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            max_plugins: DEFAULT_MAX_PLUGINS,
            setup_timeout: DEFAULT_SETUP_TIMEOUT,
            timeout_policy: TimeoutPolicy::Detach,
        }
    }
}

impl SetupOptions {
    /// Snapshot of the process-wide defaults
    pub fn global() -> Self {
        GLOBAL_OPTIONS.read().clone()
    }

    /// Replace the process-wide defaults
    ///
    /// Managers created afterwards pick up the new values; existing managers
    /// keep the snapshot they were created with.
    pub fn set_global(options: SetupOptions) {
        tracing::debug!(
            max_plugins = options.max_plugins,
            setup_timeout_ms = options.setup_timeout.as_millis() as u64,
            "Updating global plugin setup options"
        );
        *GLOBAL_OPTIONS.write() = options;
    }

    /// Set the maximum plugin count
    pub fn with_max_plugins(mut self, max_plugins: usize) -> Self {
        self.max_plugins = max_plugins;
        self
    }

    /// Set the per-plugin setup timeout
    pub fn with_setup_timeout(mut self, timeout: Duration) -> Self {
        self.setup_timeout = timeout;
        self
    }

    /// Set the timeout policy
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SetupOptions::default();
        assert_eq!(options.max_plugins, 1000);
        assert_eq!(options.setup_timeout, Duration::from_secs(3));
        assert_eq!(options.timeout_policy, TimeoutPolicy::Detach);
    }

    #[test]
    fn test_builder() {
        let options = SetupOptions::default()
            .with_max_plugins(2)
            .with_setup_timeout(Duration::from_millis(50))
            .with_timeout_policy(TimeoutPolicy::Abort);

        assert_eq!(options.max_plugins, 2);
        assert_eq!(options.setup_timeout, Duration::from_millis(50));
        assert_eq!(options.timeout_policy, TimeoutPolicy::Abort);
    }

    #[test]
    fn test_deserialize_humantime() {
        let options: SetupOptions = serde_yaml::from_str(
            "max_plugins: 10\nsetup_timeout: 500ms\ntimeout_policy: abort\n",
        )
        .unwrap();

        assert_eq!(options.max_plugins, 10);
        assert_eq!(options.setup_timeout, Duration::from_millis(500));
        assert_eq!(options.timeout_policy, TimeoutPolicy::Abort);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: SetupOptions = serde_json::from_str(r#"{"setup_timeout": "5s"}"#).unwrap();
        assert_eq!(options.max_plugins, DEFAULT_MAX_PLUGINS);
        assert_eq!(options.setup_timeout, Duration::from_secs(5));
    }
}
