//! Dependency resolution for a single plugin

use crate::descriptor::PluginDescriptor;
use crate::error::{PluginRuntimeError, Result};
use std::collections::HashMap;

/// Setup status of every configured plugin, keyed by plugin key
///
/// `false` while pending, `true` once setup completed.
pub type StatusMap = HashMap<String, bool>;

/// Decide whether `descriptor` has to wait for one of its dependencies
///
/// Returns `Ok(true)` while a configured dependency has not completed setup
/// and `Ok(false)` once the plugin is ready. Strong dependencies are checked
/// first; the first unmet one short-circuits.
///
/// # Errors
///
/// - [`PluginRuntimeError::SelfDependency`] if either dependency list contains
///   the plugin's own key
/// - [`PluginRuntimeError::DependencyMissing`] if a strong dependency is not
///   configured
pub fn should_wait(descriptor: &PluginDescriptor, status: &StatusMap) -> Result<bool> {
    let key = descriptor.key();

    if let Some(deps) = descriptor.depends_on() {
        for dep in deps {
            if dep == key {
                return Err(PluginRuntimeError::self_dependency(key));
            }
            match status.get(dep) {
                None => return Err(PluginRuntimeError::dependency_missing(key, dep)),
                Some(false) => return Ok(true),
                Some(true) => {}
            }
        }
    }

    if let Some(deps) = descriptor.flex_depends_on() {
        for dep in deps {
            if dep == key {
                return Err(PluginRuntimeError::self_dependency(key));
            }
            // Weak dependencies that are not configured are ignored
            if status.get(dep) == Some(&false) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_plugin_api::testing::MockFactory;
    use std::sync::Arc;

    fn descriptor(name: &str, factory: MockFactory) -> PluginDescriptor {
        PluginDescriptor::new(Arc::new(factory), "log", name, serde_json::Value::Null)
    }

    fn status(entries: &[(&str, bool)]) -> StatusMap {
        entries
            .iter()
            .map(|(key, done)| (key.to_string(), *done))
            .collect()
    }

    #[test]
    fn test_no_dependencies_is_ready() {
        let d = descriptor("a", MockFactory::new("log"));
        assert!(!should_wait(&d, &status(&[("log-a", false)])).unwrap());
    }

    #[test]
    fn test_strong_dependency_pending() {
        let d = descriptor("a", MockFactory::new("log").depends_on(["log-b"]));
        let st = status(&[("log-a", false), ("log-b", false)]);
        assert!(should_wait(&d, &st).unwrap());
    }

    #[test]
    fn test_strong_dependency_done() {
        let d = descriptor("a", MockFactory::new("log").depends_on(["log-b"]));
        let st = status(&[("log-a", false), ("log-b", true)]);
        assert!(!should_wait(&d, &st).unwrap());
    }

    #[test]
    fn test_strong_dependency_missing() {
        let d = descriptor("a", MockFactory::new("log").depends_on(["log-missing"]));
        let err = should_wait(&d, &status(&[("log-a", false)])).unwrap_err();
        assert!(matches!(
            err,
            PluginRuntimeError::DependencyMissing { ref plugin, ref dependency }
                if plugin == "log-a" && dependency == "log-missing"
        ));
    }

    #[test]
    fn test_self_dependency_checked_before_existence() {
        // Own key is not in the status map yet the self check must win
        let d = descriptor("self", MockFactory::new("log").depends_on(["log-self"]));
        let err = should_wait(&d, &StatusMap::new()).unwrap_err();
        assert!(matches!(err, PluginRuntimeError::SelfDependency { .. }));
    }

    #[test]
    fn test_flex_self_dependency() {
        let d = descriptor("a", MockFactory::new("log").flex_depends_on(["log-a"]));
        let err = should_wait(&d, &status(&[("log-a", false)])).unwrap_err();
        assert!(matches!(err, PluginRuntimeError::SelfDependency { .. }));
    }

    #[test]
    fn test_flex_dependency_missing_is_ignored() {
        let d = descriptor("a", MockFactory::new("log").flex_depends_on(["log-missing"]));
        assert!(!should_wait(&d, &status(&[("log-a", false)])).unwrap());
    }

    #[test]
    fn test_flex_dependency_pending() {
        let d = descriptor("a", MockFactory::new("log").flex_depends_on(["log-b"]));
        let st = status(&[("log-a", false), ("log-b", false)]);
        assert!(should_wait(&d, &st).unwrap());
    }

    #[test]
    fn test_strong_wait_short_circuits_flex_checks() {
        // The flex self reference is never reached while the strong dep is pending
        let d = descriptor(
            "a",
            MockFactory::new("log")
                .depends_on(["log-b"])
                .flex_depends_on(["log-a"]),
        );
        let st = status(&[("log-a", false), ("log-b", false)]);
        assert!(should_wait(&d, &st).unwrap());

        let st = status(&[("log-a", false), ("log-b", true)]);
        assert!(should_wait(&d, &st).is_err());
    }
}
