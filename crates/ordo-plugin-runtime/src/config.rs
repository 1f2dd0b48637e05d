//! Plugin configuration: `plugin type -> plugin name -> config value`
//!
//! ```yaml
//! log:
//!   default:
//!     level: debug
//! database:
//!   main:
//!     dsn: ${DATABASE_URL:-sqlite://memory}
//! ```

use crate::error::{PluginRuntimeError, Result};
use ordo_plugin_api::plugin_key;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use tracing::error;

/// Configuration of all plugins, keyed by type then name
///
/// Iteration is ordered by type, then by name, which fixes the order in which
/// independent plugins are set up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    plugins: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PluginRuntimeError::config("Unable to detect config format"))?;

        match ext {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(PluginRuntimeError::config(format!(
                "Unsupported config format: {ext}"
            ))),
        }
    }
}

impl PluginConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the configuration of one plugin
    pub fn insert(
        &mut self,
        plugin_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> &mut Self {
        self.plugins
            .entry(plugin_type.into())
            .or_default()
            .insert(name.into(), config);
        self
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(
        mut self,
        plugin_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        self.insert(plugin_type, name, config);
        self
    }

    /// Configuration of one plugin
    pub fn get(&self, plugin_type: &str, name: &str) -> Option<&serde_json::Value> {
        self.plugins.get(plugin_type).and_then(|names| names.get(name))
    }

    /// Number of configured plugins
    pub fn len(&self) -> usize {
        self.plugins.values().map(BTreeMap::len).sum()
    }

    /// Check if no plugin is configured
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(type, name, config)` in type then name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &serde_json::Value)> {
        self.plugins.iter().flat_map(|(plugin_type, names)| {
            names
                .iter()
                .map(move |(name, config)| (plugin_type.as_str(), name.as_str(), config))
        })
    }

    /// Keys (`type-name`) of all configured plugins
    pub fn keys(&self) -> Vec<String> {
        self.iter()
            .map(|(plugin_type, name, _)| plugin_key(plugin_type, name))
            .collect()
    }

    /// Load configuration from a file, detecting the format from its extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to read plugin config file");
        })?;

        let format = ConfigFormat::from_path(path)?;
        Self::from_str_with_format(&content, format)
    }

    /// Load configuration from a string
    ///
    /// `${VAR}` and `${VAR:-default}` are expanded from the environment first.
    /// Expansion runs on the raw text, so placeholders inside comments are
    /// expanded too; an unset variable without a default fails the load even
    /// when it only appears in a comment.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let expanded = expand_env_vars(content)?;

        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }

        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&expanded)
                .map_err(|e| PluginRuntimeError::config(format!("Failed to parse YAML: {e}")))?,
            ConfigFormat::Toml => toml::from_str(&expanded)
                .map_err(|e| PluginRuntimeError::config(format!("Failed to parse TOML: {e}")))?,
            ConfigFormat::Json => serde_json::from_str(&expanded)
                .map_err(|e| PluginRuntimeError::config(format!("Failed to parse JSON: {e}")))?,
        };

        Ok(config)
    }
}

/// Expand environment variables in configuration text
fn expand_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}")
        .map_err(|e| PluginRuntimeError::config(format!("Invalid regex: {e}")))?;

    let mut missing = None;
    let expanded = re.replace_all(content, |caps: &regex::Captures<'_>| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(value) => value,
            Err(_) => match caps.get(3) {
                Some(default) => default.as_str().to_string(),
                None => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            },
        }
    });

    if let Some(var_name) = missing {
        return Err(PluginRuntimeError::config(format!(
            "Environment variable '{var_name}' not set and no default provided"
        )));
    }

    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("plugins.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("plugins.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("plugins.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(&PathBuf::from("plugins.txt")).is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let config = PluginConfig::from_str_with_format(
            "log:\n  default:\n    level: debug\n    output: console\n  audit: {}\nconfig:\n  file: {}\n",
            ConfigFormat::Yaml,
        )
        .unwrap();

        assert_eq!(config.len(), 3);
        assert_eq!(
            config.get("log", "default"),
            Some(&serde_json::json!({ "level": "debug", "output": "console" }))
        );
        assert_eq!(config.keys(), vec!["config-file", "log-audit", "log-default"]);
    }

    #[test]
    fn test_parse_toml() {
        let config = PluginConfig::from_str_with_format(
            "[log.default]\nlevel = \"info\"\n\n[database.main]\nmax_connections = 4\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.len(), 2);
        assert_eq!(
            config.get("database", "main"),
            Some(&serde_json::json!({ "max_connections": 4 }))
        );
    }

    #[test]
    fn test_parse_empty() {
        let config = PluginConfig::from_str_with_format("", ConfigFormat::Yaml).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        let result = PluginConfig::from_str_with_format("{not json", ConfigFormat::Json);
        assert!(matches!(result, Err(PluginRuntimeError::ConfigError(_))));
    }

    #[test]
    fn test_env_default_expansion() {
        let config = PluginConfig::from_str_with_format(
            "database:\n  main:\n    dsn: ${ORDO_TEST_UNSET_DSN:-sqlite://memory}\n",
            ConfigFormat::Yaml,
        )
        .unwrap();

        assert_eq!(
            config.get("database", "main"),
            Some(&serde_json::json!({ "dsn": "sqlite://memory" }))
        );
    }

    #[test]
    fn test_env_missing_variable() {
        let result = PluginConfig::from_str_with_format(
            "database:\n  main:\n    dsn: ${ORDO_TEST_UNSET_WITHOUT_DEFAULT}\n",
            ConfigFormat::Yaml,
        );
        assert!(matches!(result, Err(PluginRuntimeError::ConfigError(_))));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"log": {{"default": {{"level": "warn"}}}}}}"#).unwrap();

        let config = PluginConfig::from_path(file.path()).unwrap();
        assert_eq!(
            config.get("log", "default"),
            Some(&serde_json::json!({ "level": "warn" }))
        );
    }

    #[test]
    fn test_env_expanded_in_comments() {
        let result = PluginConfig::from_str_with_format(
            "# dsn: ${ORDO_TEST_UNSET_IN_COMMENT}\nlog:\n  default: {}\n",
            ConfigFormat::Yaml,
        );
        assert!(matches!(result, Err(PluginRuntimeError::ConfigError(_))));

        let config = PluginConfig::from_str_with_format(
            "# dsn: ${ORDO_TEST_UNSET_IN_COMMENT:-unused}\nlog:\n  default: {}\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.keys(), vec!["log-default"]);
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = PluginConfig::from_path(dir.path().join("plugins.yaml"));
        assert!(matches!(result, Err(PluginRuntimeError::IoError(_))));
    }

    #[test]
    fn test_builder() {
        let config = PluginConfig::new()
            .with("log", "default", serde_json::json!({}))
            .with("log", "default", serde_json::json!({ "level": "error" }));

        assert_eq!(config.len(), 1);
        assert_eq!(
            config.get("log", "default"),
            Some(&serde_json::json!({ "level": "error" }))
        );
    }
}
