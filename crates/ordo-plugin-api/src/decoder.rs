//! Configuration decoding for plugin setup
//!
//! A factory never sees the configuration document directly. It receives a
//! [`Decoder`] and pulls its own configuration structure out of it:
//!
//! ```rust
//! use ordo_plugin_api::{Decoder, ValueDecoder};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct LogConfig {
//!     level: String,
//! }
//!
//! let decoder = ValueDecoder::new(serde_json::json!({ "level": "debug" }));
//! let dec: &dyn Decoder = &decoder;
//! let cfg: LogConfig = dec.decode().unwrap();
//! assert_eq!(cfg.level, "debug");
//! ```

use crate::error::{PluginError, Result};
use serde::de::DeserializeOwned;
use std::fmt;

/// Source of a single plugin's configuration
pub trait Decoder: Send + Sync + fmt::Debug {
    /// Raw configuration value for the plugin being set up
    fn raw(&self) -> Result<serde_json::Value>;
}

impl dyn Decoder + '_ {
    /// Deserialize the plugin configuration into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.raw()?;
        serde_json::from_value(value).map_err(PluginError::config)
    }
}

/// Decoder over an owned `serde_json::Value`
#[derive(Debug, Clone, Default)]
pub struct ValueDecoder {
    value: serde_json::Value,
}

impl ValueDecoder {
    /// Create a decoder for the given configuration value
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Borrow the wrapped value
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

impl Decoder for ValueDecoder {
    fn raw(&self) -> Result<serde_json::Value> {
        if self.value.is_null() {
            return Err(PluginError::config("config value empty"));
        }
        Ok(self.value.clone())
    }
}

impl From<serde_json::Value> for ValueDecoder {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct LogConfig {
        level: String,
        output: String,
    }

    #[test]
    fn test_decode_struct() {
        let decoder = ValueDecoder::new(serde_json::json!({
            "level": "debug",
            "output": "console",
        }));
        let dec: &dyn Decoder = &decoder;

        let cfg: LogConfig = dec.decode().unwrap();
        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.output, "console");
    }

    #[test]
    fn test_decode_empty_value() {
        let decoder = ValueDecoder::default();
        let dec: &dyn Decoder = &decoder;

        let err = dec.decode::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, PluginError::ConfigError(_)));
        assert_eq!(err.to_string(), "Configuration error: config value empty");
    }

    #[test]
    fn test_decode_schema_mismatch() {
        let decoder = ValueDecoder::new(serde_json::json!({ "level": 3 }));
        let dec: &dyn Decoder = &decoder;

        let err = dec.decode::<LogConfig>().unwrap_err();
        assert!(matches!(err, PluginError::ConfigError(_)));
    }
}
