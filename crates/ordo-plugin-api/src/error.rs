//! Plugin error types

use std::fmt;

/// Error reported by a plugin factory
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Setup failed
    #[error("Setup failed: {0}")]
    SetupError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Finish notification failed
    #[error("Finish notification failed: {0}")]
    FinishError(String),

    /// Close failed
    #[error("Close failed: {0}")]
    CloseError(String),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

impl PluginError {
    /// Create a new setup error
    pub fn setup(msg: impl fmt::Display) -> Self {
        Self::SetupError(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config(msg: impl fmt::Display) -> Self {
        Self::ConfigError(msg.to_string())
    }

    /// Create a new finish notification error
    pub fn finish(msg: impl fmt::Display) -> Self {
        Self::FinishError(msg.to_string())
    }

    /// Create a new close error
    pub fn close(msg: impl fmt::Display) -> Self {
        Self::CloseError(msg.to_string())
    }

    /// Create a new runtime error
    pub fn runtime(msg: impl fmt::Display) -> Self {
        Self::RuntimeError(msg.to_string())
    }
}
