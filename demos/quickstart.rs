//! Quickstart for the Ordo plugin orchestrator
//!
//! This demo:
//! - Registers a few sample factories
//! - Loads a plugin configuration (built-in or from a file)
//! - Sets plugins up in dependency order
//! - Closes them again in reverse order
//!
//! Run with: cargo run -p ordo-demos --bin quickstart -- --log-level debug

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use ordo_plugin_runtime::prelude::*;
use ordo_plugin_runtime::{ConfigFormat, SetupOptions};
use parking_lot::Mutex;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = r#"
log:
  default:
    level: info
database:
  main:
    dsn: ${ORDO_DATABASE_DSN:-postgres://localhost/ordo}
    max_connections: 8
cache:
  sessions:
    ttl_secs: 300
"#;

#[derive(Parser)]
#[command(name = "quickstart")]
#[command(about = "Set up and tear down sample plugins", long_about = None)]
struct Cli {
    /// Plugin configuration file (yaml, toml or json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Per-plugin setup timeout in milliseconds
    #[arg(long, default_value_t = 3000)]
    setup_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct LogConfig {
    level: String,
}

/// Console log plugin
#[derive(Debug, Default)]
struct ConsoleLogFactory {
    level: Mutex<Option<String>>,
}

#[async_trait]
impl Factory for ConsoleLogFactory {
    fn plugin_type(&self) -> &str {
        "log"
    }

    async fn setup(&self, name: &str, decoder: &dyn Decoder) -> Result<(), PluginError> {
        let config: LogConfig = decoder.decode()?;
        tracing::info!(plugin = %name, level = %config.level, "Console log ready");
        *self.level.lock() = Some(config.level);
        Ok(())
    }

    fn as_finish_notifier(&self) -> Option<&dyn FinishNotifier> {
        Some(self)
    }
}

#[async_trait]
impl FinishNotifier for ConsoleLogFactory {
    async fn on_finish(&self, name: &str) -> Result<(), PluginError> {
        tracing::info!(plugin = %name, "All plugins ready, flushing buffered log lines");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    dsn: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_max_connections() -> u32 {
    4
}

/// Database pool plugin, needs logging and uses metrics when present
#[derive(Debug, Default)]
struct DatabaseFactory {
    pool: Mutex<Option<DatabaseConfig>>,
}

#[async_trait]
impl Factory for DatabaseFactory {
    fn plugin_type(&self) -> &str {
        "database"
    }

    async fn setup(&self, name: &str, decoder: &dyn Decoder) -> Result<(), PluginError> {
        let config: DatabaseConfig = decoder.decode()?;
        // Stand-in for opening the connection pool
        tokio::time::sleep(Duration::from_millis(50)).await;
        tracing::info!(
            plugin = %name,
            dsn = %config.dsn,
            max_connections = config.max_connections,
            "Database pool opened"
        );
        *self.pool.lock() = Some(config);
        Ok(())
    }

    fn as_depender(&self) -> Option<&dyn Depender> {
        Some(self)
    }

    fn as_flex_depender(&self) -> Option<&dyn FlexDepender> {
        Some(self)
    }

    fn as_closer(&self) -> Option<&dyn Closer> {
        Some(self)
    }
}

impl Depender for DatabaseFactory {
    fn depends_on(&self) -> Vec<String> {
        vec!["log-default".to_string()]
    }
}

impl FlexDepender for DatabaseFactory {
    fn flex_depends_on(&self) -> Vec<String> {
        vec!["metrics-prometheus".to_string()]
    }
}

#[async_trait]
impl Closer for DatabaseFactory {
    async fn close(&self) -> Result<(), PluginError> {
        if let Some(pool) = self.pool.lock().take() {
            tracing::info!(dsn = %pool.dsn, "Database pool closed");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CacheConfig {
    ttl_secs: u64,
}

/// Session cache plugin, backed by the database
#[derive(Debug, Default)]
struct CacheFactory;

#[async_trait]
impl Factory for CacheFactory {
    fn plugin_type(&self) -> &str {
        "cache"
    }

    async fn setup(&self, name: &str, decoder: &dyn Decoder) -> Result<(), PluginError> {
        let config: CacheConfig = decoder.decode()?;
        tracing::info!(plugin = %name, ttl_secs = config.ttl_secs, "Cache warmed");
        Ok(())
    }

    fn as_depender(&self) -> Option<&dyn Depender> {
        Some(self)
    }

    fn as_closer(&self) -> Option<&dyn Closer> {
        Some(self)
    }
}

impl Depender for CacheFactory {
    fn depends_on(&self) -> Vec<String> {
        vec!["database-main".to_string()]
    }
}

#[async_trait]
impl Closer for CacheFactory {
    async fn close(&self) -> Result<(), PluginError> {
        tracing::info!("Cache flushed");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let registry = FactoryRegistry::new();
    registry.register("default", Arc::new(ConsoleLogFactory::default()));
    registry.register("main", Arc::new(DatabaseFactory::default()));
    registry.register("sessions", Arc::new(CacheFactory));

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Config file: {}", path.display());
            PluginConfig::from_path(path)?
        }
        None => PluginConfig::from_str_with_format(DEFAULT_CONFIG, ConfigFormat::Yaml)?,
    };

    let options =
        SetupOptions::global().with_setup_timeout(Duration::from_millis(cli.setup_timeout_ms));
    let manager = PluginManager::with_registry(registry).with_options(options);

    let closer = manager.setup_closables(&config).await?;
    tracing::info!(order = ?closer.setup_order(), "Plugins ready");

    closer.close().await?;
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
