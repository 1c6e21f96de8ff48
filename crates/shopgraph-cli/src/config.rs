//! Service configuration: TOML file, then command-line / environment overrides.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use shopgraph_core::{AnalyticsStore, MemoryStore};
use shopgraph_graph::{GraphClient, GraphConfig};
use shopgraph_web::ServerConfig;
use tracing::info;

/// How long to wait for the first Bolt handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub graph: GraphConfig,
    pub server: ServerConfig,
}

/// Default config file location: `<config_dir>/shopgraph/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shopgraph").join("config.toml"))
}

impl ServiceConfig {
    /// Load from `path`, or from the default location when it exists.
    ///
    /// An explicitly given path must exist; a missing default file yields
    /// the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Open the store the service should run against.
pub async fn open_store(config: &GraphConfig, memory: bool) -> Result<Arc<dyn AnalyticsStore>> {
    if memory {
        info!("Using embedded in-memory graph store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let client = connect_graph(config).await?;
    Ok(Arc::new(client))
}

/// Connect to Neo4j, failing fast when it does not answer.
pub async fn connect_graph(config: &GraphConfig) -> Result<GraphClient> {
    info!(uri = %config.uri, database = %config.database, "Connecting to Neo4j");
    tokio::time::timeout(CONNECT_TIMEOUT, GraphClient::connect(config))
        .await
        .with_context(|| format!("Timed out connecting to Neo4j at {}", config.uri))?
}
