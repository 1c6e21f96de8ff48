//! Application state and server settings.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use shopgraph_core::AnalyticsStore;

use crate::gateway::Gateway;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests allowed to hold a store session at once.
    pub max_in_flight: usize,
    pub query_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_in_flight: 64,
            query_timeout_secs: 30,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(store: Arc<dyn AnalyticsStore>, config: &ServerConfig) -> Self {
        let gateway = Gateway::new(
            store,
            config.max_in_flight,
            Duration::from_secs(config.query_timeout_secs),
        );
        Self { gateway }
    }
}
