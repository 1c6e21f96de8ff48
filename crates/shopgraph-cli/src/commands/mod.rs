//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ServiceConfig;

pub mod query;
pub mod schema;
pub mod serve;
pub mod status;

/// Shopgraph - retail transaction analytics over a graph store
#[derive(Parser)]
#[command(name = "shopgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "SHOPGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Neo4j Bolt URI
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub neo4j_uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub neo4j_user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub neo4j_password: Option<String>,

    /// Neo4j database name
    #[arg(long, global = true, env = "NEO4J_DATABASE")]
    pub neo4j_database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve(serve::ServeArgs),

    /// Create the graph's entry-point indexes
    Schema,

    /// Show node and relationship counts
    Status,

    /// Run one catalog template and print its JSON result
    Query(query::QueryArgs),
}

impl Cli {
    /// Config file values with command-line / environment overrides applied.
    pub fn resolve_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::load(self.config.as_deref())?;

        if let Some(uri) = &self.neo4j_uri {
            config.graph.uri = uri.clone();
        }
        if let Some(user) = &self.neo4j_user {
            config.graph.user = user.clone();
        }
        if let Some(password) = &self.neo4j_password {
            config.graph.password = password.clone();
        }
        if let Some(database) = &self.neo4j_database {
            config.graph.database = database.clone();
        }

        Ok(config)
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.resolve_config()?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Schema => schema::execute(&config).await,
            Commands::Status => status::execute(&config).await,
            Commands::Query(args) => query::execute(args, &config).await,
        }
    }
}
