//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{open_store, ServiceConfig};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "SHOPGRAPH_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "SHOPGRAPH_HOST")]
    pub host: Option<String>,

    /// Serve from an embedded in-memory graph instead of Neo4j
    #[arg(long)]
    pub memory: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, mut config: ServiceConfig) -> Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    let store = open_store(&config.graph, args.memory).await?;
    let backend = if args.memory { "in-memory".to_string() } else { config.graph.uri.clone() };

    println!();
    println!("  {} {}", "Shopgraph".cyan().bold(), "API Server".bold());
    println!();
    println!(
        "  {}      http://{}:{}",
        "API".green(),
        config.server.host,
        config.server.port
    );
    println!("  {}    {}", "Graph".green(), backend);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    shopgraph_web::run_server(store, &config.server).await
}
