//! Graph status command.

use anyhow::Result;
use colored::Colorize;

use crate::config::{connect_graph, ServiceConfig};

pub async fn execute(config: &ServiceConfig) -> Result<()> {
    let client = connect_graph(&config.graph).await?;
    let counts = client.get_counts().await?;

    println!("{}", "Graph Status".bold());
    println!("  {}  {}", "URI:".dimmed(), config.graph.uri);
    println!("  {}  {}", "Nodes:".dimmed(), counts.nodes);
    println!("  {}  {}", "Relationships:".dimmed(), counts.relationships);

    Ok(())
}
