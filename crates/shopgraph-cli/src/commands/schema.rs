//! Graph schema command.

use anyhow::Result;
use colored::Colorize;

use crate::config::{connect_graph, ServiceConfig};

pub async fn execute(config: &ServiceConfig) -> Result<()> {
    let client = connect_graph(&config.graph).await?;

    println!("{}", "Creating graph indexes...".bold());
    let applied = shopgraph_graph::schema::initialize_schema(&client).await?;
    println!("{} {} statements applied", "Schema ready:".green().bold(), applied);

    Ok(())
}
