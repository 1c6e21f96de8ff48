//! Run a catalog template from the command line.

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use shopgraph_core::{AnalyticsStore, QueryTemplate};

use crate::config::{connect_graph, ServiceConfig};

#[derive(Args)]
pub struct QueryArgs {
    /// Template name (all-buyers, purchase-history, same-ip, product-recommendations,
    /// buyers-of-the-day, products-of-the-day, transactions-of-the-day)
    pub template: String,

    /// Buyer id or date, for templates that take one
    pub param: Option<String>,
}

pub async fn execute(args: QueryArgs, config: &ServiceConfig) -> Result<()> {
    let template = QueryTemplate::from_name(&args.template).ok_or_else(|| {
        let known: Vec<&str> = QueryTemplate::ALL.iter().map(|t| t.name()).collect();
        anyhow!("Unknown template '{}'. Known: {}", args.template, known.join(", "))
    })?;
    let bound = template.bind(args.param.as_deref())?;

    let client = connect_graph(&config.graph).await?;
    let store: &dyn AnalyticsStore = &client;
    let bytes = bound.execute(store).await?;

    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    let empty = match &value {
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };

    if empty {
        println!("{}", "No results.".dimmed());
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}
