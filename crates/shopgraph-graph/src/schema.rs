//! Neo4j schema initialization (entry-point indexes).

use anyhow::Result;
use neo4rs::Query;
use tracing::info;

use shopgraph_core::IndexedPredicate;

use crate::GraphClient;

/// Cypher statements for schema initialization.
pub fn schema_statements() -> Vec<String> {
    IndexedPredicate::ALL
        .iter()
        .map(|predicate| {
            format!(
                "CREATE INDEX {} IF NOT EXISTS FOR (n:{}) ON (n.{})",
                predicate.index_name(),
                predicate.label().label(),
                predicate.property()
            )
        })
        .collect()
}

/// Initialize Neo4j schema with indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> Result<usize> {
    info!("Initializing Neo4j schema...");

    let statements = schema_statements();
    for statement in &statements {
        client.execute(Query::new(statement.clone())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", statements.len());
    Ok(statements.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_cover_entry_points() {
        let statements = schema_statements();
        assert_eq!(statements.len(), 3);
        assert!(statements.contains(
            &"CREATE INDEX transaction_date IF NOT EXISTS FOR (n:Transaction) ON (n.date)".to_string()
        ));
        assert!(statements.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
