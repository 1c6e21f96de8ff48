//! Daily aggregates selected through the `Transaction.date` index.

use anyhow::Result;
use neo4rs::Query;

use shopgraph_core::catalog::results::{DayBuyer, DayProduct, DayTransaction};
use shopgraph_core::DateFilter;

use crate::GraphClient;

/// Bind the half-open `[from, to)` bounds of a day filter.
fn with_day(cypher: &str, day: &DateFilter) -> Query {
    let (from, to) = day.bounds();
    Query::new(cypher.to_string()).param("from", from).param("to", to)
}

/// Buyers with a transaction on the day, each listed once.
pub async fn buyers_of_the_day(client: &GraphClient, day: &DateFilter) -> Result<Vec<DayBuyer>> {
    let query = with_day(
        "MATCH (t:Transaction)-[:CUSTOMER]->(b:Buyer)
         WHERE t.date >= $from AND t.date < $to
         WITH DISTINCT b
         RETURN b.name AS name, b.age AS age",
        day,
    );

    client.query_as(query).await
}

/// Products included in a transaction on the day, each listed once.
pub async fn products_of_the_day(client: &GraphClient, day: &DateFilter) -> Result<Vec<DayProduct>> {
    let query = with_day(
        "MATCH (t:Transaction)-[:INCLUDES]->(p:Product)
         WHERE t.date >= $from AND t.date < $to
         WITH DISTINCT p
         RETURN p.name AS name, p.price AS price",
        day,
    );

    client.query_as(query).await
}

/// Full transaction trees for the day.
pub async fn transactions_of_the_day(
    client: &GraphClient,
    day: &DateFilter,
) -> Result<Vec<DayTransaction>> {
    let query = with_day(
        "MATCH (t:Transaction)-[:CUSTOMER]->(b:Buyer)
         WHERE t.date >= $from AND t.date < $to
         OPTIONAL MATCH (t)-[i:INCLUDES]->(p:Product)
         WITH t, b, i, p ORDER BY i.position
         WITH t, b, collect(p {uid: elementId(p), .name, .price}) AS products
         ORDER BY t.date
         RETURN elementId(t) AS uid,
                b {uid: elementId(b), .name, .age} AS buyer,
                t.ip AS ip, t.device AS device, products, t.date AS date",
        day,
    );

    client.query_as(query).await
}
