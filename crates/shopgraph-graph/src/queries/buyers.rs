//! Buyer-centred traversals: listing, purchase history, same-ip self join
//! and recommendation candidates.

use anyhow::Result;
use neo4rs::Query;
use serde::Deserialize;

use shopgraph_core::catalog::results::{
    BuyerSummary, Purchase, PurchaseHistory, RecommendationCandidates, RecommendationGroup,
    SameIpReport,
};

use crate::GraphClient;

/// Every node with an `age`, i.e. every buyer.
pub async fn all_buyers(client: &GraphClient) -> Result<Vec<BuyerSummary>> {
    let query = Query::new(
        "MATCH (b:Buyer)
         WHERE b.age IS NOT NULL
         RETURN elementId(b) AS uid, b.name AS name, b.age AS age
         ORDER BY name, uid"
            .to_string(),
    );

    client.query_as(query).await
}

#[derive(Deserialize)]
struct HistoryRow {
    name: String,
    age: u32,
    purchases: Vec<Purchase>,
}

/// Transactions whose `CUSTOMER` edge targets the buyer, newest last.
pub async fn purchase_history(client: &GraphClient, buyer_id: &str) -> Result<PurchaseHistory> {
    let query = Query::new(
        "MATCH (b:Buyer) WHERE elementId(b) = $buyer_id
         OPTIONAL MATCH (b)<-[:CUSTOMER]-(t:Transaction)
         OPTIONAL MATCH (t)-[i:INCLUDES]->(p:Product)
         WITH b, t, i, p ORDER BY i.position
         WITH b, t, collect(p {uid: elementId(p), .name, .price}) AS products
         ORDER BY t.date
         RETURN b.name AS name, b.age AS age,
                collect(CASE WHEN t IS NULL THEN NULL
                        ELSE {uid: elementId(t), ip: t.ip, device: t.device,
                              products: products, date: t.date} END) AS purchases"
            .to_string(),
    )
    .param("buyer_id", buyer_id);

    let rows: Vec<HistoryRow> = client.query_as(query).await?;
    Ok(rows
        .into_iter()
        .next()
        .map(|row| PurchaseHistory {
            name: Some(row.name),
            age: Some(row.age),
            purchases: row.purchases,
        })
        .unwrap_or_default())
}

/// Two passes: bind the buyer's ips, then join every other buyer seen on
/// them, keeping only the transactions on those ips.
pub async fn same_ip_buyers(client: &GraphClient, buyer_id: &str) -> Result<SameIpReport> {
    let query = Query::new(
        "MATCH (target:Buyer) WHERE elementId(target) = $buyer_id
         OPTIONAL MATCH (target)<-[:CUSTOMER]-(own:Transaction)
         WHERE own.ip IS NOT NULL AND own.ip <> ''
         WITH collect(DISTINCT own.ip) AS ips
         OPTIONAL MATCH (t:Transaction)-[:CUSTOMER]->(other:Buyer)
         WHERE t.ip IN ips AND elementId(other) <> $buyer_id
         WITH ips, other, t ORDER BY t.date
         WITH ips, other, collect(t {uid: elementId(t), .ip, .device, .date}) AS transactions
         RETURN ips,
                collect(CASE WHEN other IS NULL THEN NULL
                        ELSE other {uid: elementId(other), .name, .age,
                                    transactions: transactions} END) AS buyers"
            .to_string(),
    )
    .param("buyer_id", buyer_id);

    let rows: Vec<SameIpReport> = client.query_as(query).await?;
    let mut report = rows.into_iter().next().unwrap_or_default();
    // The query already excludes the target; keep the guarantee local too.
    report.buyers.retain(|b| b.uid != buyer_id);
    Ok(report)
}

/// Product identifiers the buyer owns plus the first `limit` transactions
/// carrying an ip, with all of their products. Pruning happens in core.
pub async fn recommendation_candidates(
    client: &GraphClient,
    buyer_id: &str,
    limit: usize,
) -> Result<RecommendationCandidates> {
    let owned_query = Query::new(
        "MATCH (b:Buyer) WHERE elementId(b) = $buyer_id
         OPTIONAL MATCH (b)<-[:CUSTOMER]-(:Transaction)-[:INCLUDES]->(owned:Product)
         RETURN collect(DISTINCT elementId(owned)) AS owned"
            .to_string(),
    )
    .param("buyer_id", buyer_id);

    let owned: Vec<String> = client
        .query_scalar(owned_query, "owned")
        .await?
        .unwrap_or_default();

    let candidate_query = Query::new(
        "MATCH (t:Transaction)
         WHERE t.ip IS NOT NULL AND t.ip <> ''
         WITH t ORDER BY t.date LIMIT $limit
         OPTIONAL MATCH (t)-[i:INCLUDES]->(p:Product)
         WITH t, i, p ORDER BY i.position
         RETURN elementId(t) AS uid, t.ip AS ip, t.device AS device,
                collect(p {uid: elementId(p), .name, .price}) AS products"
            .to_string(),
    )
    .param("limit", limit as i64);

    let candidates: Vec<RecommendationGroup> = client.query_as(candidate_query).await?;

    Ok(RecommendationCandidates { owned, candidates })
}
