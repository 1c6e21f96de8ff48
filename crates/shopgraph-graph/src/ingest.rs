//! Atomic transaction ingestion.
//!
//! Creates, inside one explicit Neo4j transaction:
//! - the (:Buyer) node, unless the payload references an existing one
//! - the (:Transaction)-[:CUSTOMER]->(:Buyer) edge
//! - every (:Product) node not referenced by uid
//! - the (:Transaction)-[:INCLUDES {position}]->(:Product) edges
//!
//! Any failure rolls the whole write back.

use anyhow::{bail, Context, Result};
use neo4rs::{Query, Txn};
use thiserror::Error;
use tracing::{debug, warn};

use shopgraph_core::{Buyer, Product, Transaction};

use crate::GraphClient;

const MATCH_BUYER: &str = "MATCH (b:Buyer) WHERE elementId(b) = $uid RETURN elementId(b) AS uid";
const CREATE_BUYER: &str = "CREATE (b:Buyer {name: $name, age: $age}) RETURN elementId(b) AS uid";

const CREATE_TRANSACTION: &str = "MATCH (b:Buyer) WHERE elementId(b) = $buyer_uid
     CREATE (t:Transaction {ip: $ip, device: $device, date: $date})-[:CUSTOMER]->(b)
     RETURN elementId(t) AS uid";

const LINK_PRODUCT: &str = "MATCH (t:Transaction) WHERE elementId(t) = $txn_uid
     MATCH (p:Product) WHERE elementId(p) = $uid
     CREATE (t)-[:INCLUDES {position: $position}]->(p)
     RETURN elementId(p) AS uid";
const CREATE_PRODUCT: &str = "MATCH (t:Transaction) WHERE elementId(t) = $txn_uid
     CREATE (t)-[:INCLUDES {position: $position}]->(p:Product {name: $name, price: $price})
     RETURN elementId(p) AS uid";

/// Query resolving or creating the buyer node.
pub(crate) fn buyer_query(buyer: &Buyer) -> Query {
    match &buyer.uid {
        Some(uid) => Query::new(MATCH_BUYER.to_string()).param("uid", uid.as_str()),
        None => Query::new(CREATE_BUYER.to_string())
            .param("name", buyer.name.as_str())
            .param("age", i64::from(buyer.age)),
    }
}

/// Query linking (and possibly creating) the product at `position`.
pub(crate) fn product_query(txn_uid: &str, position: usize, product: &Product) -> Query {
    let query = match &product.uid {
        Some(uid) => Query::new(LINK_PRODUCT.to_string()).param("uid", uid.as_str()),
        None => Query::new(CREATE_PRODUCT.to_string())
            .param("name", product.name.as_str())
            .param("price", product.price),
    };
    query.param("txn_uid", txn_uid).param("position", position as i64)
}

/// Run a statement inside the transaction and read back the `uid` column.
async fn returning_uid(txn: &mut Txn, query: Query) -> Result<Option<String>> {
    let mut stream = txn.execute(query).await.context("Neo4j statement failed")?;
    let row = stream
        .next(txn.handle())
        .await
        .context("Failed to read Neo4j statement result")?;

    row.map(|row| {
        row.get::<String>("uid")
            .map_err(|e| anyhow::anyhow!("Failed to get field 'uid': {:?}", e))
    })
    .transpose()
}

async fn write_transaction(txn: &mut Txn, transaction: &Transaction) -> Result<String> {
    let date = transaction
        .date
        .context("transaction date must be stamped before ingestion")?;

    let Some(buyer_uid) = returning_uid(txn, buyer_query(&transaction.buyer)).await? else {
        bail!(UnknownReference::Buyer(transaction.buyer.uid.clone().unwrap_or_default()));
    };

    let create = Query::new(CREATE_TRANSACTION.to_string())
        .param("buyer_uid", buyer_uid.as_str())
        .param("ip", transaction.ip.as_str())
        .param("device", transaction.device.as_str())
        .param("date", date);
    let txn_uid = returning_uid(txn, create)
        .await?
        .context("Transaction node was not created")?;

    for (position, product) in transaction.products.iter().enumerate() {
        if returning_uid(txn, product_query(&txn_uid, position, product)).await?.is_none() {
            bail!(UnknownReference::Product(product.uid.clone().unwrap_or_default()));
        }
    }

    debug!(transaction_uid = %txn_uid, buyer_uid = %buyer_uid, "Transaction written");
    Ok(txn_uid)
}

/// A payload uid that matches no node. Caused by the caller, not the store.
#[derive(Debug, Error)]
pub enum UnknownReference {
    #[error("unknown buyer uid '{0}'")]
    Buyer(String),

    #[error("unknown product uid '{0}'")]
    Product(String),
}

/// Write a stamped transaction atomically and return its store uid.
pub async fn ingest_transaction(client: &GraphClient, transaction: &Transaction) -> Result<String> {
    let mut txn = client
        .inner()
        .start_txn()
        .await
        .context("Failed to start transaction")?;

    match write_transaction(&mut txn, transaction).await {
        Ok(uid) => {
            txn.commit().await.context("Failed to commit transaction")?;
            Ok(uid)
        }
        Err(e) => {
            warn!("Error during ingestion, rolling back: {}", e);
            txn.rollback().await.context("Failed to rollback transaction")?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopgraph_core::{EdgeType, NodeLabel};

    #[test]
    fn test_unknown_reference_message() {
        let err = anyhow::Error::new(UnknownReference::Product("4:abc:7".into()));
        assert_eq!(err.to_string(), "unknown product uid '4:abc:7'");
        assert!(err.downcast_ref::<UnknownReference>().is_some());
    }

    #[test]
    fn test_statements_keep_edges_directed_from_transaction() {
        let customer = format!("-[:{}]->(b)", EdgeType::Customer.rel_type());
        let includes = format!("(t)-[:{} {{position: $position}}]->(p", EdgeType::Includes.rel_type());

        assert!(CREATE_TRANSACTION.contains(&customer));
        assert!(LINK_PRODUCT.contains(&includes));
        assert!(CREATE_PRODUCT.contains(&includes));
        assert!(CREATE_PRODUCT.contains(&format!("(p:{}", NodeLabel::Product.label())));
    }
}
