//! Graph schema: node labels, edge types and the entities stored under them.
//!
//! ```cypher
//! (:Transaction {ip, device, date})-[:CUSTOMER]->(:Buyer {name, age})
//! (:Transaction)-[:INCLUDES {position}]->(:Product {name, price})
//! ```
//!
//! Buyers and products are referenced by transactions, never owned by them.
//! Identifiers (`uid`) are assigned by the store and never derived here.

use serde::{Deserialize, Serialize};

/// Node kinds in the retail graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLabel {
    Buyer,
    Product,
    Transaction,
}

impl NodeLabel {
    /// The store label for this node kind.
    pub fn label(&self) -> &'static str {
        match self {
            NodeLabel::Buyer => "Buyer",
            NodeLabel::Product => "Product",
            NodeLabel::Transaction => "Transaction",
        }
    }
}

/// Directed edge kinds. Both start at a `Transaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    /// Transaction -> Buyer, exactly one per transaction.
    Customer,
    /// Transaction -> Product, zero or more per transaction.
    Includes,
}

impl EdgeType {
    /// The store relationship type.
    pub fn rel_type(&self) -> &'static str {
        match self {
            EdgeType::Customer => "CUSTOMER",
            EdgeType::Includes => "INCLUDES",
        }
    }

    pub fn from_label(&self) -> NodeLabel {
        NodeLabel::Transaction
    }

    pub fn to_label(&self) -> NodeLabel {
        match self {
            EdgeType::Customer => NodeLabel::Buyer,
            EdgeType::Includes => NodeLabel::Product,
        }
    }
}

/// Attribute-indexed predicates used as query entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedPredicate {
    /// Existence index: every buyer carries an age.
    BuyerAge,
    /// Equality/range index on the stamped epoch-millisecond date.
    TransactionDate,
    /// Equality index backing the same-ip self join.
    TransactionIp,
}

impl IndexedPredicate {
    pub const ALL: [IndexedPredicate; 3] = [
        IndexedPredicate::BuyerAge,
        IndexedPredicate::TransactionDate,
        IndexedPredicate::TransactionIp,
    ];

    pub fn label(&self) -> NodeLabel {
        match self {
            IndexedPredicate::BuyerAge => NodeLabel::Buyer,
            IndexedPredicate::TransactionDate | IndexedPredicate::TransactionIp => {
                NodeLabel::Transaction
            }
        }
    }

    pub fn property(&self) -> &'static str {
        match self {
            IndexedPredicate::BuyerAge => "age",
            IndexedPredicate::TransactionDate => "date",
            IndexedPredicate::TransactionIp => "ip",
        }
    }

    /// Name of the backing index in the store.
    pub fn index_name(&self) -> &'static str {
        match self {
            IndexedPredicate::BuyerAge => "buyer_age",
            IndexedPredicate::TransactionDate => "transaction_date",
            IndexedPredicate::TransactionIp => "transaction_ip",
        }
    }
}

/// A buyer, either a new one (name and age) or a reference to a stored node (uid).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: u32,
}

/// A product. `price` is in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// A purchase event as accepted by ingestion and echoed back after commit.
///
/// `date` is epoch milliseconds and is always set by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub buyer: Buyer,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_start_at_transaction() {
        for edge in [EdgeType::Customer, EdgeType::Includes] {
            assert_eq!(edge.from_label(), NodeLabel::Transaction);
        }
        assert_eq!(EdgeType::Customer.to_label().label(), "Buyer");
        assert_eq!(EdgeType::Includes.rel_type(), "INCLUDES");
    }

    #[test]
    fn test_transaction_omits_unset_fields() {
        let txn = Transaction {
            uid: None,
            buyer: Buyer { uid: None, name: "A".into(), age: 30 },
            ip: "1.2.3.4".into(),
            device: "web".into(),
            products: vec![],
            date: None,
        };
        let json = serde_json::to_value(&txn).unwrap();
        assert!(json.get("uid").is_none());
        assert!(json.get("date").is_none());
        assert!(json["buyer"].get("uid").is_none());
        assert_eq!(json["buyer"]["age"], 30);
    }

    #[test]
    fn test_negative_age_is_rejected() {
        let raw = r#"{"buyer":{"name":"A","age":-1},"ip":"x","device":"y","products":[]}"#;
        assert!(serde_json::from_str::<Transaction>(raw).is_err());
    }
}
