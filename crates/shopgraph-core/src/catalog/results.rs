//! Result trees returned by the catalog templates.
//!
//! These are the exact shapes written to callers; the gateway serializes
//! them once and never reshapes them.

use serde::{Deserialize, Serialize};

/// A buyer as listed by `AllBuyers` and nested in transaction trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerSummary {
    pub uid: String,
    pub name: String,
    pub age: u32,
}

/// A product nested in purchase and transaction trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub uid: String,
    pub name: String,
    pub price: f64,
}

/// One transaction in a buyer's purchase history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub uid: String,
    pub ip: String,
    pub device: String,
    pub products: Vec<ProductSummary>,
    pub date: i64,
}

/// Purchase history of a single buyer.
///
/// For an unknown buyer this is the empty tree: no name, no age, no purchases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PurchaseHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub purchases: Vec<Purchase>,
}

/// A transaction re-attached to a buyer because its ip is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedIpTransaction {
    pub uid: String,
    pub ip: String,
    pub device: String,
    pub date: i64,
}

/// Another buyer that used one of the target buyer's ips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SameIpBuyer {
    pub uid: String,
    pub name: String,
    pub age: u32,
    pub transactions: Vec<SharedIpTransaction>,
}

/// Result of the same-ip self join.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SameIpReport {
    /// Ips collected from the target buyer's own transactions.
    pub ips: Vec<String>,
    pub buyers: Vec<SameIpBuyer>,
}

/// A candidate transaction and the products in it the buyer does not own yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationGroup {
    pub uid: String,
    pub ip: String,
    pub device: String,
    pub products: Vec<ProductSummary>,
}

/// Raw material for recommendations, before the prune pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationCandidates {
    /// Product identifiers the buyer has purchased at least once.
    pub owned: Vec<String>,
    /// Scanned transactions with all of their products.
    pub candidates: Vec<RecommendationGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBuyer {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayProduct {
    pub name: String,
    pub price: f64,
}

/// A full transaction tree as listed by `TransactionsOfTheDay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTransaction {
    pub uid: String,
    pub buyer: BuyerSummary,
    pub ip: String,
    pub device: String,
    pub products: Vec<ProductSummary>,
    pub date: i64,
}
