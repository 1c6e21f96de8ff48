//! Embedded in-process graph store.
//!
//! Answers every catalog template with the same semantics as the Neo4j
//! adapter. Used by `serve --memory` and by the HTTP tests.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::date::DateFilter;
use crate::catalog::results::{
    BuyerSummary, DayBuyer, DayProduct, DayTransaction, ProductSummary, Purchase, PurchaseHistory,
    RecommendationCandidates, RecommendationGroup, SameIpBuyer, SameIpReport, SharedIpTransaction,
};
use crate::error::{ShopError, ShopResult};
use crate::schema::Transaction;
use crate::store::{AnalyticsStore, CommitReceipt, GraphCounts};

#[derive(Debug, Clone)]
struct StoredTransaction {
    uid: String,
    ip: String,
    device: String,
    date: i64,
    /// `CUSTOMER` target.
    customer: String,
    /// `INCLUDES` targets in position order.
    includes: Vec<String>,
}

#[derive(Debug, Default)]
struct MemoryGraph {
    buyers: Vec<BuyerSummary>,
    products: Vec<ProductSummary>,
    transactions: Vec<StoredTransaction>,
}

impl MemoryGraph {
    fn buyer(&self, uid: &str) -> Option<&BuyerSummary> {
        self.buyers.iter().find(|b| b.uid == uid)
    }

    fn product(&self, uid: &str) -> Option<&ProductSummary> {
        self.products.iter().find(|p| p.uid == uid)
    }

    fn products_of(&self, txn: &StoredTransaction) -> Vec<ProductSummary> {
        txn.includes.iter().filter_map(|uid| self.product(uid)).cloned().collect()
    }

    fn transactions_of<'a>(&'a self, buyer_id: &'a str) -> impl Iterator<Item = &'a StoredTransaction> {
        self.transactions.iter().filter(move |t| t.customer == buyer_id)
    }

    fn on_day<'a>(&'a self, day: &'a DateFilter) -> impl Iterator<Item = &'a StoredTransaction> {
        self.transactions.iter().filter(move |t| day.matches(t.date))
    }
}

/// In-memory, append-only retail graph.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<MemoryGraph>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ShopResult<RwLockReadGuard<'_, MemoryGraph>> {
        self.graph
            .read()
            .map_err(|_| ShopError::unavailable("in-memory graph lock poisoned"))
    }

    fn write(&self) -> ShopResult<RwLockWriteGuard<'_, MemoryGraph>> {
        self.graph
            .write()
            .map_err(|_| ShopError::unavailable("in-memory graph lock poisoned"))
    }
}

fn new_uid() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn ping(&self) -> ShopResult<()> {
        self.read().map(|_| ())
    }

    async fn all_buyers(&self) -> ShopResult<Vec<BuyerSummary>> {
        Ok(self.read()?.buyers.clone())
    }

    async fn purchase_history(&self, buyer_id: &str) -> ShopResult<PurchaseHistory> {
        let graph = self.read()?;
        let Some(buyer) = graph.buyer(buyer_id) else {
            return Ok(PurchaseHistory::default());
        };

        let purchases = graph
            .transactions_of(buyer_id)
            .map(|t| Purchase {
                uid: t.uid.clone(),
                ip: t.ip.clone(),
                device: t.device.clone(),
                products: graph.products_of(t),
                date: t.date,
            })
            .collect();

        Ok(PurchaseHistory {
            name: Some(buyer.name.clone()),
            age: Some(buyer.age),
            purchases,
        })
    }

    async fn same_ip_buyers(&self, buyer_id: &str) -> ShopResult<SameIpReport> {
        let graph = self.read()?;

        // First pass: the ips this buyer has used.
        let mut ips: Vec<String> = Vec::new();
        for t in graph.transactions_of(buyer_id) {
            if !t.ip.is_empty() && !ips.contains(&t.ip) {
                ips.push(t.ip.clone());
            }
        }

        // Second pass: everyone else seen on those ips.
        let mut buyers: Vec<SameIpBuyer> = Vec::new();
        for t in graph.transactions.iter().filter(|t| ips.contains(&t.ip)) {
            if t.customer == buyer_id {
                continue;
            }
            let Some(other) = graph.buyer(&t.customer) else {
                continue;
            };
            let shared = SharedIpTransaction {
                uid: t.uid.clone(),
                ip: t.ip.clone(),
                device: t.device.clone(),
                date: t.date,
            };
            match buyers.iter_mut().find(|b| b.uid == other.uid) {
                Some(existing) => existing.transactions.push(shared),
                None => buyers.push(SameIpBuyer {
                    uid: other.uid.clone(),
                    name: other.name.clone(),
                    age: other.age,
                    transactions: vec![shared],
                }),
            }
        }

        Ok(SameIpReport { ips, buyers })
    }

    async fn recommendation_candidates(
        &self,
        buyer_id: &str,
        limit: usize,
    ) -> ShopResult<RecommendationCandidates> {
        let graph = self.read()?;

        let mut owned: Vec<String> = Vec::new();
        for t in graph.transactions_of(buyer_id) {
            for uid in &t.includes {
                if !owned.contains(uid) {
                    owned.push(uid.clone());
                }
            }
        }

        let candidates = graph
            .transactions
            .iter()
            .filter(|t| !t.ip.is_empty())
            .take(limit)
            .map(|t| RecommendationGroup {
                uid: t.uid.clone(),
                ip: t.ip.clone(),
                device: t.device.clone(),
                products: graph.products_of(t),
            })
            .collect();

        Ok(RecommendationCandidates { owned, candidates })
    }

    async fn buyers_of_the_day(&self, day: &DateFilter) -> ShopResult<Vec<DayBuyer>> {
        let graph = self.read()?;
        let mut seen = HashSet::new();
        let buyers = graph
            .on_day(day)
            .filter(|t| seen.insert(t.customer.as_str()))
            .filter_map(|t| graph.buyer(&t.customer))
            .map(|b| DayBuyer { name: b.name.clone(), age: b.age })
            .collect();
        Ok(buyers)
    }

    async fn products_of_the_day(&self, day: &DateFilter) -> ShopResult<Vec<DayProduct>> {
        let graph = self.read()?;
        let mut seen = HashSet::new();
        let products = graph
            .on_day(day)
            .flat_map(|t| t.includes.iter())
            .filter(|uid| seen.insert(uid.as_str()))
            .filter_map(|uid| graph.product(uid))
            .map(|p| DayProduct { name: p.name.clone(), price: p.price })
            .collect();
        Ok(products)
    }

    async fn transactions_of_the_day(&self, day: &DateFilter) -> ShopResult<Vec<DayTransaction>> {
        let graph = self.read()?;
        let transactions = graph
            .on_day(day)
            .filter_map(|t| {
                graph.buyer(&t.customer).map(|buyer| DayTransaction {
                    uid: t.uid.clone(),
                    buyer: buyer.clone(),
                    ip: t.ip.clone(),
                    device: t.device.clone(),
                    products: graph.products_of(t),
                    date: t.date,
                })
            })
            .collect();
        Ok(transactions)
    }

    async fn ingest(&self, transaction: &Transaction) -> ShopResult<CommitReceipt> {
        let date = transaction
            .date
            .ok_or_else(|| ShopError::invalid("transaction date must be stamped before ingestion"))?;

        let mut graph = self.write()?;

        // Resolve every reference before touching the graph so a bad uid
        // leaves nothing behind.
        if let Some(uid) = &transaction.buyer.uid {
            if graph.buyer(uid).is_none() {
                return Err(ShopError::invalid(format!("unknown buyer uid '{}'", uid)));
            }
        }
        for product in &transaction.products {
            if let Some(uid) = &product.uid {
                if graph.product(uid).is_none() {
                    return Err(ShopError::invalid(format!("unknown product uid '{}'", uid)));
                }
            }
        }

        let customer = match &transaction.buyer.uid {
            Some(uid) => uid.clone(),
            None => {
                let uid = new_uid();
                graph.buyers.push(BuyerSummary {
                    uid: uid.clone(),
                    name: transaction.buyer.name.clone(),
                    age: transaction.buyer.age,
                });
                uid
            }
        };

        let mut includes = Vec::with_capacity(transaction.products.len());
        for product in &transaction.products {
            let uid = match &product.uid {
                Some(uid) => uid.clone(),
                None => {
                    let uid = new_uid();
                    graph.products.push(ProductSummary {
                        uid: uid.clone(),
                        name: product.name.clone(),
                        price: product.price,
                    });
                    uid
                }
            };
            includes.push(uid);
        }

        let uid = new_uid();
        graph.transactions.push(StoredTransaction {
            uid: uid.clone(),
            ip: transaction.ip.clone(),
            device: transaction.device.clone(),
            date,
            customer,
            includes,
        });

        Ok(CommitReceipt { transaction_uid: uid })
    }

    async fn counts(&self) -> ShopResult<GraphCounts> {
        let graph = self.read()?;
        let nodes = graph.buyers.len() + graph.products.len() + graph.transactions.len();
        let relationships = graph.transactions.iter().map(|t| 1 + t.includes.len()).sum();
        Ok(GraphCounts { nodes, relationships })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Buyer, Product};

    fn txn(buyer: Buyer, ip: &str, products: Vec<Product>, date: i64) -> Transaction {
        Transaction {
            uid: None,
            buyer,
            ip: ip.to_string(),
            device: "web".to_string(),
            products,
            date: Some(date),
        }
    }

    fn new_buyer(name: &str) -> Buyer {
        Buyer { uid: None, name: name.to_string(), age: 30 }
    }

    fn new_product(name: &str) -> Product {
        Product { uid: None, name: name.to_string(), price: 100.0 }
    }

    #[tokio::test]
    async fn test_ingest_creates_nodes_and_edges() {
        let store = MemoryStore::new();
        store
            .ingest(&txn(new_buyer("A"), "1.2.3.4", vec![new_product("X"), new_product("Y")], 10))
            .await
            .unwrap();

        let counts = store.counts().await.unwrap();
        assert_eq!(counts, GraphCounts { nodes: 4, relationships: 3 });
    }

    #[tokio::test]
    async fn test_unknown_reference_writes_nothing() {
        let store = MemoryStore::new();
        let mut product = new_product("X");
        product.uid = Some("missing".to_string());

        let err = store.ingest(&txn(new_buyer("A"), "1.2.3.4", vec![product], 10)).await;
        assert!(err.unwrap_err().is_client_error());
        assert_eq!(store.counts().await.unwrap(), GraphCounts::default());
    }

    #[tokio::test]
    async fn test_existing_buyer_is_referenced_not_duplicated() {
        let store = MemoryStore::new();
        store.ingest(&txn(new_buyer("A"), "1.1.1.1", vec![], 10)).await.unwrap();
        let uid = store.all_buyers().await.unwrap()[0].uid.clone();

        let existing = Buyer { uid: Some(uid.clone()), ..Buyer::default() };
        store.ingest(&txn(existing, "2.2.2.2", vec![], 20)).await.unwrap();

        assert_eq!(store.all_buyers().await.unwrap().len(), 1);
        assert_eq!(store.purchase_history(&uid).await.unwrap().purchases.len(), 2);
    }

    #[tokio::test]
    async fn test_day_queries_deduplicate() {
        let store = MemoryStore::new();
        store.ingest(&txn(new_buyer("A"), "1.1.1.1", vec![new_product("X")], 10)).await.unwrap();
        let buyer = store.all_buyers().await.unwrap()[0].uid.clone();
        let product = store.transactions_of_the_day(&DateFilter::Exact(10)).await.unwrap()[0]
            .products[0]
            .uid
            .clone();

        let again = txn(
            Buyer { uid: Some(buyer), ..Buyer::default() },
            "1.1.1.1",
            vec![Product { uid: Some(product), ..Product::default() }],
            10,
        );
        store.ingest(&again).await.unwrap();

        let day = DateFilter::Exact(10);
        assert_eq!(store.transactions_of_the_day(&day).await.unwrap().len(), 2);
        assert_eq!(store.buyers_of_the_day(&day).await.unwrap().len(), 1);
        assert_eq!(store.products_of_the_day(&day).await.unwrap().len(), 1);
        assert!(store.buyers_of_the_day(&DateFilter::Exact(11)).await.unwrap().is_empty());
    }
}
