//! The seam between the catalog/ingestion rules and a concrete graph store.

use async_trait::async_trait;
use serde::Serialize;

use crate::catalog::date::DateFilter;
use crate::catalog::results::{
    BuyerSummary, DayBuyer, DayProduct, DayTransaction, PurchaseHistory, RecommendationCandidates,
    SameIpReport,
};
use crate::error::ShopResult;
use crate::schema::Transaction;

/// Node and relationship counts for status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Outcome of a committed ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Store-assigned identifier of the new Transaction node.
    pub transaction_uid: String,
}

/// A graph store able to answer every catalog template and apply ingestions.
///
/// Reads may be served from a stale view. `ingest` must either persist the
/// whole transaction with its edges or nothing at all.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Cheap round trip proving the store answers.
    async fn ping(&self) -> ShopResult<()>;

    async fn all_buyers(&self) -> ShopResult<Vec<BuyerSummary>>;

    async fn purchase_history(&self, buyer_id: &str) -> ShopResult<PurchaseHistory>;

    async fn same_ip_buyers(&self, buyer_id: &str) -> ShopResult<SameIpReport>;

    /// Owned products plus up to `limit` transactions that carry an ip.
    async fn recommendation_candidates(
        &self,
        buyer_id: &str,
        limit: usize,
    ) -> ShopResult<RecommendationCandidates>;

    async fn buyers_of_the_day(&self, day: &DateFilter) -> ShopResult<Vec<DayBuyer>>;

    async fn products_of_the_day(&self, day: &DateFilter) -> ShopResult<Vec<DayProduct>>;

    async fn transactions_of_the_day(&self, day: &DateFilter) -> ShopResult<Vec<DayTransaction>>;

    /// Atomically write a validated, date-stamped transaction.
    async fn ingest(&self, transaction: &Transaction) -> ShopResult<CommitReceipt>;

    async fn counts(&self) -> ShopResult<GraphCounts>;
}
