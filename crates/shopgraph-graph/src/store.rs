//! `AnalyticsStore` backed by Neo4j.

use async_trait::async_trait;

use shopgraph_core::catalog::results::{
    BuyerSummary, DayBuyer, DayProduct, DayTransaction, PurchaseHistory, RecommendationCandidates,
    SameIpReport,
};
use shopgraph_core::{
    AnalyticsStore, CommitReceipt, DateFilter, GraphCounts, ShopError, ShopResult, Transaction,
};

use crate::ingest::{self, UnknownReference};
use crate::queries::{buyers, day};
use crate::GraphClient;

/// Convert an adapter error into the shared taxonomy.
///
/// Unknown uids are the caller's fault; everything else is a store failure.
fn to_shop_error(err: anyhow::Error) -> ShopError {
    if let Some(reference) = err.downcast_ref::<UnknownReference>() {
        return ShopError::invalid(reference.to_string());
    }
    ShopError::query(format!("{:#}", err))
}

#[async_trait]
impl AnalyticsStore for GraphClient {
    async fn ping(&self) -> ShopResult<()> {
        GraphClient::ping(self)
            .await
            .map_err(|e| ShopError::unavailable(format!("{:#}", e)))
    }

    async fn all_buyers(&self) -> ShopResult<Vec<BuyerSummary>> {
        buyers::all_buyers(self).await.map_err(to_shop_error)
    }

    async fn purchase_history(&self, buyer_id: &str) -> ShopResult<PurchaseHistory> {
        buyers::purchase_history(self, buyer_id).await.map_err(to_shop_error)
    }

    async fn same_ip_buyers(&self, buyer_id: &str) -> ShopResult<SameIpReport> {
        buyers::same_ip_buyers(self, buyer_id).await.map_err(to_shop_error)
    }

    async fn recommendation_candidates(
        &self,
        buyer_id: &str,
        limit: usize,
    ) -> ShopResult<RecommendationCandidates> {
        buyers::recommendation_candidates(self, buyer_id, limit)
            .await
            .map_err(to_shop_error)
    }

    async fn buyers_of_the_day(&self, filter: &DateFilter) -> ShopResult<Vec<DayBuyer>> {
        day::buyers_of_the_day(self, filter).await.map_err(to_shop_error)
    }

    async fn products_of_the_day(&self, filter: &DateFilter) -> ShopResult<Vec<DayProduct>> {
        day::products_of_the_day(self, filter).await.map_err(to_shop_error)
    }

    async fn transactions_of_the_day(&self, filter: &DateFilter) -> ShopResult<Vec<DayTransaction>> {
        day::transactions_of_the_day(self, filter).await.map_err(to_shop_error)
    }

    async fn ingest(&self, transaction: &Transaction) -> ShopResult<CommitReceipt> {
        let transaction_uid = ingest::ingest_transaction(self, transaction)
            .await
            .map_err(to_shop_error)?;
        Ok(CommitReceipt { transaction_uid })
    }

    async fn counts(&self) -> ShopResult<GraphCounts> {
        self.get_counts().await.map_err(to_shop_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_is_client_error() {
        let err = to_shop_error(anyhow::Error::new(UnknownReference::Buyer("x".into())));
        assert!(err.is_client_error());

        let err = to_shop_error(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, ShopError::StoreQuery(_)));
    }
}
