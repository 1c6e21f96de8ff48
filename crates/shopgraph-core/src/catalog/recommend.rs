//! Product recommendations.
//!
//! The store only collects the buyer's owned products and a bounded scan of
//! candidate transactions. Filtering owned products out and pruning the
//! groups left empty happens here, after the traversal.

use std::collections::HashSet;

use tracing::debug;

use super::results::{RecommendationCandidates, RecommendationGroup};
use crate::error::ShopResult;
use crate::store::AnalyticsStore;

/// Upper bound on scanned transactions and returned groups.
pub const MAX_RECOMMENDATION_GROUPS: usize = 5;

/// Drop owned products from every candidate and prune empty groups.
pub fn prune_recommendations(candidates: RecommendationCandidates) -> Vec<RecommendationGroup> {
    let owned: HashSet<&str> = candidates.owned.iter().map(String::as_str).collect();

    let mut groups = Vec::with_capacity(candidates.candidates.len());
    for mut group in candidates.candidates.into_iter().take(MAX_RECOMMENDATION_GROUPS) {
        group.products.retain(|p| !owned.contains(p.uid.as_str()));
        if group.products.is_empty() {
            debug!(transaction = %group.uid, "Pruned recommendation group with no new products");
            continue;
        }
        groups.push(group);
    }

    groups
}

/// Run the recommendation template for a buyer.
pub async fn product_recommendations(
    store: &dyn AnalyticsStore,
    buyer_id: &str,
) -> ShopResult<Vec<RecommendationGroup>> {
    let candidates = store
        .recommendation_candidates(buyer_id, MAX_RECOMMENDATION_GROUPS)
        .await?;
    Ok(prune_recommendations(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::results::ProductSummary;

    fn product(uid: &str) -> ProductSummary {
        ProductSummary { uid: uid.to_string(), name: format!("product {}", uid), price: 100.0 }
    }

    fn group(uid: &str, products: &[&str]) -> RecommendationGroup {
        RecommendationGroup {
            uid: uid.to_string(),
            ip: "10.0.0.1".to_string(),
            device: "ios".to_string(),
            products: products.iter().map(|p| product(p)).collect(),
        }
    }

    #[test]
    fn test_owned_products_are_removed() {
        let groups = prune_recommendations(RecommendationCandidates {
            owned: vec!["p1".into()],
            candidates: vec![group("t1", &["p1", "p2"])],
        });
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].products, vec![product("p2")]);
    }

    #[test]
    fn test_empty_groups_are_pruned() {
        let groups = prune_recommendations(RecommendationCandidates {
            owned: vec!["p1".into(), "p2".into()],
            candidates: vec![group("t1", &["p1"]), group("t2", &[]), group("t3", &["p2", "p3"])],
        });
        let uids: Vec<_> = groups.iter().map(|g| g.uid.as_str()).collect();
        assert_eq!(uids, vec!["t3"]);
    }

    #[test]
    fn test_never_more_than_five_groups() {
        let candidates = (0..9).map(|i| group(&format!("t{}", i), &["px"])).collect();
        let groups = prune_recommendations(RecommendationCandidates { owned: vec![], candidates });
        assert_eq!(groups.len(), MAX_RECOMMENDATION_GROUPS);
    }
}
