//! Query catalog: the fixed set of read-only analytic templates.
//!
//! Each template takes zero or one string parameter. Binding validates the
//! parameter; executing a bound query asks the store for the result tree and
//! serializes it once.

pub mod date;
pub mod recommend;
pub mod results;

use serde::Serialize;

use crate::error::{ShopError, ShopResult};
use crate::store::AnalyticsStore;
use date::DateFilter;

/// The analytic questions the service can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTemplate {
    AllBuyers,
    PurchaseHistory,
    SameIpBuyers,
    ProductRecommendations,
    BuyersOfTheDay,
    ProductsOfTheDay,
    TransactionsOfTheDay,
}

/// What kind of parameter a template binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateParam {
    BuyerId,
    Date,
}

impl QueryTemplate {
    pub const ALL: [QueryTemplate; 7] = [
        QueryTemplate::AllBuyers,
        QueryTemplate::PurchaseHistory,
        QueryTemplate::SameIpBuyers,
        QueryTemplate::ProductRecommendations,
        QueryTemplate::BuyersOfTheDay,
        QueryTemplate::ProductsOfTheDay,
        QueryTemplate::TransactionsOfTheDay,
    ];

    /// Stable name used in logs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            QueryTemplate::AllBuyers => "all-buyers",
            QueryTemplate::PurchaseHistory => "purchase-history",
            QueryTemplate::SameIpBuyers => "same-ip",
            QueryTemplate::ProductRecommendations => "product-recommendations",
            QueryTemplate::BuyersOfTheDay => "buyers-of-the-day",
            QueryTemplate::ProductsOfTheDay => "products-of-the-day",
            QueryTemplate::TransactionsOfTheDay => "transactions-of-the-day",
        }
    }

    /// Look a template up by its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn param(&self) -> Option<TemplateParam> {
        match self {
            QueryTemplate::AllBuyers => None,
            QueryTemplate::PurchaseHistory
            | QueryTemplate::SameIpBuyers
            | QueryTemplate::ProductRecommendations => Some(TemplateParam::BuyerId),
            QueryTemplate::BuyersOfTheDay
            | QueryTemplate::ProductsOfTheDay
            | QueryTemplate::TransactionsOfTheDay => Some(TemplateParam::Date),
        }
    }

    /// Bind the template's parameter, validating it.
    pub fn bind(self, param: Option<&str>) -> ShopResult<BoundQuery> {
        let bound = match (self.param(), param) {
            (None, None) => BoundQuery::AllBuyers,
            (None, Some(_)) => {
                return Err(ShopError::invalid(format!("{} takes no parameter", self.name())))
            }
            (Some(_), None) => {
                return Err(ShopError::invalid(format!("{} requires a parameter", self.name())))
            }
            (Some(TemplateParam::BuyerId), Some(raw)) => {
                let buyer_id = raw.trim();
                if buyer_id.is_empty() {
                    return Err(ShopError::invalid("buyer id must not be empty"));
                }
                let buyer_id = buyer_id.to_string();
                match self {
                    QueryTemplate::PurchaseHistory => BoundQuery::PurchaseHistory { buyer_id },
                    QueryTemplate::SameIpBuyers => BoundQuery::SameIpBuyers { buyer_id },
                    _ => BoundQuery::ProductRecommendations { buyer_id },
                }
            }
            (Some(TemplateParam::Date), Some(raw)) => {
                let day = DateFilter::parse(raw)?;
                match self {
                    QueryTemplate::BuyersOfTheDay => BoundQuery::BuyersOfTheDay { day },
                    QueryTemplate::ProductsOfTheDay => BoundQuery::ProductsOfTheDay { day },
                    _ => BoundQuery::TransactionsOfTheDay { day },
                }
            }
        };
        Ok(bound)
    }
}

/// A template with its parameter bound and validated.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundQuery {
    AllBuyers,
    PurchaseHistory { buyer_id: String },
    SameIpBuyers { buyer_id: String },
    ProductRecommendations { buyer_id: String },
    BuyersOfTheDay { day: DateFilter },
    ProductsOfTheDay { day: DateFilter },
    TransactionsOfTheDay { day: DateFilter },
}

impl BoundQuery {
    pub fn template(&self) -> QueryTemplate {
        match self {
            BoundQuery::AllBuyers => QueryTemplate::AllBuyers,
            BoundQuery::PurchaseHistory { .. } => QueryTemplate::PurchaseHistory,
            BoundQuery::SameIpBuyers { .. } => QueryTemplate::SameIpBuyers,
            BoundQuery::ProductRecommendations { .. } => QueryTemplate::ProductRecommendations,
            BoundQuery::BuyersOfTheDay { .. } => QueryTemplate::BuyersOfTheDay,
            BoundQuery::ProductsOfTheDay { .. } => QueryTemplate::ProductsOfTheDay,
            BoundQuery::TransactionsOfTheDay { .. } => QueryTemplate::TransactionsOfTheDay,
        }
    }

    /// Execute against the store and serialize the result tree.
    ///
    /// A failure yields no bytes at all; an empty match is a valid result.
    pub async fn execute(&self, store: &dyn AnalyticsStore) -> ShopResult<Vec<u8>> {
        match self {
            BoundQuery::AllBuyers => encode(&store.all_buyers().await?),
            BoundQuery::PurchaseHistory { buyer_id } => {
                encode(&store.purchase_history(buyer_id).await?)
            }
            BoundQuery::SameIpBuyers { buyer_id } => {
                encode(&store.same_ip_buyers(buyer_id).await?)
            }
            BoundQuery::ProductRecommendations { buyer_id } => {
                encode(&recommend::product_recommendations(store, buyer_id).await?)
            }
            BoundQuery::BuyersOfTheDay { day } => encode(&store.buyers_of_the_day(day).await?),
            BoundQuery::ProductsOfTheDay { day } => encode(&store.products_of_the_day(day).await?),
            BoundQuery::TransactionsOfTheDay { day } => {
                encode(&store.transactions_of_the_day(day).await?)
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> ShopResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for template in QueryTemplate::ALL {
            assert_eq!(QueryTemplate::from_name(template.name()), Some(template));
        }
        assert_eq!(QueryTemplate::from_name("everything"), None);
    }

    #[test]
    fn test_bind_checks_parameter_presence() {
        assert_eq!(QueryTemplate::AllBuyers.bind(None).unwrap(), BoundQuery::AllBuyers);
        assert!(QueryTemplate::AllBuyers.bind(Some("x")).is_err());
        assert!(QueryTemplate::SameIpBuyers.bind(None).is_err());
        assert!(QueryTemplate::PurchaseHistory.bind(Some("  ")).is_err());
    }

    #[test]
    fn test_bind_parses_dates() {
        let bound = QueryTemplate::ProductsOfTheDay.bind(Some("1624147200000")).unwrap();
        assert_eq!(bound, BoundQuery::ProductsOfTheDay { day: DateFilter::Exact(1_624_147_200_000) });
        assert_eq!(bound.template(), QueryTemplate::ProductsOfTheDay);
        assert!(QueryTemplate::BuyersOfTheDay.bind(Some("soon")).is_err());
    }
}
