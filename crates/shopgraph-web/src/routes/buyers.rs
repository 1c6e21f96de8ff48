//! Buyer route handlers.

use axum::extract::{Path, Query, State};
use shopgraph_core::QueryTemplate;

use super::DateQuery;
use crate::error::AppError;
use crate::gateway::JsonBody;
use crate::state::AppState;

pub async fn list_buyers(State(state): State<AppState>) -> Result<JsonBody, AppError> {
    Ok(state.gateway.query(QueryTemplate::AllBuyers, None).await?)
}

pub async fn purchase_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonBody, AppError> {
    Ok(state.gateway.query(QueryTemplate::PurchaseHistory, Some(&id)).await?)
}

pub async fn same_ip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonBody, AppError> {
    Ok(state.gateway.query(QueryTemplate::SameIpBuyers, Some(&id)).await?)
}

pub async fn product_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonBody, AppError> {
    Ok(state
        .gateway
        .query(QueryTemplate::ProductRecommendations, Some(&id))
        .await?)
}

pub async fn buyers_of_the_day(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Result<JsonBody, AppError> {
    Ok(state
        .gateway
        .query(QueryTemplate::BuyersOfTheDay, params.date.as_deref())
        .await?)
}
