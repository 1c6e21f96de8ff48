//! Transaction route handlers.

use axum::body::Bytes;
use axum::extract::{Query, State};
use shopgraph_core::QueryTemplate;

use super::DateQuery;
use crate::error::AppError;
use crate::gateway::JsonBody;
use crate::state::AppState;

pub async fn transactions_of_the_day(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Result<JsonBody, AppError> {
    Ok(state
        .gateway
        .query(QueryTemplate::TransactionsOfTheDay, params.date.as_deref())
        .await?)
}

/// The body is taken raw so malformed JSON surfaces as a client input error
/// from ingestion rather than an extractor rejection.
pub async fn create_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<JsonBody, AppError> {
    Ok(state.gateway.ingest(&body).await?)
}
