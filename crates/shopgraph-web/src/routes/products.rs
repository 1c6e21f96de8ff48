//! Product route handlers.

use axum::extract::{Query, State};
use shopgraph_core::QueryTemplate;

use super::DateQuery;
use crate::error::AppError;
use crate::gateway::JsonBody;
use crate::state::AppState;

pub async fn products_of_the_day(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Result<JsonBody, AppError> {
    Ok(state
        .gateway
        .query(QueryTemplate::ProductsOfTheDay, params.date.as_deref())
        .await?)
}
