//! Liveness of the service and its store.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.gateway.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
