//! HTTP mapping for store and input failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shopgraph_core::ShopError;

/// A failed request. Scoped to that request only; the server keeps serving.
#[derive(Debug)]
pub struct AppError(pub ShopError);

impl From<ShopError> for AppError {
    fn from(value: ShopError) -> Self {
        Self(value)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ShopError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ShopError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ShopError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ShopError::StoreQuery(_) | ShopError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError(ShopError::invalid("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError(ShopError::query("x")).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError(ShopError::unavailable("x")).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(AppError(ShopError::Timeout(30)).status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
