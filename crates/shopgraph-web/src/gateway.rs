//! Query execution gateway.
//!
//! Every request opens one [`Session`]: a concurrency permit plus the store
//! handle, bounded by the configured timeout. The session is released when
//! it drops, on every exit path. Result bytes are written through as the
//! store produced them.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header;
use axum::response::{IntoResponse, Response};
use shopgraph_core::{AnalyticsStore, Ingestion, QueryTemplate, ShopError, ShopResult, now_millis};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Serialized JSON written to the caller unchanged.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Vec<u8>);

impl IntoResponse for JsonBody {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "application/json")], self.0).into_response()
    }
}

/// Opens request-scoped sessions against the store.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn AnalyticsStore>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl Gateway {
    pub fn new(store: Arc<dyn AnalyticsStore>, max_in_flight: usize, timeout: Duration) -> Self {
        Self {
            store,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn AnalyticsStore> {
        &self.store
    }

    /// Wait for a free slot and open a session.
    pub async fn open(&self) -> ShopResult<Session> {
        let permit = tokio::time::timeout(self.timeout, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| ShopError::Timeout(self.timeout.as_secs()))?
            .map_err(|_| ShopError::unavailable("gateway is shutting down"))?;

        Ok(Session {
            store: self.store.clone(),
            timeout: self.timeout,
            opened: Instant::now(),
            _permit: permit,
        })
    }

    /// Bind and run one catalog template in its own session.
    pub async fn query(&self, template: QueryTemplate, param: Option<&str>) -> ShopResult<JsonBody> {
        let bound = template.bind(param)?;
        let session = self.open().await?;
        let bytes = session
            .run(template.name(), bound.execute(session.store()))
            .await?;
        Ok(JsonBody(bytes))
    }

    /// Validate a raw body, write it in its own session and echo it back.
    pub async fn ingest(&self, body: &[u8]) -> ShopResult<JsonBody> {
        let mut ingestion = Ingestion::new();
        let submission = ingestion.validate(body, now_millis())?;

        let session = self.open().await?;
        session
            .run("ingest", ingestion.commit(session.store(), &submission))
            .await?;
        Ok(JsonBody(serde_json::to_vec(&submission.echo)?))
    }

    /// Round trip to the store.
    pub async fn ping(&self) -> ShopResult<()> {
        let session = self.open().await?;
        session.run("ping", session.store().ping()).await
    }
}

/// One request's hold on the store.
pub struct Session {
    store: Arc<dyn AnalyticsStore>,
    timeout: Duration,
    opened: Instant,
    _permit: OwnedSemaphorePermit,
}

impl Session {
    pub fn store(&self) -> &dyn AnalyticsStore {
        self.store.as_ref()
    }

    /// Run one store operation, failing fast when it outlives the timeout.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> ShopResult<T>
    where
        F: Future<Output = ShopResult<T>>,
    {
        let result = tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ShopError::Timeout(self.timeout.as_secs()))?;
        debug!(
            operation,
            ok = result.is_ok(),
            elapsed_ms = self.opened.elapsed().as_millis() as u64,
            "Store operation finished"
        );
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(
            elapsed_ms = self.opened.elapsed().as_millis() as u64,
            "Session released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopgraph_core::MemoryStore;

    fn gateway(max_in_flight: usize) -> Gateway {
        Gateway::new(Arc::new(MemoryStore::new()), max_in_flight, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_session_permit_released_on_drop() {
        let gateway = gateway(1);
        let session = gateway.open().await.unwrap();
        assert_eq!(gateway.permits.available_permits(), 0);
        drop(session);
        assert_eq!(gateway.permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_open_times_out_when_saturated() {
        let gateway = gateway(1);
        let _held = gateway.open().await.unwrap();
        assert!(matches!(gateway.open().await, Err(ShopError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_permit_released_after_failed_query() {
        let gateway = gateway(1);
        assert!(gateway.query(QueryTemplate::BuyersOfTheDay, Some("nope")).await.is_err());
        assert!(gateway.query(QueryTemplate::AllBuyers, None).await.is_ok());
        assert_eq!(gateway.permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected_while_saturated() {
        let gateway = gateway(1);
        let _held = gateway.open().await.unwrap();
        assert!(matches!(
            gateway.ingest(b"{\"buyer\": ").await,
            Err(ShopError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_operation_times_out() {
        let gateway = gateway(1);
        let session = gateway.open().await.unwrap();
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ShopError>(())
        };
        assert!(matches!(session.run("slow", slow).await, Err(ShopError::Timeout(_))));
    }
}
