//! Shopgraph Web Server
//!
//! Axum-based HTTP surface over the analytics catalog and ingestion path.

pub mod error;
pub mod gateway;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use shopgraph_core::AnalyticsStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::{AppState, ServerConfig};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Buyers
        .route("/buyers", get(routes::buyers::list_buyers))
        .route("/buyer/date", get(routes::buyers::buyers_of_the_day))
        .route("/buyer/{id}/purchase-history", get(routes::buyers::purchase_history))
        .route("/buyer/{id}/same-ip", get(routes::buyers::same_ip))
        .route(
            "/buyer/{id}/product-recomendations",
            get(routes::buyers::product_recommendations),
        )
        .route(
            "/buyer/{id}/product-recommendations",
            get(routes::buyers::product_recommendations),
        )
        // Products
        .route("/product/date", get(routes::products::products_of_the_day))
        // Transactions
        .route("/transaction", post(routes::transactions::create_transaction))
        .route("/transaction/date", get(routes::transactions::transactions_of_the_day))
        .route("/health", get(routes::health::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(store: Arc<dyn AnalyticsStore>, config: &ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(store, config);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down web server");
        })
        .await?;
    Ok(())
}
