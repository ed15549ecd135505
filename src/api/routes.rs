//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers::{self, AppState};
use super::middleware::{logging_middleware, rate_limit_middleware, start_cleanup_task};

/// In-flight request cap for the whole API
const API_MAX_IN_FLIGHT: usize = 64;

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .route("/lookup/:address", get(handlers::lookup_address))
        .route("/extract", post(handlers::extract_addresses));

    Router::new()
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(ConcurrencyLimitLayer::new(API_MAX_IN_FLIGHT))
}

/// Bind and serve until the task is dropped
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> eyre::Result<()> {
    start_cleanup_task();

    let listener = TcpListener::bind(addr).await?;
    info!("🌐 Inspection API listening on http://{}", addr);
    info!("   GET  /v1/health | GET /v1/stats | GET /v1/lookup/:address | POST /v1/extract");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
