//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use crate::config::{Config, ServerConfig};
use crate::resolver::Resolver;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub config: Arc<Config>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/api/resolve", post(resolve_handler))
        .route("/api/resolve/weekly", post(resolve_weekly_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(resolver: Resolver, config: &Config) -> Result<()> {
    let ServerConfig { host, port } = &config.server;
    let addr = format!("{}:{}", host, port);
    info!("🚀 Starting HTTP server on {}", addr);

    let app = router(AppState {
        resolver: Arc::new(resolver),
        config: Arc::new(config.clone()),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health = handlers::health_check(&state.resolver, &state.config).await;
    (StatusCode::OK, Json(health)).into_response()
}

async fn resolve_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let result = handlers::resolve(&state.resolver, &body).await;
    (StatusCode::OK, Json(result)).into_response()
}

async fn resolve_weekly_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let result = handlers::resolve_weekly(&state.resolver, &body).await;
    (StatusCode::OK, Json(result)).into_response()
}
