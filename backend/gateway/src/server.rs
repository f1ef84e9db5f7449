//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use media::{ImageStore, media_router};
use snapsolve_solver::SolvePipeline;
use snapsolve_store::ProblemStore;

use crate::health_api;
use crate::problems_api;
use crate::rate_limit::RateLimiter;

/// Application state shared across routes.
pub struct GatewayState {
    pub store: Arc<dyn ProblemStore>,
    pub pipeline: Arc<SolvePipeline>,
    pub images: ImageStore,
    pub rate_limiter: RateLimiter,
    /// Static bearer token; `None` leaves the API open.
    pub api_token: Option<String>,
    /// Externally reachable base URL. When unset, images are forwarded to
    /// the model inline as data URLs.
    pub public_base_url: Option<String>,
}

/// Build the gateway router: problems API, health, and media serving.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    let images = state.images.clone();
    Router::new()
        .route(
            "/api/problems",
            post(problems_api::submit_problem).get(problems_api::list_problems),
        )
        .route("/api/problems/:id", get(problems_api::get_problem))
        .route("/api/health", get(health_api::get_health))
        .with_state(state)
        // Raise axum's default 2 MB body cap to the store's upload cap.
        .layer(DefaultBodyLimit::max(images.max_bytes()))
        .nest("/media", media_router(images))
        .layer(CorsLayer::permissive())
}

/// Start the Axum HTTP server for the gateway.
pub async fn start_server(addr: SocketAddr, state: Arc<GatewayState>) -> Result<()> {
    let app = build_router(state);

    info!("Gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
