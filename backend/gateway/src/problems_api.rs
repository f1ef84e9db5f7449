//! Problem submission and retrieval endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::Json,
};
use serde_json::{Value, json};
use tracing::{error, info};
use uuid::Uuid;

use media::to_data_url;
use snapsolve_core::Problem;

use crate::auth::RequireAuth;
use crate::server::GatewayState;

/// Handler for `POST /api/problems`.
///
/// Accepts raw image bytes (the `Content-Type` header carries the MIME
/// type), stores the image, inserts a `processing` record, and kicks off the
/// solve pipeline in the background. Responds 202 with the fresh record;
/// clients poll `GET /api/problems/:id` until the status leaves
/// `processing`.
pub async fn submit_problem(
    State(state): State<Arc<GatewayState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Problem>), (StatusCode, String)> {
    if !state.rate_limiter.check(&addr.ip().to_string()).await {
        return Err((StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".into()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let stored = state
        .images
        .save(&body, &content_type)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // image_url is what the record advertises; image_ref is what the model
    // is asked to read. They differ only when no public base URL is set.
    let (image_url, image_ref) = match &state.public_base_url {
        Some(base) => {
            let url = format!("{}/media/{}", base.trim_end_matches('/'), stored.filename);
            (url.clone(), url)
        }
        None => (
            format!("/media/{}", stored.filename),
            to_data_url(&content_type, &body),
        ),
    };

    let problem = Problem::new(user.user_id, image_url);
    state.store.insert(&problem).await.map_err(|e| {
        error!(error = %e, "Failed to insert problem record");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create problem".into(),
        )
    })?;

    info!(problem_id = %problem.id, owner = ?problem.owner_id, "Accepted problem submission");

    let pipeline = Arc::clone(&state.pipeline);
    let problem_id = problem.id;
    tokio::spawn(async move {
        pipeline.run(problem_id, &image_ref).await;
    });

    Ok((StatusCode::ACCEPTED, Json(problem)))
}

/// Handler for `GET /api/problems/:id` — the polling endpoint.
pub async fn get_problem(
    State(state): State<Arc<GatewayState>>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Problem>, StatusCode> {
    match state.store.get(id).await {
        Ok(Some(problem)) => Ok(Json(problem)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(error = %e, "Failed to fetch problem");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handler for `GET /api/problems` — recent submissions, newest first,
/// scoped to the caller's `X-User-Id` when present.
pub async fn list_problems(
    State(state): State<Arc<GatewayState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>, StatusCode> {
    match state.store.list_recent(user.user_id.as_deref(), 50).await {
        Ok(problems) => Ok(Json(json!({ "problems": problems }))),
        Err(e) => {
            error!(error = %e, "Failed to list problems");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
