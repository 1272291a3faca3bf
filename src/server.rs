//! HTTP surface.
//!
//! - `POST /generate-video` with a JSON [`GenerateRequest`] body
//! - `GET /generate-video?short=1` narrates the current top headline
//! - `GET /health`
//!
//! Every failure maps to `500 {"detail": "..."}`; the full error is logged.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    error::NewsReelError,
    job::{GenerateRequest, GenerationResult, HeadlineQuery},
    pipeline::Pipeline,
};

/// Error body returned to HTTP callers
pub struct ApiError(NewsReelError);

impl From<NewsReelError> for ApiError {
    fn from(err: NewsReelError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, upstream = self.0.is_upstream(), "Video generation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": self.0.user_message() })),
        )
            .into_response()
    }
}

/// Build the application router around a shared pipeline
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/generate-video", get(generate_from_headline).post(generate_video))
        .route("/health", get(health))
        .with_state(pipeline)
}

/// Bind `bind` and serve until Ctrl-C
pub async fn serve(pipeline: Arc<Pipeline>, bind: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutting down");
}

async fn generate_video(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerationResult>, ApiError> {
    info!(has_title = request.title.is_some(), has_content = request.content.is_some(), "POST /generate-video");
    Ok(Json(pipeline.generate(request).await?))
}

async fn generate_from_headline(
    State(pipeline): State<Arc<Pipeline>>,
    Query(query): Query<HeadlineQuery>,
) -> Result<Json<GenerationResult>, ApiError> {
    let short = query.is_short();
    info!(short, "GET /generate-video");
    Ok(Json(pipeline.generate_from_headline(short).await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
