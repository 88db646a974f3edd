use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use roomroast::{InferenceStatus, RoastRequest, RoastResult};

use crate::{
    config::Config,
    errors::{WebError, WebResult},
    inference::OllamaClient,
    roast,
};

/// Everything a handler needs. Cheap to clone; nothing in it is mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ollama: OllamaClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let ollama = OllamaClient::new(&config.inference)?;
        Ok(Self {
            config: Arc::new(config),
            ollama,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_body_bytes();
    Router::new()
        // `GET /health` goes to `health`
        .route("/health", get(health))
        // `GET /api/status` goes to `inference_status`
        .route("/api/status", get(inference_status))
        // `POST /api/roast` goes to `roast_room`
        .route("/api/roast", post(roast_room))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            tower_http::compression::CompressionLayer::new()
                .quality(tower_http::CompressionLevel::Fastest),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

// Just reply that everything is okay
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Report whether the inference server is up. Always 200; the body says how it went.
async fn inference_status(State(state): State<AppState>) -> Json<InferenceStatus> {
    match state.ollama.list_models().await {
        Ok(models) => Json(InferenceStatus {
            online: true,
            models,
            detail: None,
        }),
        Err(e) => {
            tracing::warn!("Inference server at {} is offline: {}", state.ollama.base_url(), e);
            Json(InferenceStatus {
                online: false,
                models: vec![],
                detail: Some(e.to_string()),
            })
        }
    }
}

/// Describe, roast and score an uploaded room photo.
///
/// If the caller goes away, axum drops this future, which drops whichever model call
/// is in flight and closes its connection.
async fn roast_room(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> WebResult<Json<RoastResult>> {
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => roast::image_too_large(&state.config.limits),
        _ => WebError::InvalidInput(rejection.body_text()),
    })?;
    let request: RoastRequest = serde_json::from_slice(&body)
        .map_err(|e| WebError::InvalidInput(format!("Malformed request body: {}", e)))?;
    let result = roast::roast_room(&state.ollama, &state.config, request).await?;
    Ok(Json(result))
}
