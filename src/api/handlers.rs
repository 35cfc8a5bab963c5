use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::engine::RenderEngine;
use crate::error::RelayError;
use crate::model::GenerationResponse;
use crate::service::GenerationService;

pub type AppState<E> = Arc<GenerationService<E>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub template_loaded: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(error: &RelayError) -> Self {
        Self {
            error: error.to_string(),
            kind: error.kind().to_string(),
        }
    }
}

pub async fn health_check<E: RenderEngine>(
    State(service): State<AppState<E>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        template_loaded: service.templates().is_loaded(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Run one generation. The body is the handler event: the request fields,
/// optionally nested under `input`.
pub async fn generate<E: RenderEngine>(
    State(service): State<AppState<E>>,
    Json(event): Json<Value>,
) -> Result<Json<GenerationResponse>, (StatusCode, Json<ErrorResponse>)> {
    match service.handle(&event).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            log::error!("Generation failed: {}", e);
            Err((status_for(&e), Json(ErrorResponse::new(&e))))
        }
    }
}

pub fn status_for(error: &RelayError) -> StatusCode {
    match error {
        RelayError::Validation(_) => StatusCode::BAD_REQUEST,
        RelayError::Submission { .. } | RelayError::PollTransport { .. } => StatusCode::BAD_GATEWAY,
        RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        RelayError::Load { .. } | RelayError::Path(_) | RelayError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
