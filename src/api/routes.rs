use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::engine::RenderEngine;

pub fn create_router<E: RenderEngine + 'static>() -> Router<AppState<E>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check::<E>))
        // Text-to-image generation
        .route("/generate", post(handlers::generate::<E>))
}
