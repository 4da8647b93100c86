use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::moderation::handlers;
use crate::features::moderation::services::ModerationService;

/// Create routes for the moderation pipeline
pub fn routes(service: Arc<ModerationService>) -> Router {
    Router::new()
        .route("/api/moderation/submissions", post(handlers::submit_content))
        .route(
            "/api/moderation/contents/{content_id}",
            get(handlers::get_content_outcome),
        )
        .route(
            "/api/moderation/contents/{content_id}/history",
            get(handlers::get_content_history),
        )
        .route("/api/moderation/results/{id}", get(handlers::get_result))
        .with_state(service)
}
