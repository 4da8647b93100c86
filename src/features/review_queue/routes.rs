use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::review_queue::handlers;
use crate::features::review_queue::services::ReviewQueueService;

/// Create routes for the human review queue (moderators only)
pub fn routes(service: Arc<ReviewQueueService>) -> Router {
    Router::new()
        .route("/api/moderation/queue/stats", get(handlers::queue_stats))
        .route(
            "/api/moderation/queue/items/{content_id}/resolve",
            post(handlers::resolve_item),
        )
        .route(
            "/api/moderation/queue/{content_type}",
            get(handlers::list_queue),
        )
        .with_state(service)
}
