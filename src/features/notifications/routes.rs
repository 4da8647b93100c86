use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationService;

/// Create routes for moderation event streaming
pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/moderation/events", get(handlers::stream_events))
        .with_state(service)
}
