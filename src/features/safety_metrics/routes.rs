use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::safety_metrics::handlers;
use crate::features::safety_metrics::services::SafetyMetricsService;

/// Create routes for the safety metrics feature
pub fn routes(service: Arc<SafetyMetricsService>) -> Router {
    Router::new()
        .route("/api/safety-metrics/me", get(handlers::get_my_metrics))
        .route("/api/safety-metrics/{user_id}", get(handlers::get_user_metrics))
        .with_state(service)
}
