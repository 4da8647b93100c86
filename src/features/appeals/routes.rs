use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::appeals::handlers;
use crate::features::appeals::services::AppealService;

/// Create routes for the appeals feature
pub fn routes(service: Arc<AppealService>) -> Router {
    Router::new()
        .route(
            "/api/appeals",
            get(handlers::list_my_appeals).post(handlers::file_appeal),
        )
        .with_state(service)
}
