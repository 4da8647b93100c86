use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::guards::RequireModerator;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::safety_metrics::dtos::SafetyMetricsResponseDto;
use crate::features::safety_metrics::services::SafetyMetricsService;
use crate::shared::types::ApiResponse;

/// Get the caller's own safety metrics
#[utoipa::path(
    get,
    path = "/api/safety-metrics/me",
    responses(
        (status = 200, description = "Safety metrics", body = ApiResponse<SafetyMetricsResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "safety-metrics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_metrics(
    user: AuthenticatedUser,
    State(service): State<Arc<SafetyMetricsService>>,
) -> Result<Json<ApiResponse<SafetyMetricsResponseDto>>> {
    let metrics = service.get(&user.sub).await?;
    Ok(Json(ApiResponse::success(Some(metrics.into()), None, None)))
}

/// Get any user's safety metrics
#[utoipa::path(
    get,
    path = "/api/safety-metrics/{user_id}",
    params(
        ("user_id" = String, Path, description = "Platform user id")
    ),
    responses(
        (status = 200, description = "Safety metrics", body = ApiResponse<SafetyMetricsResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required")
    ),
    tag = "safety-metrics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user_metrics(
    RequireModerator(_moderator): RequireModerator,
    State(service): State<Arc<SafetyMetricsService>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<SafetyMetricsResponseDto>>> {
    let metrics = service.get(&user_id).await?;
    Ok(Json(ApiResponse::success(Some(metrics.into()), None, None)))
}
