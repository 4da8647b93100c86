use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireModerator;
use crate::features::moderation::models::ContentType;
use crate::features::review_queue::dtos::{
    QueueItemResponseDto, QueueListQuery, QueueStatsDto, QueueStatusFilter, ResolveQueueItemDto,
    ResolveQueueItemResponseDto,
};
use crate::features::review_queue::services::ReviewQueueService;
use crate::shared::types::{ApiResponse, Meta};

/// List one content type's review queue in enqueue order
#[utoipa::path(
    get,
    path = "/api/moderation/queue/{content_type}",
    params(
        ("content_type" = ContentType, Path, description = "text, image, video or audio"),
        QueueListQuery
    ),
    responses(
        (status = 200, description = "Queue items", body = ApiResponse<Vec<QueueItemResponseDto>>),
        (status = 400, description = "Unknown content type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required")
    ),
    tag = "review-queue",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_queue(
    RequireModerator(_moderator): RequireModerator,
    State(service): State<Arc<ReviewQueueService>>,
    Path(content_type): Path<ContentType>,
    Query(query): Query<QueueListQuery>,
) -> Result<Json<ApiResponse<Vec<QueueItemResponseDto>>>> {
    let pending_only = query.status == QueueStatusFilter::Pending;
    let items: Vec<QueueItemResponseDto> = service
        .list(content_type, pending_only)
        .await?
        .into_iter()
        .map(QueueItemResponseDto::from)
        .collect();
    let total = items.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Pending item counts for every queue
#[utoipa::path(
    get,
    path = "/api/moderation/queue/stats",
    responses(
        (status = 200, description = "Pending counts", body = ApiResponse<QueueStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required")
    ),
    tag = "review-queue",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn queue_stats(
    RequireModerator(_moderator): RequireModerator,
    State(service): State<Arc<ReviewQueueService>>,
) -> Result<Json<ApiResponse<QueueStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Resolve a queued item with a human decision
#[utoipa::path(
    post,
    path = "/api/moderation/queue/items/{content_id}/resolve",
    params(
        ("content_id" = String, Path, description = "Content item id")
    ),
    request_body = ResolveQueueItemDto,
    responses(
        (status = 200, description = "Item resolved", body = ApiResponse<ResolveQueueItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required"),
        (status = 404, description = "Content is not in the review queue"),
        (status = 409, description = "Already reviewed")
    ),
    tag = "review-queue",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn resolve_item(
    RequireModerator(moderator): RequireModerator,
    State(service): State<Arc<ReviewQueueService>>,
    Path(content_id): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResolveQueueItemDto>,
) -> Result<Json<ApiResponse<ResolveQueueItemResponseDto>>> {
    let (item, result) = service
        .resolve(&content_id, dto.decision, dto.notes, &moderator.sub)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(ResolveQueueItemResponseDto {
            queue_item: item.into(),
            result: result.into(),
        }),
        Some("Review recorded".to_string()),
        None,
    )))
}
