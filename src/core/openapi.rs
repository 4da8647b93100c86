use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::appeals::{dtos as appeals_dtos, handlers as appeals_handlers, models as appeals_models};
use crate::features::moderation::{
    dtos as moderation_dtos, handlers as moderation_handlers, models as moderation_models,
};
use crate::features::notifications::handlers as notifications_handlers;
use crate::features::review_queue::{
    dtos as review_queue_dtos, handlers as review_queue_handlers, models as review_queue_models,
};
use crate::features::safety_metrics::{
    dtos as safety_metrics_dtos, handlers as safety_metrics_handlers,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Moderation
        moderation_handlers::submit_content,
        moderation_handlers::get_content_outcome,
        moderation_handlers::get_content_history,
        moderation_handlers::get_result,
        // Review queue (moderators)
        review_queue_handlers::list_queue,
        review_queue_handlers::queue_stats,
        review_queue_handlers::resolve_item,
        // Moderation events (moderators)
        notifications_handlers::stream_events,
        // Safety metrics
        safety_metrics_handlers::get_my_metrics,
        safety_metrics_handlers::get_user_metrics,
        // Appeals
        appeals_handlers::file_appeal,
        appeals_handlers::list_my_appeals,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Moderation
            moderation_models::ContentType,
            moderation_models::ContentPayload,
            moderation_models::DeclaredContext,
            moderation_models::Decision,
            moderation_models::Severity,
            moderation_models::Category,
            moderation_models::RoastingIntensity,
            moderation_dtos::SubmitContentDto,
            moderation_dtos::ContentOutcomeDto,
            moderation_dtos::ModerationResultDto,
            ApiResponse<moderation_dtos::ContentOutcomeDto>,
            ApiResponse<moderation_dtos::ModerationResultDto>,
            ApiResponse<Vec<moderation_dtos::ModerationResultDto>>,
            // Review queue
            review_queue_models::ReviewOutcome,
            review_queue_dtos::QueueStatusFilter,
            review_queue_dtos::QueueItemResponseDto,
            review_queue_dtos::ResolveQueueItemDto,
            review_queue_dtos::ResolveQueueItemResponseDto,
            review_queue_dtos::QueueStatsDto,
            ApiResponse<Vec<review_queue_dtos::QueueItemResponseDto>>,
            ApiResponse<review_queue_dtos::ResolveQueueItemResponseDto>,
            ApiResponse<review_queue_dtos::QueueStatsDto>,
            // Safety metrics
            safety_metrics_dtos::SafetyMetricsResponseDto,
            ApiResponse<safety_metrics_dtos::SafetyMetricsResponseDto>,
            // Appeals
            appeals_models::AppealStatus,
            appeals_dtos::FileAppealDto,
            appeals_dtos::AppealResponseDto,
            ApiResponse<appeals_dtos::AppealResponseDto>,
            ApiResponse<Vec<appeals_dtos::AppealResponseDto>>,
        )
    ),
    tags(
        (name = "moderation", description = "Content submission and moderation outcomes"),
        (name = "review-queue", description = "Human review queue (moderators only)"),
        (name = "notifications", description = "Live review queue events (moderators only)"),
        (name = "safety-metrics", description = "Per-user safety metrics"),
        (name = "appeals", description = "Appeals against moderation decisions"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Content Trust API",
        version = "0.1.0",
        description = "Content moderation, human review and safety metrics",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
