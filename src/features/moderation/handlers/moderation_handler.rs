use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireModerator;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::moderation::dtos::{ContentOutcomeDto, ModerationResultDto, SubmitContentDto};
use crate::features::moderation::services::ModerationService;
use crate::shared::types::{ApiResponse, Meta};

/// Submit content for moderation
///
/// Always answers with a decision. `pending_review` means the item has been
/// queued for a moderator; the final decision is visible later through the
/// content endpoint.
#[utoipa::path(
    post,
    path = "/api/moderation/submissions",
    request_body = SubmitContentDto,
    responses(
        (status = 200, description = "Moderation outcome", body = ApiResponse<ContentOutcomeDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Content id belongs to another author")
    ),
    tag = "moderation",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit_content(
    user: AuthenticatedUser,
    State(service): State<Arc<ModerationService>>,
    ValidatedJson(dto): ValidatedJson<SubmitContentDto>,
) -> Result<Json<ApiResponse<ContentOutcomeDto>>> {
    let result = service.submit(dto.into_item(&user.sub)).await?;
    Ok(Json(ApiResponse::success(Some(result.into()), None, None)))
}

/// Get the current outcome for a content item
#[utoipa::path(
    get,
    path = "/api/moderation/contents/{content_id}",
    params(
        ("content_id" = String, Path, description = "Content item id")
    ),
    responses(
        (status = 200, description = "Current outcome", body = ApiResponse<ContentOutcomeDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the content's author"),
        (status = 404, description = "Content not found")
    ),
    tag = "moderation",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_content_outcome(
    user: AuthenticatedUser,
    State(service): State<Arc<ModerationService>>,
    Path(content_id): Path<String>,
) -> Result<Json<ApiResponse<ContentOutcomeDto>>> {
    let result = service.current_result(&content_id).await?;
    if result.user_id != user.sub && !user.has_moderator_access() {
        return Err(AppError::Forbidden(
            "Content belongs to another user".to_string(),
        ));
    }
    Ok(Json(ApiResponse::success(Some(result.into()), None, None)))
}

/// Every moderation result recorded for a content item, oldest first
#[utoipa::path(
    get,
    path = "/api/moderation/contents/{content_id}/history",
    params(
        ("content_id" = String, Path, description = "Content item id")
    ),
    responses(
        (status = 200, description = "Result history", body = ApiResponse<Vec<ModerationResultDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required"),
        (status = 404, description = "Content not found")
    ),
    tag = "moderation",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_content_history(
    RequireModerator(_moderator): RequireModerator,
    State(service): State<Arc<ModerationService>>,
    Path(content_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ModerationResultDto>>>> {
    let history: Vec<ModerationResultDto> = service
        .history(&content_id)
        .await?
        .into_iter()
        .map(ModerationResultDto::from)
        .collect();
    let total = history.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(history),
        None,
        Some(Meta { total }),
    )))
}

/// Get one moderation result
#[utoipa::path(
    get,
    path = "/api/moderation/results/{id}",
    params(
        ("id" = Uuid, Path, description = "Moderation result id")
    ),
    responses(
        (status = 200, description = "Moderation result", body = ApiResponse<ModerationResultDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required"),
        (status = 404, description = "Result not found")
    ),
    tag = "moderation",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_result(
    RequireModerator(_moderator): RequireModerator,
    State(service): State<Arc<ModerationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ModerationResultDto>>> {
    let result = service.get_result(id).await?;
    Ok(Json(ApiResponse::success(Some(result.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::Router;
    use axum_test::TestServer;
    use fake::faker::internet::en::Username;
    use fake::Fake;
    use serde_json::{json, Value};

    use crate::core::config::{ClassifierConfig, ModerationConfig};
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::moderation::classifiers::test_support::{
        verdict_json, Scripted, ScriptedClassifier,
    };
    use crate::features::moderation::classifiers::ClassifierAdapter;
    use crate::features::moderation::routes;
    use crate::features::moderation::services::ModerationService;
    use crate::features::notifications::services::NotificationService;
    use crate::features::review_queue::services::ReviewQueueService;
    use crate::features::safety_metrics::services::SafetyMetricsService;
    use crate::modules::store::InMemoryModerationStore;
    use crate::shared::constants::ROLE_MODERATOR;
    use crate::shared::keyed_locks::KeyedLocks;
    use crate::shared::prompts::PromptEngine;
    use crate::shared::test_helpers::{create_user, with_user};

    fn service(reply: Scripted) -> Arc<ModerationService> {
        let store = Arc::new(InMemoryModerationStore::new());
        let locks = Arc::new(KeyedLocks::new());
        let metrics = Arc::new(SafetyMetricsService::new(store.clone(), locks.clone()));
        let queue = Arc::new(ReviewQueueService::new(
            store.clone(),
            locks.clone(),
            Arc::new(NotificationService::new(16)),
            metrics.clone(),
        ));
        let adapter = Arc::new(ClassifierAdapter::new(
            Arc::new(ScriptedClassifier::always(reply)),
            Arc::new(PromptEngine::default()),
            &ClassifierConfig {
                tensorzero_url: None,
                api_key: String::new(),
                model_name: "test".to_string(),
                timeout: Duration::from_millis(50),
                max_attempts: 1,
            },
        ));
        Arc::new(ModerationService::new(
            store,
            adapter,
            queue,
            metrics,
            locks,
            &ModerationConfig::default(),
        ))
    }

    fn server_as(service: Arc<ModerationService>, user: AuthenticatedUser) -> TestServer {
        let app: Router = with_user(routes::routes(service), user);
        tokio_test::assert_ok!(TestServer::new(app))
    }

    fn submission(content_id: &str) -> Value {
        json!({
            "contentId": content_id,
            "payload": { "type": "text", "text": "nice weather today" }
        })
    }

    #[tokio::test]
    async fn test_submit_returns_author_outcome() {
        let author: String = Username().fake();
        let service = service(Scripted::Reply(verdict_json(true, "none", 0.95)));
        let server = server_as(service, create_user(&author, &[]));

        let response = server
            .post("/api/moderation/submissions")
            .json(&submission("post-1"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["decision"], "approved");
        assert_eq!(body["data"]["isApproved"], true);
        assert!(body["data"].get("overallScore").is_none());
        assert!(body["data"]["feedbackMessage"].is_string());
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_payload() {
        let service = service(Scripted::Reply(verdict_json(true, "none", 0.95)));
        let server = server_as(service, create_user("author-1", &[]));

        let response = server
            .post("/api/moderation/submissions")
            .json(&json!({
                "contentId": "post-1",
                "payload": { "type": "image", "imageUrls": [] }
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classifier_outage_never_surfaces_to_author() {
        let service = service(Scripted::Hang);
        let server = server_as(service, create_user("author-1", &[]));

        let response = server
            .post("/api/moderation/submissions")
            .json(&submission("post-1"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["decision"], "approved");
    }

    #[tokio::test]
    async fn test_outcome_is_private_to_author_and_moderators() {
        let service = service(Scripted::Reply(verdict_json(true, "none", 0.95)));
        server_as(service.clone(), create_user("author-1", &[]))
            .post("/api/moderation/submissions")
            .json(&submission("post-1"))
            .await
            .assert_status_ok();

        server_as(service.clone(), create_user("author-1", &[]))
            .get("/api/moderation/contents/post-1")
            .await
            .assert_status_ok();

        server_as(service.clone(), create_user("stranger", &[]))
            .get("/api/moderation/contents/post-1")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server_as(service, create_user("mod-1", &[ROLE_MODERATOR]))
            .get("/api/moderation/contents/post-1")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_history_and_result_are_moderator_only() {
        let service = service(Scripted::Reply(verdict_json(true, "none", 0.95)));
        let submitted = server_as(service.clone(), create_user("author-1", &[]))
            .post("/api/moderation/submissions")
            .json(&submission("post-1"))
            .await;
        let body: Value = submitted.json();
        let moderation_id = body["data"]["moderationId"].as_str().unwrap().to_string();

        server_as(service.clone(), create_user("author-1", &[]))
            .get("/api/moderation/contents/post-1/history")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let moderator = server_as(service, create_user("mod-1", &[ROLE_MODERATOR]));
        let history = moderator.get("/api/moderation/contents/post-1/history").await;
        history.assert_status_ok();
        let body: Value = history.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["classifierId"], "external-classifier");

        let result = moderator
            .get(&format!("/api/moderation/results/{}", moderation_id))
            .await;
        result.assert_status_ok();
        let body: Value = result.json();
        assert_eq!(body["data"]["contentId"], "post-1");
        assert!(body["data"]["overallScore"].is_number());
    }

    #[tokio::test]
    async fn test_unknown_content_is_404() {
        let service = service(Scripted::Hang);
        server_as(service, create_user("author-1", &[]))
            .get("/api/moderation/contents/missing")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
