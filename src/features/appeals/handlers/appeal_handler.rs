use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::appeals::dtos::{AppealResponseDto, FileAppealDto};
use crate::features::appeals::services::AppealService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta};

/// Appeal a moderation decision on your own content
#[utoipa::path(
    post,
    path = "/api/appeals",
    request_body = FileAppealDto,
    responses(
        (status = 200, description = "Appeal filed", body = ApiResponse<AppealResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the content's author"),
        (status = 404, description = "Moderation result not found"),
        (status = 409, description = "An appeal is already pending"),
        (status = 422, description = "Decision is not appealable")
    ),
    tag = "appeals",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn file_appeal(
    user: AuthenticatedUser,
    State(service): State<Arc<AppealService>>,
    ValidatedJson(dto): ValidatedJson<FileAppealDto>,
) -> Result<Json<ApiResponse<AppealResponseDto>>> {
    let appeal = service.file(dto.moderation_id, &user.sub, dto.reason).await?;
    Ok(Json(ApiResponse::success(
        Some(appeal.into()),
        Some("Appeal submitted".to_string()),
        None,
    )))
}

/// List your appeals, newest first
#[utoipa::path(
    get,
    path = "/api/appeals",
    responses(
        (status = 200, description = "Appeals", body = ApiResponse<Vec<AppealResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appeals",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_my_appeals(
    user: AuthenticatedUser,
    State(service): State<Arc<AppealService>>,
) -> Result<Json<ApiResponse<Vec<AppealResponseDto>>>> {
    let appeals: Vec<AppealResponseDto> = service
        .list_for_user(&user.sub)
        .await?
        .into_iter()
        .map(AppealResponseDto::from)
        .collect();
    let total = appeals.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(appeals),
        None,
        Some(Meta { total }),
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use serde_json::{json, Value};

    use crate::features::appeals::routes;
    use crate::features::appeals::services::AppealService;
    use crate::features::moderation::models::{
        Category, ContentType, CreateModerationResult, Decision, ModerationResult, Severity,
    };
    use crate::modules::store::{InMemoryModerationStore, ModerationStore};
    use crate::shared::test_helpers::{create_user, with_user};

    async fn rejected(severity: Severity) -> (Arc<AppealService>, ModerationResult) {
        let store = Arc::new(InMemoryModerationStore::new());
        let result: ModerationResult = CreateModerationResult {
            content_id: "post-1".to_string(),
            user_id: "author-1".to_string(),
            content_type: ContentType::Text,
            decision: Decision::Rejected,
            severity,
            categories: BTreeSet::from([Category::Harassment]),
            confidence: 0.9,
            overall_score: 0.05,
            context_aware: false,
            classifier_id: "external-classifier".to_string(),
            notes: None,
            feedback_message: None,
            content_fingerprint: "fp".to_string(),
        }
        .into();
        store.record_result(&result).await.unwrap();
        (Arc::new(AppealService::new(store)), result)
    }

    fn server_as(service: Arc<AppealService>, sub: &str) -> TestServer {
        TestServer::new(with_user(routes::routes(service), create_user(sub, &[]))).unwrap()
    }

    #[tokio::test]
    async fn test_author_files_and_lists_appeal() {
        let (service, result) = rejected(Severity::High).await;
        let server = server_as(service, "author-1");
        let reason: String = Sentence(3..8).fake();

        let filed = server
            .post("/api/appeals")
            .json(&json!({ "moderationId": result.id, "reason": reason }))
            .await;
        filed.assert_status_ok();
        let body: Value = filed.json();
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["contentId"], "post-1");

        let listed: Value = server.get("/api/appeals").await.json();
        assert_eq!(listed["meta"]["total"], 1);
        assert_eq!(listed["data"][0]["reason"], reason.as_str());
    }

    #[tokio::test]
    async fn test_critical_decision_is_unprocessable() {
        let (service, result) = rejected(Severity::Critical).await;

        server_as(service, "author-1")
            .post("/api/appeals")
            .json(&json!({ "moderationId": result.id, "reason": "please look again" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_empty_reason_is_rejected() {
        let (service, result) = rejected(Severity::High).await;

        server_as(service, "author-1")
            .post("/api/appeals")
            .json(&json!({ "moderationId": result.id, "reason": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
