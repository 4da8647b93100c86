use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::appeals::models::{Appeal, AppealStatus, CreateAppeal};
use crate::modules::store::ModerationStore;

/// Files appeals against moderation results. Resolution happens elsewhere.
pub struct AppealService {
    store: Arc<dyn ModerationStore>,
}

impl AppealService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub async fn file(&self, moderation_id: Uuid, user_id: &str, reason: String) -> Result<Appeal> {
        let result = self
            .store
            .get_result(moderation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Moderation result {} not found", moderation_id))
            })?;

        if result.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the content's author can appeal its moderation".to_string(),
            ));
        }

        if !result.appealable {
            return Err(AppError::NotAppealable(
                "Critical severity decisions cannot be appealed".to_string(),
            ));
        }

        let open = self
            .store
            .appeals_for_result(moderation_id)
            .await?
            .into_iter()
            .any(|a| a.status == AppealStatus::Pending);
        if open {
            return Err(AppError::Conflict(
                "An appeal for this decision is already pending".to_string(),
            ));
        }

        let appeal: Appeal = CreateAppeal {
            moderation_id,
            user_id: user_id.to_string(),
            content_id: result.content_id,
            reason,
        }
        .into();
        self.store.insert_appeal(&appeal).await?;

        tracing::info!(
            appeal_id = %appeal.id,
            moderation_id = %moderation_id,
            content_id = %appeal.content_id,
            "Appeal filed"
        );
        Ok(appeal)
    }

    /// A user's appeals, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Appeal>> {
        self.store.appeals_by_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::moderation::models::{
        Category, ContentType, CreateModerationResult, Decision, ModerationResult, Severity,
    };
    use crate::modules::store::InMemoryModerationStore;
    use std::collections::BTreeSet;

    async fn setup(severity: Severity) -> (AppealService, ModerationResult) {
        let store = Arc::new(InMemoryModerationStore::new());
        let result: ModerationResult = CreateModerationResult {
            content_id: "post-1".to_string(),
            user_id: "author-1".to_string(),
            content_type: ContentType::Image,
            decision: Decision::Rejected,
            severity,
            categories: BTreeSet::from([Category::Violence]),
            confidence: 0.9,
            overall_score: 0.1,
            context_aware: false,
            classifier_id: "external-classifier".to_string(),
            notes: None,
            feedback_message: None,
            content_fingerprint: "fp".to_string(),
        }
        .into();
        store.record_result(&result).await.unwrap();
        (AppealService::new(store), result)
    }

    #[tokio::test]
    async fn test_high_severity_rejection_can_be_appealed() {
        let (service, result) = setup(Severity::High).await;

        let appeal = service
            .file(result.id, "author-1", "It was a movie prop".to_string())
            .await
            .unwrap();

        assert_eq!(appeal.status, AppealStatus::Pending);
        assert_eq!(appeal.content_id, "post-1");
        assert_eq!(service.list_for_user("author-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_critical_severity_is_not_appealable() {
        let (service, result) = setup(Severity::Critical).await;

        let err = service
            .file(result.id, "author-1", "please".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotAppealable(_)));
        assert!(service.list_for_user("author-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_result_is_not_found() {
        let (service, _) = setup(Severity::High).await;
        let err = service
            .file(Uuid::now_v7(), "author-1", "why".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_author_may_appeal_once() {
        let (service, result) = setup(Severity::Medium).await;

        let err = service
            .file(result.id, "someone-else", "unfair".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service
            .file(result.id, "author-1", "unfair".to_string())
            .await
            .unwrap();
        let err = service
            .file(result.id, "author-1", "still unfair".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
