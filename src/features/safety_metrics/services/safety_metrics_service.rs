use std::sync::Arc;

use crate::core::error::Result;
use crate::features::moderation::models::ModerationResult;
use crate::features::safety_metrics::models::SafetyMetrics;
use crate::modules::store::ModerationStore;
use crate::shared::keyed_locks::{user_key, KeyedLocks};

/// Keeps per-user safety counters in step with authoritative results.
///
/// Every read-modify-write runs under the user's lock, so concurrent
/// submissions by one author never lose an increment.
pub struct SafetyMetricsService {
    store: Arc<dyn ModerationStore>,
    locks: Arc<KeyedLocks>,
}

impl SafetyMetricsService {
    pub fn new(store: Arc<dyn ModerationStore>, locks: Arc<KeyedLocks>) -> Self {
        Self { store, locks }
    }

    /// Count the first result of a content item
    pub async fn record(&self, result: &ModerationResult) -> Result<SafetyMetrics> {
        let _guard = self.locks.acquire(&user_key(&result.user_id)).await;

        let mut metrics = self.load(&result.user_id).await?;
        metrics.record(result);
        self.store.save_metrics(&metrics).await?;

        tracing::debug!(
            user_id = %metrics.user_id,
            safety_score = metrics.safety_score(),
            "Recorded moderation result in safety metrics"
        );
        Ok(metrics)
    }

    /// Swap a superseded result's contribution for its replacement
    pub async fn revise(
        &self,
        previous: &ModerationResult,
        current: &ModerationResult,
    ) -> Result<SafetyMetrics> {
        let _guard = self.locks.acquire(&user_key(&current.user_id)).await;

        let mut metrics = self.load(&current.user_id).await?;
        if metrics.total_items == 0 {
            // Counters lost or never written; count the item afresh
            metrics.record(current);
        } else {
            metrics.revise(previous, current);
        }
        self.store.save_metrics(&metrics).await?;

        tracing::debug!(
            user_id = %metrics.user_id,
            safety_score = metrics.safety_score(),
            "Revised safety metrics"
        );
        Ok(metrics)
    }

    /// Metrics for a user; users with no moderated content get empty
    /// counters and a score of 100
    pub async fn get(&self, user_id: &str) -> Result<SafetyMetrics> {
        self.load(user_id).await
    }

    async fn load(&self, user_id: &str) -> Result<SafetyMetrics> {
        Ok(self
            .store
            .get_metrics(user_id)
            .await?
            .unwrap_or_else(|| SafetyMetrics::new(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::moderation::models::{
        Category, ContentType, CreateModerationResult, Decision, Severity,
    };
    use crate::modules::store::InMemoryModerationStore;
    use std::collections::BTreeSet;

    fn service() -> SafetyMetricsService {
        SafetyMetricsService::new(
            Arc::new(InMemoryModerationStore::new()),
            Arc::new(KeyedLocks::new()),
        )
    }

    fn result(content_id: &str, decision: Decision, categories: &[Category]) -> ModerationResult {
        CreateModerationResult {
            content_id: content_id.to_string(),
            user_id: "author-1".to_string(),
            content_type: ContentType::Text,
            decision,
            severity: Severity::Low,
            categories: categories.iter().copied().collect::<BTreeSet<_>>(),
            confidence: 0.9,
            overall_score: 0.9,
            context_aware: false,
            classifier_id: "test".to_string(),
            notes: None,
            feedback_message: None,
            content_fingerprint: content_id.to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_unknown_user_has_perfect_score() {
        let metrics = service().get("nobody").await.unwrap();
        assert_eq!(metrics.total_items, 0);
        assert_eq!(metrics.safety_score(), 100);
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let service = Arc::new(service());
        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let decision = if i % 4 == 0 {
                    Decision::Rejected
                } else {
                    Decision::Approved
                };
                service
                    .record(&result(&format!("post-{}", i), decision, &[]))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let metrics = service.get("author-1").await.unwrap();
        assert_eq!(metrics.total_items, 20);
        assert_eq!(metrics.flagged_items, 5);
        assert_eq!(metrics.safety_score(), 75);
    }

    #[tokio::test]
    async fn test_revise_replaces_contribution() {
        let service = service();
        let pending = result("post-1", Decision::PendingReview, &[Category::Harassment]);
        service.record(&pending).await.unwrap();

        let approved = result("post-1", Decision::Approved, &[]);
        let metrics = service.revise(&pending, &approved).await.unwrap();

        assert_eq!(metrics.total_items, 1);
        assert_eq!(metrics.flagged_items, 0);
        assert!(metrics.category_counts.is_empty());
    }
}
