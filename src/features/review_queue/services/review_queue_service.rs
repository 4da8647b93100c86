use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;

use crate::core::error::{AppError, Result};
use crate::features::moderation::models::{
    Category, ContentType, CreateModerationResult, Decision, ModerationResult, Severity,
};
use crate::features::notifications::models::ModerationEvent;
use crate::features::notifications::services::NotificationService;
use crate::features::review_queue::dtos::QueueStatsDto;
use crate::features::review_queue::models::{CreateQueueItem, QueueItem, ReviewOutcome};
use crate::features::safety_metrics::services::SafetyMetricsService;
use crate::modules::store::ModerationStore;
use crate::shared::constants::CLASSIFIER_HUMAN;
use crate::shared::keyed_locks::{content_key, KeyedLocks};

/// Human review queues, one per content type, in enqueue order.
///
/// Enqueue and resolve for a content item run under that item's content
/// lock, the same one the moderation pipeline holds while it records a
/// result, so an item can never be resolved before it is fully enqueued.
pub struct ReviewQueueService {
    store: Arc<dyn ModerationStore>,
    locks: Arc<KeyedLocks>,
    notifications: Arc<NotificationService>,
    metrics: Arc<SafetyMetricsService>,
}

impl ReviewQueueService {
    pub fn new(
        store: Arc<dyn ModerationStore>,
        locks: Arc<KeyedLocks>,
        notifications: Arc<NotificationService>,
        metrics: Arc<SafetyMetricsService>,
    ) -> Self {
        Self {
            store,
            locks,
            notifications,
            metrics,
        }
    }

    /// Queue a pending result for human review. The caller must hold the
    /// content lock for `result.content_id`. An unreviewed entry left by an
    /// earlier submission is pointed at the new result instead of adding a
    /// second one.
    pub async fn enqueue(
        &self,
        _content_lock: &OwnedMutexGuard<()>,
        result: &ModerationResult,
        initial_assessment: String,
    ) -> Result<QueueItem> {
        if let Some(mut open) = self.open_item(&result.content_id).await? {
            if open.moderation_id == result.id {
                tracing::debug!(content_id = %result.content_id, "Content already queued for review");
                return Ok(open);
            }

            open.retarget(result.id, initial_assessment);
            self.store.update_queue_item(&open).await?;

            tracing::info!(
                content_id = %open.content_id,
                moderation_id = %open.moderation_id,
                "Queued review retargeted to resubmitted content"
            );
            self.notifications
                .publish(ModerationEvent::ItemEnqueued(open.clone().into()));
            return Ok(open);
        }

        let item: QueueItem = CreateQueueItem {
            content_id: result.content_id.clone(),
            moderation_id: result.id,
            content_type: result.content_type,
            initial_assessment,
        }
        .into();
        self.store.insert_queue_item(&item).await?;

        tracing::info!(
            content_id = %item.content_id,
            content_type = %item.content_type,
            "Content queued for human review"
        );
        self.notifications
            .publish(ModerationEvent::ItemEnqueued(item.clone().into()));

        Ok(item)
    }

    /// Close the unreviewed entry of content whose latest result was decided
    /// without a human. The caller must hold the content lock.
    pub async fn supersede(
        &self,
        _content_lock: &OwnedMutexGuard<()>,
        result: &ModerationResult,
    ) -> Result<Option<QueueItem>> {
        let Some(mut open) = self.open_item(&result.content_id).await? else {
            return Ok(None);
        };

        open.supersede();
        self.store.update_queue_item(&open).await?;

        tracing::info!(
            content_id = %open.content_id,
            decision = ?result.decision,
            "Queued review superseded by resubmission"
        );
        self.notifications
            .publish(ModerationEvent::ItemResolved(open.clone().into()));

        Ok(Some(open))
    }

    async fn open_item(&self, content_id: &str) -> Result<Option<QueueItem>> {
        let items = self.store.queue_items_for_content(content_id).await?;
        Ok(items.into_iter().find(|item| !item.reviewed))
    }

    /// One queue in enqueue order
    pub async fn list(&self, content_type: ContentType, pending_only: bool) -> Result<Vec<QueueItem>> {
        self.store.list_queue(content_type, pending_only).await
    }

    pub async fn stats(&self) -> Result<QueueStatsDto> {
        let mut stats = QueueStatsDto::default();
        for content_type in ContentType::ALL {
            stats.set(content_type, self.store.pending_count(content_type).await?);
        }
        Ok(stats)
    }

    /// Record a moderator's decision. The queue item is marked reviewed and
    /// kept; a new authoritative result supersedes the pending one. Refused
    /// unless the item's result is still the authoritative pending one.
    pub async fn resolve(
        &self,
        content_id: &str,
        outcome: ReviewOutcome,
        notes: Option<String>,
        reviewer: &str,
    ) -> Result<(QueueItem, ModerationResult)> {
        let _guard = self.locks.acquire(&content_key(content_id)).await;

        let items = self.store.queue_items_for_content(content_id).await?;
        if items.is_empty() {
            return Err(AppError::NotFound(format!(
                "Content {} is not in the review queue",
                content_id
            )));
        }
        let Some(mut item) = items.into_iter().find(|item| !item.reviewed) else {
            return Err(AppError::AlreadyReviewed(format!(
                "Content {} has already been reviewed",
                content_id
            )));
        };

        let previous = match self.store.authoritative_result(content_id).await? {
            Some(current)
                if current.id == item.moderation_id
                    && current.decision == Decision::PendingReview =>
            {
                current
            }
            _ => {
                return Err(AppError::Conflict(format!(
                    "Content {} no longer awaits review",
                    content_id
                )))
            }
        };

        let result: ModerationResult = human_result(&previous, outcome, notes.clone()).into();
        item.mark_reviewed(outcome, reviewer, notes);
        self.store.record_review(&result, &item).await?;

        tracing::info!(
            content_id = %content_id,
            reviewer = %reviewer,
            decision = ?result.decision,
            "Review queue item resolved"
        );
        self.notifications
            .publish(ModerationEvent::ItemResolved(item.clone().into()));

        self.metrics.revise(&previous, &result).await?;

        Ok((item, result))
    }
}

/// The result a human decision produces, derived from the one it replaces
fn human_result(
    previous: &ModerationResult,
    outcome: ReviewOutcome,
    notes: Option<String>,
) -> CreateModerationResult {
    let decision = Decision::from(outcome);
    let context_tags = previous
        .categories
        .iter()
        .copied()
        .filter(Category::is_context_tag);

    let (severity, categories, overall_score) = match outcome {
        ReviewOutcome::Approved => (Severity::None, context_tags.collect(), 1.0),
        ReviewOutcome::Rejected => (
            previous.severity.max(Severity::Medium),
            previous.categories.clone(),
            0.0,
        ),
        ReviewOutcome::AgeRestricted => (
            previous.severity.max(Severity::Low),
            previous.categories.clone(),
            previous.overall_score,
        ),
    };

    CreateModerationResult {
        content_id: previous.content_id.clone(),
        user_id: previous.user_id.clone(),
        content_type: previous.content_type,
        decision,
        severity,
        categories,
        confidence: 1.0,
        overall_score,
        context_aware: previous.context_aware,
        classifier_id: CLASSIFIER_HUMAN.to_string(),
        notes: notes.or_else(|| previous.notes.clone()),
        feedback_message: None,
        content_fingerprint: previous.content_fingerprint.clone(),
    }
}
