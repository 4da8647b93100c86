//! Persistent store for moderation state
//!
//! A typed repository over content items, moderation results, review queue
//! items, per-user safety metrics and appeals. Postgres in production; the
//! in-memory backend serves tests and single-node deployments.

mod memory;
mod postgres;

pub use memory::InMemoryModerationStore;
pub use postgres::PgModerationStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::appeals::models::Appeal;
use crate::features::moderation::models::{ContentItem, ContentType, ModerationResult};
use crate::features::review_queue::models::QueueItem;
use crate::features::safety_metrics::models::SafetyMetrics;

#[async_trait]
pub trait ModerationStore: Send + Sync {
    /// Insert or replace the latest submission of a content item
    async fn save_content(&self, item: &ContentItem) -> Result<()>;

    async fn get_content(&self, content_id: &str) -> Result<Option<ContentItem>>;

    /// Append a result and make it the authoritative one for its content,
    /// demoting the previous authoritative result atomically
    async fn record_result(&self, result: &ModerationResult) -> Result<()>;

    async fn get_result(&self, id: Uuid) -> Result<Option<ModerationResult>>;

    async fn authoritative_result(&self, content_id: &str) -> Result<Option<ModerationResult>>;

    /// All results for a content item, oldest first
    async fn result_history(&self, content_id: &str) -> Result<Vec<ModerationResult>>;

    async fn insert_queue_item(&self, item: &QueueItem) -> Result<()>;

    async fn update_queue_item(&self, item: &QueueItem) -> Result<()>;

    /// Record a reviewer's result and the reviewed queue item as one unit
    async fn record_review(&self, result: &ModerationResult, item: &QueueItem) -> Result<()>;

    /// Queue items for a content item, oldest first
    async fn queue_items_for_content(&self, content_id: &str) -> Result<Vec<QueueItem>>;

    /// One content type's queue in enqueue order
    async fn list_queue(&self, content_type: ContentType, pending_only: bool)
        -> Result<Vec<QueueItem>>;

    async fn pending_count(&self, content_type: ContentType) -> Result<i64>;

    async fn get_metrics(&self, user_id: &str) -> Result<Option<SafetyMetrics>>;

    async fn save_metrics(&self, metrics: &SafetyMetrics) -> Result<()>;

    async fn insert_appeal(&self, appeal: &Appeal) -> Result<()>;

    async fn appeals_for_result(&self, moderation_id: Uuid) -> Result<Vec<Appeal>>;

    /// A user's appeals, newest first
    async fn appeals_by_user(&self, user_id: &str) -> Result<Vec<Appeal>>;
}
