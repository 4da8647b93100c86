use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::moderation::dtos::ModerationResultDto;
use crate::features::moderation::models::ContentType;
use crate::features::review_queue::models::{QueueItem, ReviewOutcome};

/// Which items a queue listing returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatusFilter {
    #[default]
    Pending,
    All,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct QueueListQuery {
    /// `pending` (default) or `all`, which includes reviewed items
    #[serde(default)]
    pub status: QueueStatusFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemResponseDto {
    pub id: Uuid,
    pub content_id: String,
    pub moderation_id: Uuid,
    pub content_type: ContentType,
    pub enqueued_at: DateTime<Utc>,
    pub initial_assessment: String,
    pub reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_result: Option<ReviewOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl From<QueueItem> for QueueItemResponseDto {
    fn from(item: QueueItem) -> Self {
        Self {
            id: item.id,
            content_id: item.content_id,
            moderation_id: item.moderation_id,
            content_type: item.content_type,
            enqueued_at: item.enqueued_at,
            initial_assessment: item.initial_assessment,
            reviewed: item.reviewed,
            review_result: item.review_result,
            reviewed_at: item.reviewed_at,
            reviewed_by: item.reviewed_by,
            review_notes: item.review_notes,
        }
    }
}

/// Moderator decision on a queued item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQueueItemDto {
    pub decision: ReviewOutcome,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQueueItemResponseDto {
    pub queue_item: QueueItemResponseDto,
    pub result: ModerationResultDto,
}

/// Unreviewed item counts per queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatsDto {
    pub text: i64,
    pub image: i64,
    pub video: i64,
    pub audio: i64,
    pub total: i64,
}

impl QueueStatsDto {
    pub fn set(&mut self, content_type: ContentType, pending: i64) {
        match content_type {
            ContentType::Text => self.text = pending,
            ContentType::Image => self.image = pending,
            ContentType::Video => self.video = pending,
            ContentType::Audio => self.audio = pending,
        }
        self.total = self.text + self.image + self.video + self.audio;
    }
}
