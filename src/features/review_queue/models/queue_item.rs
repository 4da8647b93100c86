use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::moderation::models::{ContentType, Decision};

/// Terminal outcome a moderator picks for a queued item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "review_outcome", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approved,
    Rejected,
    AgeRestricted,
}

impl From<ReviewOutcome> for Decision {
    fn from(outcome: ReviewOutcome) -> Self {
        match outcome {
            ReviewOutcome::Approved => Decision::Approved,
            ReviewOutcome::Rejected => Decision::Rejected,
            ReviewOutcome::AgeRestricted => Decision::AgeRestricted,
        }
    }
}

/// A content item awaiting (or having received) a human decision.
/// Never deleted; reviewing marks it and keeps it as audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QueueItem {
    pub id: Uuid,
    pub content_id: String,
    pub moderation_id: Uuid,
    pub content_type: ContentType,
    pub enqueued_at: DateTime<Utc>,
    pub initial_assessment: String,
    pub reviewed: bool,
    pub review_result: Option<ReviewOutcome>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateQueueItem {
    pub content_id: String,
    pub moderation_id: Uuid,
    pub content_type: ContentType,
    pub initial_assessment: String,
}

impl From<CreateQueueItem> for QueueItem {
    fn from(new: CreateQueueItem) -> Self {
        Self {
            id: Uuid::now_v7(),
            content_id: new.content_id,
            moderation_id: new.moderation_id,
            content_type: new.content_type,
            enqueued_at: Utc::now(),
            initial_assessment: new.initial_assessment,
            reviewed: false,
            review_result: None,
            reviewed_at: None,
            reviewed_by: None,
            review_notes: None,
        }
    }
}

impl QueueItem {
    pub fn mark_reviewed(&mut self, outcome: ReviewOutcome, reviewer: &str, notes: Option<String>) {
        self.reviewed = true;
        self.review_result = Some(outcome);
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = Some(reviewer.to_string());
        self.review_notes = notes;
    }

    /// Point an open item at a newer pending result of the same content
    pub fn retarget(&mut self, moderation_id: Uuid, initial_assessment: String) {
        self.moderation_id = moderation_id;
        self.initial_assessment = initial_assessment;
    }

    /// Close an open item whose content was resubmitted and decided
    /// automatically; no moderator outcome is recorded.
    pub fn supersede(&mut self) {
        self.reviewed = true;
        self.review_result = None;
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = None;
        self.review_notes = Some(SUPERSEDED_NOTE.to_string());
    }
}

pub const SUPERSEDED_NOTE: &str = "Superseded by a resubmission";
