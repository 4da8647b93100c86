use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::appeals::models::{Appeal, AppealStatus};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileAppealDto {
    /// The moderation result being appealed
    pub moderation_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "Reason must be 1-2000 characters"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppealResponseDto {
    pub id: Uuid,
    pub moderation_id: Uuid,
    pub content_id: String,
    pub reason: String,
    pub submitted_at: DateTime<Utc>,
    pub status: AppealStatus,
}

impl From<Appeal> for AppealResponseDto {
    fn from(appeal: Appeal) -> Self {
        Self {
            id: appeal.id,
            moderation_id: appeal.moderation_id,
            content_id: appeal.content_id,
            reason: appeal.reason,
            submitted_at: appeal.submitted_at,
            status: appeal.status,
        }
    }
}
