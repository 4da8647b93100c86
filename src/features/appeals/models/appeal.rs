use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Appeal status. Resolution happens outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "appeal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    Pending,
    Upheld,
    Overturned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Appeal {
    pub id: Uuid,
    pub moderation_id: Uuid,
    pub user_id: String,
    pub content_id: String,
    pub reason: String,
    pub submitted_at: DateTime<Utc>,
    pub status: AppealStatus,
}

#[derive(Debug, Clone)]
pub struct CreateAppeal {
    pub moderation_id: Uuid,
    pub user_id: String,
    pub content_id: String,
    pub reason: String,
}

impl From<CreateAppeal> for Appeal {
    fn from(new: CreateAppeal) -> Self {
        Self {
            id: Uuid::now_v7(),
            moderation_id: new.moderation_id,
            user_id: new.user_id,
            content_id: new.content_id,
            reason: new.reason,
            submitted_at: Utc::now(),
            status: AppealStatus::Pending,
        }
    }
}
