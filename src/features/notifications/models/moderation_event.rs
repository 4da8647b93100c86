use serde::Serialize;

use crate::features::review_queue::dtos::QueueItemResponseDto;

/// Review queue change pushed to subscribed moderators
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "item", rename_all = "kebab-case")]
pub enum ModerationEvent {
    ItemEnqueued(QueueItemResponseDto),
    ItemResolved(QueueItemResponseDto),
}

impl ModerationEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            ModerationEvent::ItemEnqueued(_) => "item-enqueued",
            ModerationEvent::ItemResolved(_) => "item-resolved",
        }
    }

    pub fn item(&self) -> &QueueItemResponseDto {
        match self {
            ModerationEvent::ItemEnqueued(item) | ModerationEvent::ItemResolved(item) => item,
        }
    }
}
