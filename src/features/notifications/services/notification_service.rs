use tokio::sync::broadcast;

use crate::features::notifications::models::ModerationEvent;

/// Fan-out of review queue events to any number of subscribers.
///
/// Publishing never blocks and never fails the caller; a subscriber that
/// falls more than `buffer` events behind loses the oldest ones.
pub struct NotificationService {
    sender: broadcast::Sender<ModerationEvent>,
}

impl NotificationService {
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: ModerationEvent) {
        let name = event.name();
        let content_id = event.item().content_id.clone();
        // No subscribers is not an error
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = name, %content_id, receivers, "Published moderation event")
            }
            Err(_) => tracing::debug!(event = name, %content_id, "No moderation event subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ModerationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::moderation::models::ContentType;
    use crate::features::review_queue::dtos::QueueItemResponseDto;
    use crate::features::review_queue::models::{CreateQueueItem, QueueItem};
    use tokio::sync::broadcast::error::RecvError;
    use uuid::Uuid;

    fn event(content_id: &str) -> ModerationEvent {
        let item: QueueItem = CreateQueueItem {
            content_id: content_id.to_string(),
            moderation_id: Uuid::now_v7(),
            content_type: ContentType::Image,
            initial_assessment: "unsure".to_string(),
        }
        .into();
        ModerationEvent::ItemEnqueued(QueueItemResponseDto::from(item))
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_events() {
        let service = NotificationService::new(16);
        let mut first = service.subscribe();
        let mut second = service.subscribe();
        assert_eq!(service.subscriber_count(), 2);

        service.publish(event("post-1"));

        assert_eq!(first.recv().await.unwrap().item().content_id, "post-1");
        assert_eq!(second.recv().await.unwrap().item().content_id, "post-1");
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let service = NotificationService::new(4);
        service.publish(event("post-1"));
        assert_eq!(service.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_without_blocking_publisher() {
        let service = NotificationService::new(2);
        let mut slow = service.subscribe();

        for i in 0..5 {
            service.publish(event(&format!("post-{}", i)));
        }

        assert!(matches!(slow.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(slow.recv().await.unwrap().item().content_id, "post-3");
    }

    #[test]
    fn test_event_wire_shape() {
        let value = serde_json::to_value(event("post-7")).unwrap();
        assert_eq!(value["event"], "item-enqueued");
        assert_eq!(value["item"]["contentId"], "post-7");
    }
}
