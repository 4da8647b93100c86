use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
};
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::core::error::Result;
use crate::features::auth::guards::RequireModerator;
use crate::features::notifications::models::ModerationEvent;
use crate::features::notifications::services::NotificationService;

/// Stream review queue events to a moderator
#[utoipa::path(
    get,
    path = "/api/moderation/events",
    responses(
        (status = 200, description = "SSE stream of item-enqueued and item-resolved events", content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator access required")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn stream_events(
    RequireModerator(user): RequireModerator,
    State(service): State<Arc<NotificationService>>,
) -> Result<Response> {
    let events = service.subscribe();
    let (tx, rx) = mpsc::channel::<Event>(32);
    let subscriber = user.sub.clone();

    tracing::info!(%subscriber, "Moderator subscribed to queue events");

    tokio::spawn(forward_events(events, tx, subscriber));

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    );

    Ok(sse.into_response())
}

/// Relay broadcast events into one client's SSE channel until either side
/// goes away. Returning drops the broadcast receiver.
async fn forward_events(
    mut events: broadcast::Receiver<ModerationEvent>,
    tx: mpsc::Sender<Event>,
    subscriber: String,
) {
    loop {
        let received = tokio::select! {
            _ = tx.closed() => break,
            received = events.recv() => received,
        };
        let event = match received {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(%subscriber, skipped, "Queue event subscriber lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let sse = match Event::default().event(event.name()).json_data(event.item()) {
            Ok(sse) => sse,
            Err(e) => {
                tracing::error!("Failed to encode queue event: {}", e);
                continue;
            }
        };

        if tx.send(sse).await.is_err() {
            break;
        }
    }
    tracing::debug!(%subscriber, "Queue event subscriber disconnected");
}
