mod queue_item;

pub use queue_item::{CreateQueueItem, QueueItem, ReviewOutcome, SUPERSEDED_NOTE};
