mod moderation_event;

pub use moderation_event::ModerationEvent;
