mod moderation_service;
pub mod scoring;

pub use moderation_service::ModerationService;
