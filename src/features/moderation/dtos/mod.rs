mod moderation_dto;

pub use moderation_dto::{ContentOutcomeDto, ModerationResultDto, SubmitContentDto};
