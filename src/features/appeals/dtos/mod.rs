mod appeal_dto;

pub use appeal_dto::{AppealResponseDto, FileAppealDto};
