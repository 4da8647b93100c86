mod appeal_service;

pub use appeal_service::AppealService;
