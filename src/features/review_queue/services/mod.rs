mod review_queue_service;

pub use review_queue_service::ReviewQueueService;
