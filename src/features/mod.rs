pub mod appeals;
pub mod auth;
pub mod moderation;
pub mod notifications;
pub mod review_queue;
pub mod safety_metrics;
