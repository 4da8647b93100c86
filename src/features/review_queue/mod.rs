//! Human review queues.
//!
//! One queue per content type. Items are never deleted; resolving marks
//! them reviewed and writes a superseding moderation result.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/moderation/queue/{content_type}?status=pending\|all` | List a queue |
//! | GET | `/api/moderation/queue/stats` | Pending counts per queue |
//! | POST | `/api/moderation/queue/items/{content_id}/resolve` | Record a moderator decision |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ReviewQueueService;
