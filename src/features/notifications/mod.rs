//! Review queue notifications.
//!
//! Every enqueue and resolution is broadcast to connected moderators over
//! server-sent events. Slow subscribers drop old events instead of slowing
//! the moderation pipeline down.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/moderation/events` | SSE stream of queue events (moderator) |

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NotificationService;
