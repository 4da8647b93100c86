//! Per-user safety metrics.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/safety-metrics/me` | Caller's own metrics |
//! | GET | `/api/safety-metrics/{user_id}` | Any user's metrics (moderator) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SafetyMetricsService;
