//! Content moderation pipeline.
//!
//! A submission is classified (external classifier, with the lexical
//! matcher as backstop), scored with roasting leniency for audio and video,
//! and decided. Ambiguous items go to the human review queue; everything is
//! recorded as an append-only history per content item.
//!
//! ## Decision table
//!
//! | Overall score | Review flag | Decision |
//! |---------------|-------------|----------|
//! | > 0.8 | any | approved |
//! | < 0.3 | any | rejected |
//! | otherwise | set | pending_review |
//! | otherwise | clear | approved |
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/moderation/submissions` | Submit content |
//! | GET | `/api/moderation/contents/{content_id}` | Current outcome (author or moderator) |
//! | GET | `/api/moderation/contents/{content_id}/history` | All results (moderator) |
//! | GET | `/api/moderation/results/{id}` | One result (moderator) |

pub mod classifiers;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ModerationService;
