//! Role-based authorization guards.
//!
//! Authors can submit content, read their own outcomes and appeal. Moderators
//! (and admins) work the human review queue and subscribe to queue events.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for moderator-level access ("moderator" or "admin" role).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireModerator(user): RequireModerator) { ... }
/// ```
pub struct RequireModerator(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireModerator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.has_moderator_access() {
            return Err(AppError::Forbidden("Moderator access required".to_string()));
        }

        Ok(RequireModerator(user.clone()))
    }
}
