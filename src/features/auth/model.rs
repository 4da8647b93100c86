use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_MODERATOR};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject claim, used as the platform user id
    pub sub: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Moderators and admins may work the review queue
    pub fn has_moderator_access(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_MODERATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderator_access_by_role() {
        let member = AuthenticatedUser {
            sub: "u1".to_string(),
            roles: vec!["member".to_string()],
        };
        assert!(!member.has_moderator_access());

        let moderator = AuthenticatedUser {
            sub: "u2".to_string(),
            roles: vec![ROLE_MODERATOR.to_string()],
        };
        assert!(moderator.has_moderator_access());

        let admin = AuthenticatedUser {
            sub: "u3".to_string(),
            roles: vec![ROLE_ADMIN.to_string()],
        };
        assert!(admin.has_moderator_access());
    }
}
