//! Session entity and authenticated identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;
use crate::errors::{AppError, AppResult};

/// A server-issued credential binding an opaque token to a user for a
/// bounded time. Multiple concurrent sessions per user are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The authenticated caller, as resolved from a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Identity {
    /// Role guard: hard precondition before any state-mutating operation.
    ///
    /// Fails with `Forbidden` when the identity's role is not in
    /// `allowed_roles`. Absence of an identity is handled upstream as
    /// `Unauthenticated`.
    pub fn require_role(&self, allowed_roles: &[UserRole]) -> AppResult<&Self> {
        if allowed_roles.contains(&self.role) {
            Ok(self)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let session = Session {
            token: "t".into(),
            user_id: Uuid::new_v4(),
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }

    #[test]
    fn role_guard_rejects_wrong_role() {
        let identity = Identity {
            user_id: Uuid::new_v4(),
            role: UserRole::Seller,
        };
        assert!(identity.require_role(&[UserRole::Seller]).is_ok());
        assert!(matches!(
            identity.require_role(&[UserRole::Buyer, UserRole::Admin]),
            Err(AppError::Forbidden)
        ));
    }
}
