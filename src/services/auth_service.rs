//! Authentication service.
//!
//! Sessions are opaque 32-byte tokens stored server-side, so logout
//! actually invalidates the credential and any worker can resolve it.
//! Password hashing lives in the domain Password value object.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::RngCore;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, SESSION_TOKEN_BYTES, SIGNUP_ROLES};
use crate::domain::{Identity, Password, Session, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Successful login: the user plus the freshly minted session.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub user: User,
}

/// Authentication operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new buyer or seller account.
    async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
        role: String,
    ) -> AppResult<User>;

    /// Verify credentials and mint a session.
    async fn login(&self, email: String, password: String) -> AppResult<LoginOutcome>;

    /// Invalidate a session server-side. Idempotent: an unknown or
    /// already-deleted token still succeeds.
    async fn logout(&self, token: &str) -> AppResult<()>;

    /// The authenticated user's own record.
    async fn whoami(&self, user_id: Uuid) -> AppResult<User>;

    /// Resolve a bearer token to an identity.
    ///
    /// `None` means unauthenticated (absent, unknown or expired token);
    /// an expired session row is deleted on the way out. Storage failures
    /// propagate as errors, never as `None`.
    async fn resolve_session(&self, token: &str) -> AppResult<Option<Identity>>;
}

/// Generate an opaque high-entropy session token.
fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
        role: String,
    ) -> AppResult<User> {
        // No self-service admin accounts.
        if !SIGNUP_ROLES.contains(&role.as_str()) {
            return Err(AppError::validation("Role must be 'buyer' or 'seller'"));
        }
        let role = UserRole::parse(&role)
            .ok_or_else(|| AppError::validation("Role must be 'buyer' or 'seller'"))?;

        let password_hash = Password::new(&password)?.into_string();

        // Uniqueness check and insert in one transaction.
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if ctx.users().find_by_email(&email).await?.is_some() {
                        return Err(AppError::AlreadyExists("User".to_string()));
                    }
                    ctx.users().create(name, email, password_hash, role).await
                })
            })
            .await
    }

    async fn login(&self, email: String, password: String) -> AppResult<LoginOutcome> {
        let user_result = self.uow.users().find_by_email(&email).await?;

        // SECURITY: verify against a dummy hash when the user is unknown,
        // so response timing does not enumerate valid emails.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Safe to unwrap since we verified user_exists is true
        let user = user_result.unwrap();
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.config.session_ttl_hours);

        let session = self
            .uow
            .sessions()
            .create(token, user.id, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome { session, user })
    }

    async fn logout(&self, token: &str) -> AppResult<()> {
        self.uow.sessions().delete_by_token(token).await
    }

    async fn whoami(&self, user_id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(user_id).await?.ok_or_not_found()
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<Identity>> {
        let session = match self.uow.sessions().find_by_token(token).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        // Lazy expiry: the stale row goes away on the access that finds it.
        if session.is_expired(Utc::now()) {
            self.uow.sessions().delete_by_token(token).await?;
            return Ok(None);
        }

        let user = match self.uow.users().find_by_id(session.user_id).await? {
            Some(user) => user,
            None => {
                // Session for a user that no longer exists.
                self.uow.sessions().delete_by_token(token).await?;
                return Ok(None);
            }
        };

        Ok(Some(Identity {
            user_id: user.id,
            role: user.role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_and_high_entropy() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), SESSION_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
