//! Session repository - persistence for bearer-token sessions.
//!
//! Sessions are durable rows so logout can invalidate them server-side
//! and any worker in the pool can resolve a token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::entities::session::{ActiveModel, Entity as SessionEntity};
use crate::domain::Session;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session persistence operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by its opaque token
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>>;

    /// Create a session row
    async fn create(
        &self,
        token: String,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session>;

    /// Delete a session by token. Deleting an absent token is not an error
    /// (logout is idempotent; lazy expiry may race).
    async fn delete_by_token(&self, token: &str) -> AppResult<()>;
}

/// SeaORM-backed implementation of [`SessionRepository`].
pub struct SessionStore {
    db: DatabaseConnection,
}

impl SessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        let result = SessionEntity::find_by_id(token.to_string())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(Session::from))
    }

    async fn create(
        &self,
        token: String,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let active_model = ActiveModel {
            token: Set(token),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Session::from(model))
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<()> {
        SessionEntity::delete_by_id(token.to_string())
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        // rows_affected == 0 is fine: the row may already be gone.
        Ok(())
    }
}
