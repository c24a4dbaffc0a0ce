//! KYC submission repository - read side.
//!
//! Submissions themselves are created through the Unit of Work so that the
//! submission row and its attachment metadata commit together.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::kyc_submission::{Column, Entity as KycEntity};
use crate::domain::KycSubmission;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// KYC submission read operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait KycRepository: Send + Sync {
    /// The user's most recent submission, by submission time.
    async fn find_latest_for_user(&self, user_id: Uuid) -> AppResult<Option<KycSubmission>>;
}

/// SeaORM-backed implementation of [`KycRepository`].
pub struct KycStore {
    db: DatabaseConnection,
}

impl KycStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KycRepository for KycStore {
    async fn find_latest_for_user(&self, user_id: Uuid) -> AppResult<Option<KycSubmission>> {
        let result = KycEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::SubmittedAt)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(KycSubmission::from))
    }
}
