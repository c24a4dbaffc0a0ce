//! Payment-method directory and seller withdrawal-method repositories.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::payment_method::{
    Column as MethodColumn, Entity as PaymentMethodEntity,
};
use super::entities::withdrawal_method::{
    ActiveModel as WithdrawalActiveModel, Column as WithdrawalColumn,
    Entity as WithdrawalMethodEntity,
};
use crate::domain::{PaymentMethod, WithdrawalMethod};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to the payment-method reference table.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// All active methods, stable order by the serial id.
    async fn list_active(&self) -> AppResult<Vec<PaymentMethod>>;

    /// Look up an active method by code.
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<PaymentMethod>>;
}

/// Seller withdrawal-method persistence: single active row per seller,
/// upsert semantics.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WithdrawalMethodRepository: Send + Sync {
    /// The seller's active withdrawal method, if configured.
    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<WithdrawalMethod>>;

    /// Update the existing row or insert a new one.
    async fn upsert(
        &self,
        user_id: Uuid,
        method_code: String,
        details: serde_json::Value,
    ) -> AppResult<WithdrawalMethod>;
}

/// SeaORM-backed implementation of [`PaymentMethodRepository`].
pub struct PaymentMethodStore {
    db: DatabaseConnection,
}

impl PaymentMethodStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentMethodRepository for PaymentMethodStore {
    async fn list_active(&self) -> AppResult<Vec<PaymentMethod>> {
        let models = PaymentMethodEntity::find()
            .filter(MethodColumn::Active.eq(true))
            .order_by_asc(MethodColumn::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(models.into_iter().map(PaymentMethod::from).collect())
    }

    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<PaymentMethod>> {
        let result = PaymentMethodEntity::find()
            .filter(MethodColumn::Code.eq(code))
            .filter(MethodColumn::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(PaymentMethod::from))
    }
}

/// SeaORM-backed implementation of [`WithdrawalMethodRepository`].
pub struct WithdrawalMethodStore {
    db: DatabaseConnection,
}

impl WithdrawalMethodStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WithdrawalMethodRepository for WithdrawalMethodStore {
    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<WithdrawalMethod>> {
        let result = WithdrawalMethodEntity::find_by_id(user_id)
            .filter(WithdrawalColumn::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(WithdrawalMethod::from))
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        method_code: String,
        details: serde_json::Value,
    ) -> AppResult<WithdrawalMethod> {
        let now = Utc::now();
        let existing = WithdrawalMethodEntity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        let model = match existing {
            Some(model) => {
                let mut active: WithdrawalActiveModel = model.into_active_model();
                active.method_code = Set(method_code);
                active.details = Set(details);
                active.active = Set(true);
                active.updated_at = Set(now);
                active.update(&self.db).await.map_err(AppError::from)?
            }
            None => {
                let active = WithdrawalActiveModel {
                    user_id: Set(user_id),
                    method_code: Set(method_code),
                    details: Set(details),
                    active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                active.insert(&self.db).await.map_err(AppError::from)?
            }
        };

        Ok(WithdrawalMethod::from(model))
    }
}
