//! Payment-method directory and seller withdrawal methods.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Identity, PaymentMethod, UserRole, WithdrawalMethod};
use crate::errors::AppResult;
use crate::infra::{Cache, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Payment directory operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// All active payment methods, stable order.
    async fn list_methods(&self) -> AppResult<Vec<PaymentMethod>>;

    /// The seller's configured withdrawal method, if any.
    async fn get_withdrawal_method(&self, identity: Identity)
        -> AppResult<Option<WithdrawalMethod>>;

    /// Configure the seller's withdrawal method (upsert).
    async fn set_withdrawal_method(
        &self,
        identity: Identity,
        method_code: String,
        details: serde_json::Value,
    ) -> AppResult<WithdrawalMethod>;
}

/// Concrete implementation backed by the database with a short-TTL
/// directory cache.
pub struct PaymentDirectory<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Cache,
}

impl<U: UnitOfWork> PaymentDirectory<U> {
    pub fn new(uow: Arc<U>, cache: Cache) -> Self {
        Self { uow, cache }
    }
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentDirectory<U> {
    async fn list_methods(&self) -> AppResult<Vec<PaymentMethod>> {
        // A cache failure degrades to a database read; reference data must
        // stay servable while Redis is down.
        match self.cache.get_payment_methods().await {
            Ok(Some(methods)) => return Ok(methods),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Payment-method cache read failed"),
        }

        let methods = self.uow.payment_methods().list_active().await?;

        if let Err(e) = self.cache.set_payment_methods(&methods).await {
            tracing::warn!(error = %e, "Payment-method cache write failed");
        }

        Ok(methods)
    }

    async fn get_withdrawal_method(
        &self,
        identity: Identity,
    ) -> AppResult<Option<WithdrawalMethod>> {
        identity.require_role(&[UserRole::Seller])?;
        self.uow
            .withdrawal_methods()
            .find_active_for_user(identity.user_id)
            .await
    }

    async fn set_withdrawal_method(
        &self,
        identity: Identity,
        method_code: String,
        details: serde_json::Value,
    ) -> AppResult<WithdrawalMethod> {
        identity.require_role(&[UserRole::Seller])?;
        self.uow
            .withdrawal_methods()
            .upsert(identity.user_id, method_code, details)
            .await
    }
}
