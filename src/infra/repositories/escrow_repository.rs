//! Escrow repository - read-side queries.
//!
//! All party-scoped lookups filter on buyer/seller id in the query itself,
//! so an escrow owned by someone else is simply absent ("not found"), never
//! "forbidden". State-changing writes go through the Unit of Work's
//! transactional repositories instead.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::entities::escrow::{Column, Entity as EscrowEntity};
use super::entities::transaction::{Column as TxColumn, Entity as TransactionEntity};
use super::entities::user::{Column as UserColumn, Entity as UserEntity};
use crate::domain::{AuditEntry, Escrow, EscrowStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// An escrow list row joined with the counterparty's display name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EscrowListItem {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub escrow: Escrow,
    /// Seller name for buyer listings, buyer name for seller listings.
    pub counterparty_name: Option<String>,
}

/// Optional filters for escrow listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscrowFilter {
    pub status: Option<EscrowStatus>,
    pub limit: u64,
    pub offset: u64,
}

/// Escrow read operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EscrowRepository: Send + Sync {
    /// Find an escrow visible to the given party (buyer or assigned seller).
    async fn find_for_party(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Escrow>>;

    /// Find any escrow (admin use).
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Escrow>>;

    /// List a buyer's escrows, newest first.
    async fn list_for_buyer(&self, buyer_id: Uuid, filter: EscrowFilter)
        -> AppResult<Vec<EscrowListItem>>;

    /// List a seller's assigned escrows, newest first.
    async fn list_for_seller(
        &self,
        seller_id: Uuid,
        filter: EscrowFilter,
    ) -> AppResult<Vec<EscrowListItem>>;

    /// List every escrow (admin use), newest first.
    async fn list_all(&self, filter: EscrowFilter) -> AppResult<Vec<Escrow>>;

    /// The escrow's audit trail, oldest first.
    async fn audit_log(&self, escrow_id: Uuid) -> AppResult<Vec<AuditEntry>>;
}

/// SeaORM-backed implementation of [`EscrowRepository`].
pub struct EscrowStore {
    db: DatabaseConnection,
}

impl EscrowStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_names(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = UserEntity::find()
            .filter(UserColumn::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(users.into_iter().map(|u| (u.id, u.name)).collect())
    }

    async fn list_filtered(
        &self,
        condition: Condition,
        filter: EscrowFilter,
    ) -> AppResult<Vec<Escrow>> {
        let mut query = EscrowEntity::find().filter(condition);
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_desc(Column::CreatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(models.into_iter().map(Escrow::from).collect())
    }
}

#[async_trait]
impl EscrowRepository for EscrowStore {
    async fn find_for_party(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Escrow>> {
        let result = EscrowEntity::find_by_id(id)
            .filter(
                Condition::any()
                    .add(Column::BuyerId.eq(user_id))
                    .add(Column::SellerId.eq(user_id)),
            )
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(Escrow::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Escrow>> {
        let result = EscrowEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(Escrow::from))
    }

    async fn list_for_buyer(
        &self,
        buyer_id: Uuid,
        filter: EscrowFilter,
    ) -> AppResult<Vec<EscrowListItem>> {
        let escrows = self
            .list_filtered(Condition::all().add(Column::BuyerId.eq(buyer_id)), filter)
            .await?;

        let names = self
            .fetch_names(escrows.iter().filter_map(|e| e.seller_id).collect())
            .await?;

        Ok(escrows
            .into_iter()
            .map(|escrow| {
                let counterparty_name =
                    escrow.seller_id.and_then(|id| names.get(&id).cloned());
                EscrowListItem {
                    escrow,
                    counterparty_name,
                }
            })
            .collect())
    }

    async fn list_for_seller(
        &self,
        seller_id: Uuid,
        filter: EscrowFilter,
    ) -> AppResult<Vec<EscrowListItem>> {
        let escrows = self
            .list_filtered(Condition::all().add(Column::SellerId.eq(seller_id)), filter)
            .await?;

        let names = self
            .fetch_names(escrows.iter().map(|e| e.buyer_id).collect())
            .await?;

        Ok(escrows
            .into_iter()
            .map(|escrow| {
                let counterparty_name = names.get(&escrow.buyer_id).cloned();
                EscrowListItem {
                    escrow,
                    counterparty_name,
                }
            })
            .collect())
    }

    async fn list_all(&self, filter: EscrowFilter) -> AppResult<Vec<Escrow>> {
        self.list_filtered(Condition::all(), filter).await
    }

    async fn audit_log(&self, escrow_id: Uuid) -> AppResult<Vec<AuditEntry>> {
        let models = TransactionEntity::find()
            .filter(TxColumn::EscrowId.eq(escrow_id))
            .order_by_asc(TxColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(models.into_iter().map(AuditEntry::from).collect())
    }
}
