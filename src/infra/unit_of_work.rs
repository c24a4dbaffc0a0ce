//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and transaction management. Escrow
//! transitions run their read-validate-write sequence entirely inside one
//! transaction here, with the escrow row locked, so concurrent attempts on
//! the same escrow serialize and the audit entry commits with the status
//! change or not at all.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{escrow, escrow_file, kyc_submission, transaction, user};
use super::repositories::{
    EscrowRepository, EscrowStore, KycRepository, KycStore, PaymentMethodRepository,
    PaymentMethodStore, SessionRepository, SessionStore, UserRepository, UserStore,
    WithdrawalMethodRepository, WithdrawalMethodStore,
};
use crate::domain::{
    AuditEntry, AuditType, Escrow, EscrowStatus, FilePurpose, FileRecord, KycStatus,
    KycSubmission, User, UserRole,
};
use crate::errors::{AppError, AppResult};

/// Fields needed to insert a new escrow row.
#[derive(Debug, Clone)]
pub struct NewEscrow {
    pub buyer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_details: Option<serde_json::Value>,
    pub agreement: Option<String>,
}

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction
/// management. Not directly mockable because of the generic `transaction`
/// method; services that depend on it are mocked at the service-trait level.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn sessions(&self) -> Arc<dyn SessionRepository>;
    fn escrows(&self) -> Arc<dyn EscrowRepository>;
    fn payment_methods(&self) -> Arc<dyn PaymentMethodRepository>;
    fn withdrawal_methods(&self) -> Arc<dyn WithdrawalMethodRepository>;
    fn kyc(&self) -> Arc<dyn KycRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction commits on success and rolls back on error.
    /// ReadCommitted isolation; per-escrow serialization comes from the
    /// row lock taken by [`TxEscrowRepository::find_for_update`].
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access within one open transaction.
///
/// The context borrows the transaction so no repository handle can outlive
/// the commit or rollback.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn escrows(&self) -> TxEscrowRepository<'_> {
        TxEscrowRepository { txn: self.txn }
    }

    pub fn audit(&self) -> TxAuditRepository<'_> {
        TxAuditRepository { txn: self.txn }
    }

    pub fn files(&self) -> TxFileRepository<'_> {
        TxFileRepository { txn: self.txn }
    }

    pub fn kyc(&self) -> TxKycRepository<'_> {
        TxKycRepository { txn: self.txn }
    }
}

/// Concrete implementation of [`UnitOfWork`].
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    session_repo: Arc<SessionStore>,
    escrow_repo: Arc<EscrowStore>,
    payment_method_repo: Arc<PaymentMethodStore>,
    withdrawal_method_repo: Arc<WithdrawalMethodStore>,
    kyc_repo: Arc<KycStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            session_repo: Arc::new(SessionStore::new(db.clone())),
            escrow_repo: Arc::new(EscrowStore::new(db.clone())),
            payment_method_repo: Arc::new(PaymentMethodStore::new(db.clone())),
            withdrawal_method_repo: Arc::new(WithdrawalMethodStore::new(db.clone())),
            kyc_repo: Arc::new(KycStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.session_repo.clone()
    }

    fn escrows(&self) -> Arc<dyn EscrowRepository> {
        self.escrow_repo.clone()
    }

    fn payment_methods(&self) -> Arc<dyn PaymentMethodRepository> {
        self.payment_method_repo.clone()
    }

    fn withdrawal_methods(&self) -> Arc<dyn WithdrawalMethodRepository> {
        self.withdrawal_method_repo.clone()
    }

    fn kyc(&self) -> Arc<dyn KycRepository> {
        self.kyc_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user repository, used by signup so the uniqueness
/// check and the insert see the same state.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = user::Entity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(User::from))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.txn)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(User::from))
    }

    pub async fn create(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: UserRole,
    ) -> AppResult<User> {
        let active_model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }
}

/// Transaction-aware escrow repository.
///
/// `find_for_update` variants take a `FOR UPDATE` row lock, so the status
/// read here stays valid until the surrounding transaction commits.
pub struct TxEscrowRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEscrowRepository<'a> {
    /// Lock and load an escrow regardless of party (admin use).
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<Escrow>> {
        let result = escrow::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(Escrow::from))
    }

    /// Lock and load an escrow visible to the given party. A non-party
    /// caller gets `None`, indistinguishable from an absent row.
    pub async fn find_for_party_for_update(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Escrow>> {
        let result = escrow::Entity::find_by_id(id)
            .filter(
                Condition::any()
                    .add(escrow::Column::BuyerId.eq(user_id))
                    .add(escrow::Column::SellerId.eq(user_id)),
            )
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;
        Ok(result.map(Escrow::from))
    }

    /// Insert a new escrow in status `pending`.
    pub async fn create(&self, new: NewEscrow) -> AppResult<Escrow> {
        let now = Utc::now();
        let active_model = escrow::ActiveModel {
            id: Set(Uuid::new_v4()),
            buyer_id: Set(new.buyer_id),
            seller_id: Set(new.seller_id),
            amount: Set(new.amount),
            payment_method: Set(new.payment_method),
            payment_details: Set(new.payment_details),
            deposit_address: Set(None),
            status: Set(EscrowStatus::Pending.as_str().to_string()),
            agreement: Set(new.agreement),
            seller_terms: Set(None),
            seller_deliverables: Set(None),
            buyer_release_note: Set(None),
            seller_reject_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            delivered_at: Set(None),
            released_at: Set(None),
            seller_request_time: Set(None),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(Escrow::from(model))
    }

    /// Persist the mutable columns of an already-locked escrow.
    ///
    /// `buyer_id`, `amount` and `created_at` never change after creation
    /// and are not written here.
    pub async fn update(&self, escrow: &Escrow) -> AppResult<Escrow> {
        let active_model = escrow::ActiveModel {
            id: Set(escrow.id),
            seller_id: Set(escrow.seller_id),
            payment_method: Set(escrow.payment_method.clone()),
            payment_details: Set(escrow.payment_details.clone()),
            deposit_address: Set(escrow.deposit_address.clone()),
            status: Set(escrow.status.as_str().to_string()),
            seller_terms: Set(escrow.seller_terms.clone()),
            seller_deliverables: Set(escrow.seller_deliverables.clone()),
            buyer_release_note: Set(escrow.buyer_release_note.clone()),
            seller_reject_reason: Set(escrow.seller_reject_reason.clone()),
            updated_at: Set(escrow.updated_at),
            delivered_at: Set(escrow.delivered_at),
            released_at: Set(escrow.released_at),
            seller_request_time: Set(escrow.seller_request_time),
            ..Default::default()
        };

        let model = active_model.update(self.txn).await.map_err(AppError::from)?;
        Ok(Escrow::from(model))
    }
}

/// Append-only audit log writer. Rows are never updated or deleted.
pub struct TxAuditRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAuditRepository<'a> {
    pub async fn append(
        &self,
        escrow_id: Uuid,
        entry_type: AuditType,
        description: String,
    ) -> AppResult<AuditEntry> {
        let active_model = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            escrow_id: Set(escrow_id),
            entry_type: Set(entry_type.as_str().to_string()),
            description: Set(description),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(AuditEntry::from(model))
    }
}

/// Attachment metadata writer. Blobs themselves go to the file store;
/// recording metadata here keeps it atomic with the owning transition.
pub struct TxFileRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxFileRepository<'a> {
    pub async fn record(
        &self,
        escrow_id: Option<Uuid>,
        file_name: String,
        stored_name: String,
        purpose: FilePurpose,
    ) -> AppResult<FileRecord> {
        let active_model = escrow_file::ActiveModel {
            id: Set(Uuid::new_v4()),
            escrow_id: Set(escrow_id),
            file_name: Set(file_name),
            stored_name: Set(stored_name),
            purpose: Set(purpose.as_str().to_string()),
            uploaded_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(FileRecord::from(model))
    }
}

/// KYC submission writer. New submissions always start `pending`.
pub struct TxKycRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxKycRepository<'a> {
    pub async fn create(&self, user_id: Uuid, kyc_type: String) -> AppResult<KycSubmission> {
        let active_model = kyc_submission::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            kyc_type: Set(kyc_type),
            status: Set(KycStatus::Pending.as_str().to_string()),
            admin_note: Set(None),
            submitted_at: Set(Utc::now()),
            reviewed_at: Set(None),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(KycSubmission::from(model))
    }
}
