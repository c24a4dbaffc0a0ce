//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Caching (Redis)
//! - Blob storage for attachments
//! - Unit of Work for transaction management

pub mod blobs;
pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use blobs::FileStore;
pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    EscrowFilter, EscrowListItem, EscrowRepository, EscrowStore, KycRepository, KycStore,
    PaymentMethodRepository, PaymentMethodStore, SessionRepository, SessionStore, UserRepository,
    UserStore, WithdrawalMethodRepository, WithdrawalMethodStore,
};
pub use unit_of_work::{
    NewEscrow, Persistence, TransactionContext, TxAuditRepository, TxEscrowRepository,
    TxFileRepository, TxKycRepository, TxUserRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockEscrowRepository, MockKycRepository, MockPaymentMethodRepository, MockSessionRepository,
    MockUserRepository, MockWithdrawalMethodRepository,
};
