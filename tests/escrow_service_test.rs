//! Escrow service unit tests.
//!
//! Role gating, party scoping and input validation, exercised against
//! mock repositories. Transition legality itself is covered by the
//! domain tests.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;
use rust_decimal::Decimal;
use uuid::Uuid;

use vanguard_escrow::domain::{
    AuditEntry, AuditType, Escrow, EscrowStatus, Identity, User, UserRole,
};
use vanguard_escrow::errors::{AppError, AppResult};
use vanguard_escrow::infra::{
    EscrowFilter, EscrowListItem, EscrowRepository, FileStore, KycRepository,
    MockEscrowRepository, MockKycRepository, MockPaymentMethodRepository, MockSessionRepository,
    MockUserRepository, MockWithdrawalMethodRepository, PaymentMethodRepository,
    SessionRepository, TransactionContext, UnitOfWork, UserRepository,
    WithdrawalMethodRepository,
};
use vanguard_escrow::services::{CreateEscrowInput, EscrowManager, EscrowService};

/// Test Unit of Work wrapping mock repositories.
struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    sessions: Arc<MockSessionRepository>,
    escrows: Arc<MockEscrowRepository>,
    payment_methods: Arc<MockPaymentMethodRepository>,
    withdrawal_methods: Arc<MockWithdrawalMethodRepository>,
    kyc: Arc<MockKycRepository>,
}

impl TestUnitOfWork {
    fn new(users: MockUserRepository, escrows: MockEscrowRepository) -> Self {
        Self {
            users: Arc::new(users),
            sessions: Arc::new(MockSessionRepository::new()),
            escrows: Arc::new(escrows),
            payment_methods: Arc::new(MockPaymentMethodRepository::new()),
            withdrawal_methods: Arc::new(MockWithdrawalMethodRepository::new()),
            kyc: Arc::new(MockKycRepository::new()),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.sessions.clone()
    }

    fn escrows(&self) -> Arc<dyn EscrowRepository> {
        self.escrows.clone()
    }

    fn payment_methods(&self) -> Arc<dyn PaymentMethodRepository> {
        self.payment_methods.clone()
    }

    fn withdrawal_methods(&self) -> Arc<dyn WithdrawalMethodRepository> {
        self.withdrawal_methods.clone()
    }

    fn kyc(&self) -> Arc<dyn KycRepository> {
        self.kyc.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            )
                -> Pin<Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        // Transactions need a live connection; not supported in this mock
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

fn manager(users: MockUserRepository, escrows: MockEscrowRepository) -> EscrowManager<TestUnitOfWork> {
    EscrowManager::new(
        Arc::new(TestUnitOfWork::new(users, escrows)),
        FileStore::new("./test-uploads"),
    )
}

fn buyer() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        role: UserRole::Buyer,
    }
}

fn seller() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        role: UserRole::Seller,
    }
}

fn admin() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        role: UserRole::Admin,
    }
}

fn test_escrow(buyer_id: Uuid, status: EscrowStatus) -> Escrow {
    Escrow {
        id: Uuid::new_v4(),
        buyer_id,
        seller_id: None,
        amount: Decimal::new(25_000, 2),
        payment_method: "USDT_TRC20".to_string(),
        payment_details: None,
        deposit_address: None,
        status,
        agreement: None,
        seller_terms: None,
        seller_deliverables: None,
        buyer_release_note: None,
        seller_reject_reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        delivered_at: None,
        released_at: None,
        seller_request_time: None,
    }
}

fn create_input(amount: Decimal) -> CreateEscrowInput {
    CreateEscrowInput {
        seller_id: None,
        amount,
        payment_method: "USDT_TRC20".to_string(),
        preferred_wallet: None,
        agreement: None,
    }
}

#[tokio::test]
async fn only_buyers_may_open_escrows() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .create_escrow(seller(), create_input(Decimal::new(100, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn a_non_positive_amount_is_rejected() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .create_escrow(buyer(), create_input(Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn naming_an_unknown_seller_is_rejected() {
    let seller_id = Uuid::new_v4();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .with(eq(seller_id))
        .returning(|_| Ok(None));

    let service = manager(users, MockEscrowRepository::new());

    let input = CreateEscrowInput {
        seller_id: Some(seller_id),
        ..create_input(Decimal::new(100, 0))
    };
    let err = service.create_escrow(buyer(), input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn naming_a_buyer_as_the_seller_is_rejected() {
    let other_buyer = Uuid::new_v4();

    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(move |id| {
        Ok(Some(User {
            id,
            name: "Some Buyer".to_string(),
            email: "buyer2@example.com".to_string(),
            password_hash: "hashed".to_string(),
            role: UserRole::Buyer,
            created_at: Utc::now(),
        }))
    });

    let service = manager(users, MockEscrowRepository::new());

    let input = CreateEscrowInput {
        seller_id: Some(other_buyer),
        ..create_input(Decimal::new(100, 0))
    };
    let err = service.create_escrow(buyer(), input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn a_party_sees_the_escrow_with_its_audit_trail() {
    let identity = buyer();
    let escrow = test_escrow(identity.user_id, EscrowStatus::Pending);
    let escrow_id = escrow.id;

    let mut escrows = MockEscrowRepository::new();
    let found = escrow.clone();
    escrows
        .expect_find_for_party()
        .with(eq(escrow_id), eq(identity.user_id))
        .returning(move |_, _| Ok(Some(found.clone())));
    escrows.expect_audit_log().with(eq(escrow_id)).returning(move |id| {
        Ok(vec![AuditEntry {
            id: Uuid::new_v4(),
            escrow_id: id,
            entry_type: AuditType::Create,
            description: "Escrow created".to_string(),
            created_at: Utc::now(),
        }])
    });

    let service = manager(MockUserRepository::new(), escrows);

    let detail = service.get_escrow(identity, escrow_id).await.unwrap();
    assert_eq!(detail.escrow.id, escrow_id);
    assert_eq!(detail.audit_log.len(), 1);
    assert_eq!(detail.audit_log[0].entry_type, AuditType::Create);
}

#[tokio::test]
async fn a_non_party_gets_not_found_rather_than_forbidden() {
    let mut escrows = MockEscrowRepository::new();
    escrows.expect_find_for_party().returning(|_, _| Ok(None));

    let service = manager(MockUserRepository::new(), escrows);

    let err = service.get_escrow(buyer(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn buyer_listings_are_scoped_to_the_buyer() {
    let identity = buyer();
    let escrow = test_escrow(identity.user_id, EscrowStatus::Pending);

    let mut escrows = MockEscrowRepository::new();
    escrows
        .expect_list_for_buyer()
        .withf(move |buyer_id, _| *buyer_id == identity.user_id)
        .returning(move |_, _| {
            Ok(vec![EscrowListItem {
                escrow: escrow.clone(),
                counterparty_name: None,
            }])
        });

    let service = manager(MockUserRepository::new(), escrows);

    let items = service
        .list_my_escrows(identity, EscrowFilter::default())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].escrow.buyer_id, identity.user_id);
}

#[tokio::test]
async fn admins_use_the_unscoped_listing_instead() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .list_my_escrows(admin(), EscrowFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn the_platform_wide_listing_is_admin_only() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .list_all_escrows(buyer(), EscrowFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn sellers_may_not_assign_deposit_instructions() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .assign_deposit(seller(), Uuid::new_v4(), "USDT_TRC20".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn sellers_may_not_cancel_escrows() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .cancel_escrow(seller(), Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn buyers_may_not_submit_delivery() {
    let service = manager(MockUserRepository::new(), MockEscrowRepository::new());

    let err = service
        .submit_delivery(buyer(), Uuid::new_v4(), None, None, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}
