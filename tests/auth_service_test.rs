//! Authentication service unit tests.
//!
//! Uses mock repositories behind a test Unit of Work; no database or
//! Redis required.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::predicate::eq;
use uuid::Uuid;

use vanguard_escrow::config::Config;
use vanguard_escrow::domain::{Password, Session, User, UserRole};
use vanguard_escrow::errors::{AppError, AppResult};
use vanguard_escrow::infra::{
    EscrowRepository, KycRepository, MockEscrowRepository, MockKycRepository,
    MockPaymentMethodRepository, MockSessionRepository, MockUserRepository,
    MockWithdrawalMethodRepository, PaymentMethodRepository, SessionRepository,
    TransactionContext, UnitOfWork, UserRepository, WithdrawalMethodRepository,
};
use vanguard_escrow::services::{AuthService, Authenticator};

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
    fn new(users: MockUserRepository, sessions: MockSessionRepository) -> Self {
        Self {
            users: Arc::new(users),
            sessions: Arc::new(sessions),
            escrows: Arc::new(MockEscrowRepository::new()),
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

fn test_config() -> Config {
    std::env::set_var(
        "SESSION_SECRET",
        "integration-test-session-secret-that-is-definitely-long-enough!!",
    );
    Config::from_env()
}

fn seller_with_password(password: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Test Seller".to_string(),
        email: "seller@example.com".to_string(),
        password_hash: Password::new(password).unwrap().into_string(),
        role: UserRole::Seller,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn login_mints_a_session_for_valid_credentials() {
    let user = seller_with_password("correct-horse-battery");
    let user_id = user.id;

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq("seller@example.com"))
        .times(1)
        .returning(move |_| Ok(Some(user.clone())));

    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_create()
        .times(1)
        .returning(|token, user_id, expires_at| {
            Ok(Session {
                token,
                user_id,
                expires_at,
            })
        });

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(users, sessions)),
        test_config(),
    );

    let outcome = service
        .login(
            "seller@example.com".to_string(),
            "correct-horse-battery".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.user.id, user_id);
    assert_eq!(outcome.session.user_id, user_id);
    // 32 random bytes, hex-encoded
    assert_eq!(outcome.session.token.len(), 64);
    assert!(outcome.session.expires_at > Utc::now());
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let user = seller_with_password("correct-horse-battery");

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(user.clone())));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(users, MockSessionRepository::new())),
        test_config(),
    );

    let err = service
        .login("seller@example.com".to_string(), "wrong".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn login_rejects_an_unknown_email_identically() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(users, MockSessionRepository::new())),
        test_config(),
    );

    let err = service
        .login("nobody@example.com".to_string(), "whatever".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn signup_rejects_an_admin_role() {
    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(
            MockUserRepository::new(),
            MockSessionRepository::new(),
        )),
        test_config(),
    );

    let err = service
        .signup(
            "Eve".to_string(),
            "eve@example.com".to_string(),
            "password123".to_string(),
            "admin".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn resolve_session_returns_the_identity_for_a_live_token() {
    let user = seller_with_password("correct-horse-battery");
    let user_id = user.id;

    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_find_by_token()
        .with(eq("live-token"))
        .returning(move |token| {
            Ok(Some(Session {
                token: token.to_string(),
                user_id,
                expires_at: Utc::now() + Duration::hours(1),
            }))
        });

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .with(eq(user_id))
        .returning(move |_| Ok(Some(user.clone())));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(users, sessions)),
        test_config(),
    );

    let identity = service.resolve_session("live-token").await.unwrap().unwrap();
    assert_eq!(identity.user_id, user_id);
    assert_eq!(identity.role, UserRole::Seller);
}

#[tokio::test]
async fn resolve_session_deletes_an_expired_row_and_returns_none() {
    let user_id = Uuid::new_v4();

    let mut sessions = MockSessionRepository::new();
    sessions.expect_find_by_token().returning(move |token| {
        Ok(Some(Session {
            token: token.to_string(),
            user_id,
            expires_at: Utc::now() - Duration::minutes(5),
        }))
    });
    sessions
        .expect_delete_by_token()
        .with(eq("stale-token"))
        .times(1)
        .returning(|_| Ok(()));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(MockUserRepository::new(), sessions)),
        test_config(),
    );

    let resolved = service.resolve_session("stale-token").await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn resolve_session_treats_an_unknown_token_as_unauthenticated() {
    let mut sessions = MockSessionRepository::new();
    sessions.expect_find_by_token().returning(|_| Ok(None));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(MockUserRepository::new(), sessions)),
        test_config(),
    );

    assert!(service.resolve_session("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn logging_out_twice_with_the_same_token_succeeds_both_times() {
    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_delete_by_token()
        .with(eq("spent-token"))
        .times(2)
        .returning(|_| Ok(()));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(MockUserRepository::new(), sessions)),
        test_config(),
    );

    // The second call targets a row the first already deleted.
    service.logout("spent-token").await.unwrap();
    service.logout("spent-token").await.unwrap();
}

#[tokio::test]
async fn logout_deletes_the_session_row() {
    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_delete_by_token()
        .with(eq("some-token"))
        .times(1)
        .returning(|_| Ok(()));

    let service = Authenticator::new(
        Arc::new(TestUnitOfWork::new(MockUserRepository::new(), sessions)),
        test_config(),
    );

    service.logout("some-token").await.unwrap();
}
