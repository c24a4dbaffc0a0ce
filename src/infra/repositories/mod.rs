//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Read-side repositories live here; transition writes go through the
//! Unit of Work's transactional repositories.

pub(crate) mod entities;
mod escrow_repository;
mod kyc_repository;
mod payment_repository;
mod session_repository;
mod user_repository;

pub use escrow_repository::{EscrowFilter, EscrowListItem, EscrowRepository, EscrowStore};
pub use kyc_repository::{KycRepository, KycStore};
pub use payment_repository::{
    PaymentMethodRepository, PaymentMethodStore, WithdrawalMethodRepository,
    WithdrawalMethodStore,
};
pub use session_repository::{SessionRepository, SessionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use escrow_repository::MockEscrowRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use kyc_repository::MockKycRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::{MockPaymentMethodRepository, MockWithdrawalMethodRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use session_repository::MockSessionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
