//! Service layer - Business logic
//!
//! Services implement the application's use cases on top of the Unit of
//! Work and infrastructure collaborators. Handlers call services through
//! their traits only.

mod auth_service;
mod container;
mod escrow_service;
mod kyc_service;
mod payment_service;

pub use auth_service::{AuthService, Authenticator, LoginOutcome};
pub use container::{ServiceContainer, Services};
pub use escrow_service::{
    AttachmentUpload, CreateEscrowInput, EscrowDetail, EscrowManager, EscrowService,
};
pub use kyc_service::{KycService, KycTracker};
pub use payment_service::{PaymentDirectory, PaymentService};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use escrow_service::MockEscrowService;
#[cfg(any(test, feature = "test-utils"))]
pub use kyc_service::MockKycService;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_service::MockPaymentService;
