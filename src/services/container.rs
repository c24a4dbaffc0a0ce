//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits through this container, so tests
//! can swap any service for a mock.

use std::sync::Arc;

use super::{AuthService, EscrowService, KycService, PaymentService};
use crate::config::Config;
use crate::infra::{Cache, FileStore, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get escrow lifecycle service
    fn escrows(&self) -> Arc<dyn EscrowService>;

    /// Get payment directory service
    fn payments(&self) -> Arc<dyn PaymentService>;

    /// Get KYC service
    fn kyc(&self) -> Arc<dyn KycService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    escrow_service: Arc<dyn EscrowService>,
    payment_service: Arc<dyn PaymentService>,
    kyc_service: Arc<dyn KycService>,
}

impl Services {
    /// Create a new service container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        escrow_service: Arc<dyn EscrowService>,
        payment_service: Arc<dyn PaymentService>,
        kyc_service: Arc<dyn KycService>,
    ) -> Self {
        Self {
            auth_service,
            escrow_service,
            payment_service,
            kyc_service,
        }
    }

    /// Create service container from infrastructure handles and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        cache: Cache,
        files: FileStore,
        config: Config,
    ) -> Self {
        use super::{Authenticator, EscrowManager, KycTracker, PaymentDirectory};

        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let escrow_service = Arc::new(EscrowManager::new(uow.clone(), files.clone()));
        let payment_service = Arc::new(PaymentDirectory::new(uow.clone(), cache));
        let kyc_service = Arc::new(KycTracker::new(uow, files));

        Self {
            auth_service,
            escrow_service,
            payment_service,
            kyc_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn escrows(&self) -> Arc<dyn EscrowService> {
        self.escrow_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn kyc(&self) -> Arc<dyn KycService> {
        self.kyc_service.clone()
    }
}
