//! Application state - Dependency injection container.

use std::sync::Arc;

use axum_extra::extract::cookie::Key;

use crate::config::Config;
use crate::infra::{Cache, Database, FileStore};
use crate::services::{
    AuthService, EscrowService, KycService, PaymentService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub escrow_service: Arc<dyn EscrowService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub kyc_service: Arc<dyn KycService>,
    /// Redis cache (rate limiting, directory cache, health checks)
    pub cache: Arc<Cache>,
    /// Database connection (health checks)
    pub database: Arc<Database>,
    /// Cookie-signing key derived from the session secret
    cookie_key: Key,
    /// Session lifetime, mirrored into the cookie max-age
    pub session_ttl_hours: i64,
}

impl AppState {
    /// Create application state from infrastructure handles and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        files: FileStore,
        config: Config,
    ) -> Self {
        let cookie_key = Key::from(config.session_secret_bytes());
        let session_ttl_hours = config.session_ttl_hours;

        let container = Services::from_connection(
            database.get_connection(),
            cache.as_ref().clone(),
            files,
            config,
        );

        Self {
            auth_service: container.auth(),
            escrow_service: container.escrows(),
            payment_service: container.payments(),
            kyc_service: container.kyc(),
            cache,
            database,
            cookie_key,
            session_ttl_hours,
        }
    }

    /// Create application state with manually injected services (tests).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        escrow_service: Arc<dyn EscrowService>,
        payment_service: Arc<dyn PaymentService>,
        kyc_service: Arc<dyn KycService>,
        cache: Arc<Cache>,
        database: Arc<Database>,
        cookie_key: Key,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            auth_service,
            escrow_service,
            payment_service,
            kyc_service,
            cache,
            database,
            cookie_key,
            session_ttl_hours,
        }
    }

    pub fn cookie_key(&self) -> &Key {
        &self.cookie_key
    }
}

/// Lets SignedCookieJar extract its key straight from state.
impl axum::extract::FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
