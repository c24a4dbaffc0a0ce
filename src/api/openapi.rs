//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, escrow_handler, kyc_handler, payment_handler, AttachmentPayload,
};
use crate::domain::{
    AuditEntry, AuditType, DepositInstructions, EscrowStatus, KycStatus, KycSubmission,
    PaymentMethod, UserResponse, UserRole, WithdrawalMethod,
};
use crate::infra::EscrowListItem;
use crate::services::EscrowDetail;
use crate::types::MessageResponse;

/// OpenAPI documentation for the escrow platform API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vanguard Escrow",
        version = "0.1.0",
        description = "Escrow status ledger and authorization gate with a role-gated lifecycle state machine",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "API Support", email = "support@example.com")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
        (url = "https://api.example.com", description = "Production server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::signup,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        // Escrow endpoints
        escrow_handler::create_escrow,
        escrow_handler::list_my_escrows,
        escrow_handler::get_escrow,
        escrow_handler::assign_deposit,
        escrow_handler::confirm_deposit,
        escrow_handler::submit_delivery,
        escrow_handler::request_release,
        escrow_handler::reject_escrow,
        escrow_handler::release_funds,
        // Payment endpoints
        payment_handler::list_methods,
        payment_handler::get_withdrawal_method,
        payment_handler::set_withdrawal_method,
        // KYC endpoints
        kyc_handler::submit_kyc,
        kyc_handler::kyc_status,
        // Admin endpoints
        admin_handler::list_all_escrows,
        admin_handler::get_escrow_admin,
        admin_handler::confirm_deposit_admin,
        admin_handler::cancel_escrow,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            EscrowStatus,
            AuditType,
            AuditEntry,
            EscrowDetail,
            EscrowListItem,
            DepositInstructions,
            PaymentMethod,
            WithdrawalMethod,
            KycStatus,
            KycSubmission,
            // Shared request/response types
            AttachmentPayload,
            MessageResponse,
            // Auth types
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            auth_handler::LoginResponse,
            // Escrow handler types
            escrow_handler::CreateEscrowRequest,
            escrow_handler::AssignDepositRequest,
            escrow_handler::SubmitDeliveryRequest,
            escrow_handler::NoteRequest,
            escrow_handler::ReasonRequest,
            // Payment handler types
            payment_handler::SetWithdrawalRequest,
            // KYC handler types
            kyc_handler::SubmitKycRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login and session management"),
        (name = "Escrows", description = "Escrow lifecycle operations"),
        (name = "Payments", description = "Payment-method directory and withdrawal configuration"),
        (name = "KYC", description = "Seller identity verification"),
        (name = "Admin", description = "Administrative escrow operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier covering both session credentials
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "session",
                    "Signed session cookie set by /auth/login",
                ))),
            );
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Session token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
