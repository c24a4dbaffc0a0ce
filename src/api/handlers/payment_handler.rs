//! Payment-method directory and seller withdrawal-method handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{PaymentMethod, WithdrawalMethod};
use crate::errors::AppResult;

/// Withdrawal-method configuration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetWithdrawalRequest {
    /// Payment method code
    #[validate(length(min = 1, message = "Method code is required"))]
    #[schema(example = "USDT_TRC20")]
    pub method_code: String,
    /// Method-specific payout details, e.g. `{"address": ...}`
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
}

/// Payment routes (all require authentication)
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_methods))
        .route(
            "/withdrawal",
            get(get_withdrawal_method).put(set_withdrawal_method),
        )
}

/// List active payment methods
#[utoipa::path(
    get,
    path = "/payment-methods",
    tag = "Payments",
    security(("session_cookie" = []), ("bearer_token" = [])),
    responses(
        (status = 200, description = "Active payment methods", body = [PaymentMethod])
    )
)]
pub async fn list_methods(State(state): State<AppState>) -> AppResult<Json<Vec<PaymentMethod>>> {
    let methods = state.payment_service.list_methods().await?;
    Ok(Json(methods))
}

/// The seller's configured withdrawal method
#[utoipa::path(
    get,
    path = "/payment-methods/withdrawal",
    tag = "Payments",
    security(("session_cookie" = []), ("bearer_token" = [])),
    responses(
        (status = 200, description = "Configured withdrawal method, or null", body = Option<WithdrawalMethod>),
        (status = 403, description = "Caller is not a seller")
    )
)]
pub async fn get_withdrawal_method(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Option<WithdrawalMethod>>> {
    let method = state
        .payment_service
        .get_withdrawal_method(current.identity)
        .await?;
    Ok(Json(method))
}

/// Configure the seller's withdrawal method (upsert)
#[utoipa::path(
    put,
    path = "/payment-methods/withdrawal",
    tag = "Payments",
    security(("session_cookie" = []), ("bearer_token" = [])),
    request_body = SetWithdrawalRequest,
    responses(
        (status = 200, description = "Withdrawal method saved", body = WithdrawalMethod),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not a seller")
    )
)]
pub async fn set_withdrawal_method(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SetWithdrawalRequest>,
) -> AppResult<Json<WithdrawalMethod>> {
    let method = state
        .payment_service
        .set_withdrawal_method(current.identity, payload.method_code, payload.details)
        .await?;
    Ok(Json(method))
}
