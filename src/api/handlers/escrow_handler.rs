//! Escrow lifecycle handlers (party-facing).
//!
//! Party scoping and transition legality are enforced in the service
//! layer; handlers only shape requests and responses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{DepositInstructions, Escrow};
use crate::errors::AppResult;
use crate::infra::EscrowListItem;
use crate::services::{AttachmentUpload, CreateEscrowInput, EscrowDetail};
use crate::types::ListQuery;

use super::decode_attachments;
use super::AttachmentPayload;

/// Escrow creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEscrowRequest {
    /// Counterparty seller; may be left unset and assigned later
    pub seller_id: Option<Uuid>,
    /// Escrow amount, must be positive
    #[schema(value_type = String, example = "250.00")]
    pub amount: Decimal,
    /// Payment method code
    #[validate(length(min = 1, message = "Payment method is required"))]
    #[schema(example = "USDT_TRC20")]
    pub payment_method: String,
    /// Buyer's preferred payout wallet, recorded with the escrow
    pub preferred_wallet: Option<String>,
    /// Free-form agreement text
    pub agreement: Option<String>,
}

/// Deposit assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignDepositRequest {
    /// Payment method code to resolve deposit instructions for
    #[validate(length(min = 1, message = "Payment method is required"))]
    #[schema(example = "USDT_TRC20")]
    pub payment_method: String,
}

/// Delivery submission request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitDeliveryRequest {
    /// Seller's delivery terms
    pub terms: Option<String>,
    /// The deliverable content itself
    pub content: Option<String>,
    /// Supporting attachments
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

/// Optional note accompanying a release or release request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NoteRequest {
    pub note: Option<String>,
}

/// Optional reason accompanying a rejection
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}

/// Create escrow routes (all require authentication)
pub fn escrow_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_escrow).get(list_my_escrows))
        .route("/:id", get(get_escrow))
        .route("/:id/assign-deposit", post(assign_deposit))
        .route("/:id/confirm-deposit", post(confirm_deposit))
        .route("/:id/deliver", post(submit_delivery))
        .route("/:id/request-release", post(request_release))
        .route("/:id/reject", post(reject_escrow))
        .route("/:id/release", post(release_funds))
}

/// Open a new escrow
#[utoipa::path(
    post,
    path = "/escrows",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    request_body = CreateEscrowRequest,
    responses(
        (status = 201, description = "Escrow created", body = Object),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not a buyer")
    )
)]
pub async fn create_escrow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateEscrowRequest>,
) -> AppResult<(StatusCode, Json<Escrow>)> {
    let input = CreateEscrowInput {
        seller_id: payload.seller_id,
        amount: payload.amount,
        payment_method: payload.payment_method,
        preferred_wallet: payload.preferred_wallet,
        agreement: payload.agreement,
    };

    let escrow = state
        .escrow_service
        .create_escrow(current.identity, input)
        .await?;

    Ok((StatusCode::CREATED, Json(escrow)))
}

/// List the caller's escrows, newest first
#[utoipa::path(
    get,
    path = "/escrows",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Escrows visible to the caller", body = [EscrowListItem]),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_my_escrows(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<EscrowListItem>>> {
    let filter = query.to_filter()?;
    let escrows = state
        .escrow_service
        .list_my_escrows(current.identity, filter)
        .await?;
    Ok(Json(escrows))
}

/// Fetch one escrow with its audit trail
#[utoipa::path(
    get,
    path = "/escrows/{id}",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    responses(
        (status = 200, description = "Escrow detail", body = EscrowDetail),
        (status = 404, description = "Not found or caller is not a party")
    )
)]
pub async fn get_escrow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EscrowDetail>> {
    let detail = state.escrow_service.get_escrow(current.identity, id).await?;
    Ok(Json(detail))
}

/// Pick a payment method and get deposit instructions
#[utoipa::path(
    post,
    path = "/escrows/{id}/assign-deposit",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    request_body = AssignDepositRequest,
    responses(
        (status = 200, description = "Deposit instructions", body = DepositInstructions),
        (status = 403, description = "Caller may not assign a deposit"),
        (status = 404, description = "Not found or caller is not a party"),
        (status = 409, description = "Escrow is not awaiting a deposit address")
    )
)]
pub async fn assign_deposit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AssignDepositRequest>,
) -> AppResult<Json<DepositInstructions>> {
    let instructions = state
        .escrow_service
        .assign_deposit(current.identity, id, payload.payment_method)
        .await?;
    Ok(Json(instructions))
}

/// Mark the off-platform deposit as made
#[utoipa::path(
    post,
    path = "/escrows/{id}/confirm-deposit",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    responses(
        (status = 200, description = "Deposit confirmed", body = Object),
        (status = 403, description = "Caller may not confirm a deposit"),
        (status = 404, description = "Not found or caller is not a party"),
        (status = 409, description = "Escrow is not awaiting deposit")
    )
)]
pub async fn confirm_deposit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Escrow>> {
    let escrow = state
        .escrow_service
        .confirm_deposit(current.identity, id)
        .await?;
    Ok(Json(escrow))
}

/// Submit the deliverable, optionally with attachments
#[utoipa::path(
    post,
    path = "/escrows/{id}/deliver",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    request_body = SubmitDeliveryRequest,
    responses(
        (status = 200, description = "Delivery recorded", body = Object),
        (status = 400, description = "Malformed attachment"),
        (status = 403, description = "Caller may not submit delivery"),
        (status = 404, description = "Not found or caller is not a party"),
        (status = 409, description = "Escrow is not open for delivery")
    )
)]
pub async fn submit_delivery(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SubmitDeliveryRequest>,
) -> AppResult<Json<Escrow>> {
    let attachments: Vec<AttachmentUpload> = decode_attachments(payload.attachments)?;

    let escrow = state
        .escrow_service
        .submit_delivery(current.identity, id, payload.terms, payload.content, attachments)
        .await?;
    Ok(Json(escrow))
}

/// Ask the buyer to release funds
#[utoipa::path(
    post,
    path = "/escrows/{id}/request-release",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Release requested", body = Object),
        (status = 403, description = "Caller may not request release"),
        (status = 404, description = "Not found or caller is not a party"),
        (status = 409, description = "Escrow is not ready for a release request")
    )
)]
pub async fn request_release(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<NoteRequest>,
) -> AppResult<Json<Escrow>> {
    let escrow = state
        .escrow_service
        .request_release(current.identity, id, payload.note)
        .await?;
    Ok(Json(escrow))
}

/// Back out of the escrow as seller
#[utoipa::path(
    post,
    path = "/escrows/{id}/reject",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Escrow rejected", body = Object),
        (status = 403, description = "Caller may not reject"),
        (status = 404, description = "Not found or caller is not a party"),
        (status = 409, description = "Escrow can no longer be rejected")
    )
)]
pub async fn reject_escrow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReasonRequest>,
) -> AppResult<Json<Escrow>> {
    let escrow = state
        .escrow_service
        .reject_escrow(current.identity, id, payload.reason)
        .await?;
    Ok(Json(escrow))
}

/// Release funds to the seller
#[utoipa::path(
    post,
    path = "/escrows/{id}/release",
    tag = "Escrows",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Funds released", body = Object),
        (status = 403, description = "Caller may not release funds"),
        (status = 404, description = "Not found or caller is not a party"),
        (status = 409, description = "Escrow is not eligible for release")
    )
)]
pub async fn release_funds(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<NoteRequest>,
) -> AppResult<Json<Escrow>> {
    let escrow = state
        .escrow_service
        .release_funds(current.identity, id, payload.note)
        .await?;
    Ok(Json(escrow))
}
