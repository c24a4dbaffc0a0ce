//! Administrative escrow handlers.
//!
//! Routes are mounted under /admin; the admin role requirement is
//! enforced in the service layer so a non-admin with a valid session
//! gets 403, not 404.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Escrow;
use crate::errors::AppResult;
use crate::services::EscrowDetail;
use crate::types::ListQuery;

use super::escrow_handler::ReasonRequest;

/// Admin routes (all require authentication; role checked in services)
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/escrows", get(list_all_escrows))
        .route("/escrows/:id", get(get_escrow_admin))
        .route("/escrows/:id/confirm-deposit", post(confirm_deposit_admin))
        .route("/escrows/:id/cancel", post(cancel_escrow))
}

/// List every escrow on the platform
#[utoipa::path(
    get,
    path = "/admin/escrows",
    tag = "Admin",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "All escrows", body = [Object]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_all_escrows(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Escrow>>> {
    let filter = query.to_filter()?;
    let escrows = state
        .escrow_service
        .list_all_escrows(current.identity, filter)
        .await?;
    Ok(Json(escrows))
}

/// Fetch any escrow with its audit trail
#[utoipa::path(
    get,
    path = "/admin/escrows/{id}",
    tag = "Admin",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    responses(
        (status = 200, description = "Escrow detail", body = EscrowDetail),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such escrow")
    )
)]
pub async fn get_escrow_admin(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EscrowDetail>> {
    let detail = state
        .escrow_service
        .get_escrow_admin(current.identity, id)
        .await?;
    Ok(Json(detail))
}

/// Confirm a deposit on a buyer's behalf
#[utoipa::path(
    post,
    path = "/admin/escrows/{id}/confirm-deposit",
    tag = "Admin",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    responses(
        (status = 200, description = "Deposit confirmed", body = Object),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such escrow"),
        (status = 409, description = "Escrow is not awaiting deposit")
    )
)]
pub async fn confirm_deposit_admin(
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

/// Cancel any non-terminal escrow
#[utoipa::path(
    post,
    path = "/admin/escrows/{id}/cancel",
    tag = "Admin",
    security(("session_cookie" = []), ("bearer_token" = [])),
    params(("id" = Uuid, Path, description = "Escrow identifier")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Escrow cancelled", body = Object),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such escrow"),
        (status = 409, description = "Escrow is already terminal")
    )
)]
pub async fn cancel_escrow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReasonRequest>,
) -> AppResult<Json<Escrow>> {
    let escrow = state
        .escrow_service
        .cancel_escrow(current.identity, id, payload.reason)
        .await?;
    Ok(Json(escrow))
}
