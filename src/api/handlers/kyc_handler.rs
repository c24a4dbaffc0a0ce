//! KYC submission handlers (seller-facing).

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::KycSubmission;
use crate::errors::AppResult;

use super::decode_attachments;
use super::AttachmentPayload;

/// KYC submission request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitKycRequest {
    /// Kind of verification, e.g. "identity" or "business"
    #[validate(length(min = 1, message = "KYC type is required"))]
    #[schema(example = "identity")]
    pub kyc_type: String,
    /// Supporting documents
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

/// KYC routes (all require authentication)
pub fn kyc_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_kyc))
        .route("/status", get(kyc_status))
}

/// File a new KYC submission
#[utoipa::path(
    post,
    path = "/kyc",
    tag = "KYC",
    security(("session_cookie" = []), ("bearer_token" = [])),
    request_body = SubmitKycRequest,
    responses(
        (status = 201, description = "Submission filed", body = KycSubmission),
        (status = 400, description = "Validation error or malformed attachment"),
        (status = 403, description = "Caller is not a seller")
    )
)]
pub async fn submit_kyc(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SubmitKycRequest>,
) -> AppResult<(StatusCode, Json<KycSubmission>)> {
    let attachments = decode_attachments(payload.attachments)?;

    let submission = state
        .kyc_service
        .submit_kyc(current.identity, payload.kyc_type, attachments)
        .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// The caller's most recent KYC submission
#[utoipa::path(
    get,
    path = "/kyc/status",
    tag = "KYC",
    security(("session_cookie" = []), ("bearer_token" = [])),
    responses(
        (status = 200, description = "Latest submission, or null", body = Option<KycSubmission>),
        (status = 403, description = "Caller is not a seller")
    )
)]
pub async fn kyc_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Option<KycSubmission>>> {
    let submission = state.kyc_service.kyc_status(current.identity).await?;
    Ok(Json(submission))
}
