//! Authentication handlers.
//!
//! Login sets the signed session cookie and also returns the raw token so
//! non-browser clients can use the Authorization header instead.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE_NAME};
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    /// User display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// Account role, either "buyer" or "seller"
    #[schema(example = "buyer")]
    pub role: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque session token, also set as a signed cookie
    pub token: String,
    /// Session expiry timestamp
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// Routes that do not require an existing session. Logout lives here so a
/// second logout with an already-invalidated token still succeeds.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Routes that require an authenticated session.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Register a new buyer or seller account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service
        .signup(payload.name, payload.email, payload.password, payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(SignedCookieJar, Json<LoginResponse>)> {
    let outcome = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE_NAME, outcome.session.token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::hours(state.session_ttl_hours))
        .build();

    let body = LoginResponse {
        token: outcome.session.token,
        expires_at: outcome.session.expires_at,
        user: UserResponse::from(outcome.user),
    };

    Ok((jar.add(cookie), Json(body)))
}

/// Invalidate the presented session, if any
///
/// Idempotent: a missing, unknown or already-invalidated token still gets
/// 200, with the cookie cleared either way.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    security((), ("session_cookie" = []), ("bearer_token" = [])),
    responses(
        (status = 200, description = "Session invalidated (or was already)", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    headers: HeaderMap,
) -> AppResult<(SignedCookieJar, Json<MessageResponse>)> {
    let token = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
                .map(String::from)
        });

    if let Some(token) = token {
        state.auth_service.logout(&token).await?;
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build());
    Ok((jar, Json(MessageResponse::new("Logged out"))))
}

/// The authenticated user's own record
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    security(("session_cookie" = []), ("bearer_token" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.whoami(current.identity.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
