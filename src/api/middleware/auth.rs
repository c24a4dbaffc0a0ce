//! Session authentication middleware.
//!
//! The credential is the signed session cookie; an Authorization bearer
//! header is accepted as the out-of-band equivalent for non-browser
//! clients. Either way the token resolves against the session store, so
//! logout and expiry take effect immediately.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::SignedCookieJar;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE_NAME};
use crate::domain::Identity;
use crate::errors::AppError;

/// Authenticated caller injected into request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub identity: Identity,
    /// The raw session token, needed by logout.
    pub token: String,
}

/// Pull the session token from the signed cookie jar or, failing that,
/// the Authorization header. A cookie that fails signature verification
/// is simply absent.
fn extract_token(state: &AppState, request: &Request) -> Option<String> {
    let jar = SignedCookieJar::from_headers(request.headers(), state.cookie_key().clone());
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        return Some(cookie.value().to_string());
    }

    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(String::from)
}

/// Session authentication middleware.
///
/// Resolves the session token and injects [`CurrentUser`] into request
/// extensions. Absent, unknown and expired tokens are all
/// Unauthenticated; storage failures are not.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&state, &request).ok_or(AppError::Unauthenticated)?;

    let identity = state
        .auth_service
        .resolve_session(&token)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    request
        .extensions_mut()
        .insert(CurrentUser { identity, token });

    Ok(next.run(request).await)
}
