use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use vidshare_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

const TOKEN_COOKIE: &str = "accessToken";

/// Extract and validate the JWT from the `Authorization` header, or the
/// `accessToken` cookie when no header is sent.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .or_else(|| cookie_token(&req))
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".into()))?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Rejected access token: {}", e);
        ApiError::Unauthorized("Invalid access token".into())
    })?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn cookie_token(req: &Request) -> Option<String> {
    CookieJar::from_headers(req.headers())
        .get(TOKEN_COOKIE)
        .map(|c| c.value_trimmed().to_string())
        .filter(|t| !t.is_empty())
}
