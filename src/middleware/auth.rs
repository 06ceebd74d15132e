use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::auth::{self, Claims, TokenError};
use crate::config;
use crate::error::ApiError;

/// Authenticated caller context extracted from the verified token and
/// injected into request extensions for handlers to consume.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub user_name: String,
    pub role_id: i32,
    pub company_ids: Vec<i32>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            user_name: claims.user_name,
            role_id: claims.role_id,
            company_ids: claims.company_ids,
        }
    }
}

/// Token-verification middleware for protected routes.
///
/// Runs before the handler; on success the handler receives the caller
/// identity via `Extension<AuthUser>`. Verification itself lives in
/// [`crate::auth::verify_token`] and stays independently testable.
pub async fn require_auth(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)?;

    let secret = &config::config().security.jwt_secret;
    let claims = auth::verify_token(&token, secret)?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Result<String, TokenError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(TokenError::Missing)?;

    auth::token_from_header(value)
        .map(str::to_string)
        .ok_or(TokenError::Missing)
}
