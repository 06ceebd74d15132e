use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_token, Claims};
use crate::config;
use crate::error::ApiError;
use crate::services::users::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /login - exchange credentials for a signed token
///
/// The token carries the user's id, display name, role and every company id
/// the store maps them to; protected routes read those claims instead of
/// hitting the database again.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password required"))?;
    let password = payload
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password required"))?;

    let service = UserService::new()?;
    let profile = service
        .check_login(email, password)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Invalid credentials"))?;

    let cfg = config::config();
    let claims = Claims::new(
        profile.user.user_id,
        profile.display_name(),
        profile.user.role_id,
        profile.company_ids.clone(),
        cfg.security.jwt_expiry_hours,
    );
    let token = issue_token(&claims, &cfg.security.jwt_secret)?;

    tracing::info!(user_id = profile.user.user_id, "login successful");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": {
            "UserId": profile.user.user_id,
            "FirstName": profile.user.first_name,
            "LastName": profile.user.last_name,
            "Email": profile.user.email,
            "RoleId": profile.user.role_id,
            "RoleName": profile.user.role_name,
            "CompanyIds": profile.company_ids,
            "CompanyNames": profile.company_names,
        }
    })))
}
