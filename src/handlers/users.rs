use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::users::UserService;

/// GET /api/users - list all users
///
/// Deliberately unguarded: the deployed frontend calls this before a token
/// exists. Known gap, kept for wire compatibility; see DESIGN.md.
pub async fn list_users() -> Result<Json<Value>, ApiError> {
    let users = UserService::new()?.list().await?;

    Ok(Json(json!({
        "success": true,
        "data": users,
    })))
}
