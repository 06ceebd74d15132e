pub mod auth;
pub mod discussion;
pub mod files;
pub mod processes;
pub mod rulebook;
pub mod users;

use axum::response::IntoResponse;
use serde_json::json;

use crate::database::Database;

/// GET /health - liveness plus a database ping
pub async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match Database::health_check().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "status": "degraded",
                "timestamp": now,
                "message": e.to_string()
            })),
        ),
    }
}
