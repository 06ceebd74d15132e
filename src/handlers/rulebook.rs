use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::rulebook::RulebookService;

/// GET / - rulebook entries, bodies HTML-stripped
pub async fn index() -> Result<Json<Value>, ApiError> {
    let rules = RulebookService::new()?.list().await?;

    Ok(Json(json!({
        "status": "success",
        "message": rules,
    })))
}
