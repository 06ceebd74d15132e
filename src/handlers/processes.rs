use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::directory::DirectoryService;

/// GET /api/processes - companies/processes visible to the caller
///
/// Visibility comes entirely from the `CompanyIds` claim; an empty claim
/// list means no restriction.
pub async fn get_processes(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let companies = DirectoryService::new()?
        .companies_for(&user.company_ids)
        .await?;

    Ok(Json(json!({ "processes": companies })))
}
