use axum::{
    body::Body,
    extract::{Multipart, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::files::{DeleteOutcome, FileService, NewFileRecord};
use crate::storage::{self, Storage};

/// POST /api/file-management - multipart upload
///
/// Field `file` carries the bytes; `ProcessID` and `FileType` are required
/// text fields, `Description` optional. The name/extension check runs before
/// a single byte is persisted; the metadata insert runs only after the bytes
/// are durably on disk.
pub async fn upload(
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut file_bytes = None;
    let mut client_name = None;
    let mut content_type = None;
    let mut process_id_raw: Option<String> = None;
    let mut file_type: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                client_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                file_bytes = Some(field.bytes().await.map_err(|e| {
                    ApiError::validation(format!("Failed to read upload: {}", e))
                })?);
            }
            "ProcessID" => process_id_raw = field.text().await.ok(),
            "FileType" => file_type = field.text().await.ok(),
            "Description" => description = field.text().await.ok(),
            _ => {}
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::validation("file is required"))?;
    let client_name = client_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("file name is required"))?;
    let process_id: i32 = process_id_raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("ProcessID is required"))?
        .parse()
        .map_err(|_| ApiError::validation("ProcessID must be numeric"))?;
    let file_type = file_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation("FileType is required"))?;

    // Rejects unsafe names and disallowed extensions before anything hits disk
    let safe_name = storage::sanitize_file_name(&client_name)?;
    let file_format = safe_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_string();

    let stored_path = Storage::from_config().save(&safe_name, &bytes).await?;
    let path_str = stored_path.to_string_lossy();

    let record = NewFileRecord {
        process_id,
        file_name: &safe_name,
        file_type: &file_type,
        mime_type: content_type.as_deref(),
        file_size: bytes.len() as i64,
        file_format: &file_format,
        description: description.as_deref().filter(|d| !d.trim().is_empty()),
        file_path: &path_str,
    };

    let (new_file_id, uploaded_by) = FileService::new()?
        .register_upload(user.user_id, &record)
        .await
        .map_err(|e| {
            // The bytes stay on disk; accepted orphaned-file risk, logged so
            // a sweep can reclaim them.
            tracing::warn!(
                user_id = user.user_id,
                path = %stored_path.display(),
                "metadata insert failed after durable write: {}",
                e
            );
            ApiError::from(e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "NewFileID": new_file_id,
            "UploadedByName": uploaded_by,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "processId")]
    pub process_id: Option<String>,
    #[serde(rename = "fileType")]
    pub file_type: Option<String>,
}

/// GET /api/uploaded-details - list file records with optional filters
pub async fn uploaded_details(Query(query): Query<ListQuery>) -> Result<Json<Value>, ApiError> {
    let process_id = match query.process_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            raw.parse::<i32>()
                .map_err(|_| ApiError::validation("Invalid ProcessID format"))?,
        ),
        _ => None,
    };
    let file_type = query
        .file_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"));

    let files = FileService::new()?.list(process_id, file_type).await?;

    Ok(Json(json!({
        "success": true,
        "files": files,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "FileID")]
    pub file_id: Option<Value>,
}

/// POST /api/delete-uploaded-file - owner-only soft delete
pub async fn delete_uploaded_file(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let file_id = match payload.file_id {
        Some(Value::Number(ref n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| ApiError::validation("FileID must be numeric"))?,
        Some(Value::String(ref s)) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| ApiError::validation("FileID must be numeric"))?,
        Some(_) => return Err(ApiError::validation("FileID must be numeric")),
        None => return Err(ApiError::validation("FileID is required")),
    };

    let outcome = FileService::new()?
        .soft_delete(file_id, user.user_id)
        .await
        .map_err(|e| {
            tracing::error!(file_id, user_id = user.user_id, "delete failed: {}", e);
            ApiError::from(e)
        })?;

    tracing::info!(file_id, user_id = user.user_id, "delete request: {:?}", outcome);

    delete_response(outcome)
}

/// Map a delete outcome onto the wire: only an actual deletion succeeds; a
/// non-owner attempt is 403 and a missing or already-deleted record is 404.
fn delete_response(outcome: DeleteOutcome) -> Result<Json<Value>, ApiError> {
    match outcome {
        DeleteOutcome::Deleted(message) => Ok(Json(json!({
            "success": true,
            "message": message,
        }))),
        DeleteOutcome::Forbidden(message) => Err(ApiError::forbidden(message)),
        DeleteOutcome::Missing(message) => Err(ApiError::not_found(message)),
    }
}

/// GET /api/download-file/:id - stream the bytes, bump the counter
pub async fn download_file(Path(file_id): Path<i32>) -> Result<Response, ApiError> {
    let service = FileService::new()?;

    let target = service
        .resolve_download(file_id)
        .await?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let Some((file, length)) = Storage::from_config().open(&target.file_path).await? else {
        // Metadata says the file exists but the bytes are gone; surface the
        // divergence instead of hiding it.
        tracing::warn!(
            file_id,
            path = %target.file_path,
            "file record points at missing bytes"
        );
        return Err(ApiError::not_found("File not found"));
    };

    // Fire-and-forget: a failed increment never fails the download
    tokio::spawn(async move {
        if let Err(e) = service.increment_download_count(file_id).await {
            tracing::warn!(file_id, "download count increment failed: {}", e);
        }
    });

    let headers = [
        (
            header::CONTENT_TYPE,
            target
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        ),
        (header::CONTENT_LENGTH, length.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", target.file_name),
        ),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_outcome_is_a_success_body() {
        let result = delete_response(DeleteOutcome::Deleted("File deleted".to_string()));
        let Json(body) = result.expect("deletion should succeed");
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(body["message"], "File deleted");
    }

    #[test]
    fn non_owner_delete_is_forbidden() {
        let err = delete_response(DeleteOutcome::Forbidden("Not the owner".to_string()))
            .expect_err("non-owner must not succeed");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Not the owner");
    }

    #[test]
    fn repeat_delete_maps_to_not_found() {
        let err = delete_response(DeleteOutcome::Missing("File not found".to_string()))
            .expect_err("missing record must not succeed");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "File not found");
    }
}
