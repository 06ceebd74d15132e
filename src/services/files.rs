use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;

use super::StoreError;
use crate::database::rows::{col, DeleteOutcomeRow, DownloadRow, FileRow};
use crate::database::Database;

/// File metadata operations against the file-management routines. The bytes
/// themselves live in [`crate::storage`]; this service only tracks records.
pub struct FileService {
    pool: PgPool,
}

/// Metadata for a freshly stored upload, inserted after the bytes are
/// durably on disk.
#[derive(Debug)]
pub struct NewFileRecord<'a> {
    pub process_id: i32,
    pub file_name: &'a str,
    pub file_type: &'a str,
    pub mime_type: Option<&'a str>,
    pub file_size: i64,
    pub file_format: &'a str,
    pub description: Option<&'a str>,
    pub file_path: &'a str,
}

/// A file record shaped for the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    #[serde(rename = "FileID")]
    pub file_id: i32,
    #[serde(rename = "UserID")]
    pub user_id: i32,
    #[serde(rename = "ProcessID")]
    pub process_id: Option<i32>,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "FileType")]
    pub file_type: Option<String>,
    #[serde(rename = "MimeType")]
    pub mime_type: Option<String>,
    #[serde(rename = "FileSize")]
    pub file_size: i64,
    #[serde(rename = "FileFormat")]
    pub file_format: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "UploadedByName")]
    pub uploaded_by_name: Option<String>,
    #[serde(rename = "CreatedAt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "DownloadCount")]
    pub download_count: i32,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        let tags = split_tags(row.tags.as_deref());
        Self {
            file_id: row.file_id,
            user_id: row.user_id,
            process_id: row.process_id,
            file_name: row.file_name,
            file_type: row.file_type,
            mime_type: row.mime_type,
            file_size: row.file_size,
            file_format: row.file_format,
            description: row.description,
            uploaded_by_name: row.uploaded_by_name,
            created_at: row.created_at,
            download_count: row.download_count,
            tags,
        }
    }
}

/// Split a comma-delimited tag column into a list, dropping empty segments.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Result of a soft-delete attempt, discriminated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Record marked deleted; message for the client.
    Deleted(String),
    /// Requester is not the owner; record untouched.
    Forbidden(String),
    /// No live record with that id (never existed, or already deleted).
    Missing(String),
}

impl FileService {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            pool: Database::pool()?,
        })
    }

    /// Persist metadata for bytes already durably stored; returns the new
    /// file id and the uploader's display name.
    pub async fn register_upload(
        &self,
        user_id: i32,
        record: &NewFileRecord<'_>,
    ) -> Result<(i32, String), StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"SELECT "NewFileID", "UploadedByName"
               FROM orbis.insert_file_data($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(user_id)
        .bind(record.process_id)
        .bind(record.file_name)
        .bind(record.file_type)
        .bind(record.mime_type)
        .bind(record.file_size)
        .bind(record.file_format)
        .bind(record.description)
        .bind(record.file_path)
        .fetch_one(&mut *tx)
        .await?;

        let new_file_id: i32 = col(&row, "NewFileID")?;
        let uploaded_by: Option<String> = col(&row, "UploadedByName")?;
        tx.commit().await?;

        Ok((
            new_file_id,
            uploaded_by.unwrap_or_else(|| "Unknown User".to_string()),
        ))
    }

    /// All non-deleted records, optionally narrowed by process and type.
    pub async fn list(
        &self,
        process_id: Option<i32>,
        file_type: Option<&str>,
    ) -> Result<Vec<FileRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.get_file_data($1, $2, $3)")
            .bind(process_id)
            .bind(None::<i32>) // no per-user narrowing; listing is global
            .bind(file_type)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                FileRow::from_row(row)
                    .map(FileRecord::from)
                    .map_err(StoreError::from)
            })
            .collect()
    }

    /// Owner-only soft delete. The routine flags `IsDeleted` and reports the
    /// outcome; a repeat delete comes back as `Missing`, not an error.
    pub async fn soft_delete(
        &self,
        file_id: i32,
        user_id: i32,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"SELECT "Status", "Message" FROM orbis.delete_uploaded_file($1, $2)"#,
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let outcome = DeleteOutcomeRow::from_row(&row)?;
        tx.commit().await?;

        match outcome.status.as_str() {
            "deleted" => Ok(DeleteOutcome::Deleted(outcome.message)),
            "forbidden" => Ok(DeleteOutcome::Forbidden(outcome.message)),
            "missing" => Ok(DeleteOutcome::Missing(outcome.message)),
            other => Err(StoreError::UnexpectedStatus(other.to_string())),
        }
    }

    /// Resolve the storage path for a live record; `None` when the record is
    /// deleted or absent.
    pub async fn resolve_download(&self, file_id: i32) -> Result<Option<DownloadRow>, StoreError> {
        let row = sqlx::query("SELECT * FROM orbis.get_download_file($1)")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(DownloadRow::from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    /// Bump the download counter. Callers treat this as fire-and-forget; a
    /// failure here never fails the download itself.
    pub async fn increment_download_count(&self, file_id: i32) -> Result<(), StoreError> {
        sqlx::query("SELECT orbis.increment_download_count($1)")
            .bind(file_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_tags_on_commas() {
        assert_eq!(
            split_tags(Some("invoice, q3 ,audit")),
            vec!["invoice", "q3", "audit"]
        );
    }

    #[test]
    fn drops_empty_tag_segments() {
        assert_eq!(split_tags(Some(",a,, b ,")), vec!["a", "b"]);
        assert_eq!(split_tags(Some("")), Vec::<String>::new());
    }

    #[test]
    fn missing_tags_yield_empty_list() {
        assert_eq!(split_tags(None), Vec::<String>::new());
    }
}
