//! Typed decoders for stored-routine result rows.
//!
//! Every routine call has one explicit decoder that reads columns by name and
//! fails fast with the offending column when the result shape diverges from
//! what this build expects. No positional indexing.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing or mistyped column '{column}': {source}")]
    Column {
        column: &'static str,
        source: sqlx::Error,
    },
}

pub fn col<'r, T>(row: &'r PgRow, name: &'static str) -> Result<T, RowError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|source| RowError::Column { column: name, source })
}

/// One row of `orbis.check_login`: user fields repeated per mapped company.
#[derive(Debug, Clone)]
pub struct LoginRow {
    pub user_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub role_id: i32,
    pub role_name: Option<String>,
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
}

impl LoginRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            user_id: col(row, "UserId")?,
            first_name: col(row, "FirstName")?,
            last_name: col(row, "LastName")?,
            email: col(row, "Email")?,
            role_id: col(row, "RoleId")?,
            role_name: col(row, "RoleName")?,
            company_id: col(row, "CompanyId")?,
            company_name: col(row, "CompanyName")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    #[serde(rename = "UserId")]
    pub user_id: i32,
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "RoleId")]
    pub role_id: i32,
}

impl UserRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            user_id: col(row, "UserId")?,
            first_name: col(row, "FirstName")?,
            last_name: col(row, "LastName")?,
            email: col(row, "Email")?,
            role_id: col(row, "RoleId")?,
        })
    }
}

/// One flat row of `orbis.get_all_comments`: a join of comment, author and
/// at most one reaction-with-count. Feeds the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentReactionRow {
    pub comment_id: i32,
    pub user_id: Option<i32>,
    pub user_name: Option<String>,
    pub comment_text: Option<String>,
    pub parent_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub mentioned_users_info: Option<String>,
    pub r_id: Option<i32>,
    pub emoji_name: Option<String>,
    pub react_count: Option<i64>,
}

impl CommentReactionRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            comment_id: col(row, "CommentID")?,
            user_id: col(row, "UserID")?,
            user_name: col(row, "UserName")?,
            comment_text: col(row, "CommentText")?,
            parent_id: col(row, "ParentID")?,
            created_at: col(row, "CreatedAt")?,
            mentioned_users_info: col(row, "MentionedUsersInfo")?,
            r_id: col(row, "R_Id")?,
            emoji_name: col(row, "EmojiName")?,
            react_count: col(row, "ReactCount")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactKindRow {
    #[serde(rename = "R_Id")]
    pub r_id: i32,
    #[serde(rename = "EmojiName")]
    pub emoji_name: String,
}

impl ReactKindRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            r_id: col(row, "R_Id")?,
            emoji_name: col(row, "EmojiName")?,
        })
    }
}

/// One row of `orbis.get_file_data` (non-deleted records only).
#[derive(Debug, Clone)]
pub struct FileRow {
    pub file_id: i32,
    pub user_id: i32,
    pub process_id: Option<i32>,
    pub file_name: String,
    pub file_type: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub file_format: Option<String>,
    pub description: Option<String>,
    pub uploaded_by_name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub download_count: i32,
    pub tags: Option<String>,
}

impl FileRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            file_id: col(row, "FileID")?,
            user_id: col(row, "UserID")?,
            process_id: col(row, "ProcessID")?,
            file_name: col(row, "FileName")?,
            file_type: col(row, "FileType")?,
            mime_type: col(row, "MimeType")?,
            file_size: col(row, "FileSize")?,
            file_format: col(row, "FileFormat")?,
            description: col(row, "Description")?,
            uploaded_by_name: col(row, "UploadedByName")?,
            created_at: col(row, "CreatedAt")?,
            download_count: col(row, "DownloadCount")?,
            tags: col(row, "Tags")?,
        })
    }
}

/// Download resolution for a single file id; absent row means deleted or unknown.
#[derive(Debug, Clone)]
pub struct DownloadRow {
    pub file_id: i32,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
}

impl DownloadRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            file_id: col(row, "FileID")?,
            file_name: col(row, "FileName")?,
            file_path: col(row, "FilePath")?,
            mime_type: col(row, "MimeType")?,
        })
    }
}

/// Outcome of `orbis.delete_uploaded_file`: a status discriminator plus a
/// human-readable message sourced from the store.
#[derive(Debug, Clone)]
pub struct DeleteOutcomeRow {
    pub status: String,
    pub message: String,
}

impl DeleteOutcomeRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            status: col(row, "Status")?,
            message: col(row, "Message")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompanyRow {
    #[serde(rename = "CompanyId")]
    pub company_id: i32,
    #[serde(rename = "CompanyName")]
    pub company_name: String,
}

impl CompanyRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            company_id: col(row, "CompanyId")?,
            company_name: col(row, "CompanyName")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RulebookRow {
    pub rule_id: i32,
    pub rule_version: Option<String>,
    pub rule_status: Option<String>,
    pub rule_description: Option<String>,
    pub rule_subject: Option<String>,
    pub rule: Option<String>,
    pub rule_stage: Option<String>,
    pub rule_process_name: Option<String>,
    pub rule_process_owner: Option<String>,
}

impl RulebookRow {
    pub fn from_row(row: &PgRow) -> Result<Self, RowError> {
        Ok(Self {
            rule_id: col(row, "RuleId")?,
            rule_version: col(row, "RuleVersion")?,
            rule_status: col(row, "RuleStatus")?,
            rule_description: col(row, "RuleDescription")?,
            rule_subject: col(row, "RuleSubject")?,
            rule: col(row, "Rule")?,
            rule_stage: col(row, "RuleStage")?,
            rule_process_name: col(row, "RuleProcessName")?,
            rule_process_owner: col(row, "RuleProcessOwner")?,
        })
    }
}
