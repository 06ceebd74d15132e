use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::discussion::DiscussionService;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(rename = "CommentText")]
    pub comment_text: Option<String>,
    #[serde(rename = "ParentID")]
    pub parent_id: Option<i32>,
    #[serde(rename = "MentionedUserIDs")]
    pub mentioned_user_ids: Option<Vec<i32>>,
}

/// POST /api/add-comment - add a comment or reply, with optional mentions
pub async fn add_comment(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<Json<Value>, ApiError> {
    let comment_text = payload
        .comment_text
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("CommentText is required"))?;

    let service = DiscussionService::new()?;
    let comment_id = service
        .insert_comment(
            user.user_id,
            comment_text,
            payload.parent_id,
            payload.mentioned_user_ids.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(user_id = user.user_id, "insert comment failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(json!({
        "success": true,
        "CommentID": comment_id,
        "UserID": user.user_id,
        "UserName": user.user_name,
        "ParentID": payload.parent_id,
        "CommentText": comment_text,
        "MentionedUserIDs": payload.mentioned_user_ids.unwrap_or_default(),
    })))
}

/// GET /api/get-comments - all comments with their aggregated reactions
pub async fn get_comments() -> Result<Json<Value>, ApiError> {
    let comments = DiscussionService::new()?.fetch_comments().await?;

    Ok(Json(json!({
        "success": true,
        "comments": comments,
    })))
}

/// GET /api/get-all-reacts - available reaction kinds
pub async fn get_all_reacts() -> Result<Json<Value>, ApiError> {
    let reacts = DiscussionService::new()?.list_react_kinds().await?;

    Ok(Json(json!({
        "success": true,
        "reacts": reacts,
    })))
}

#[derive(Debug, Deserialize)]
pub struct InsertReactRequest {
    #[serde(rename = "emojiName")]
    pub emoji_name: Option<String>,
}

/// POST /api/insert-reactions - register a new reaction kind
pub async fn insert_reactions(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<InsertReactRequest>,
) -> Result<Json<Value>, ApiError> {
    let emoji_name = payload
        .emoji_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("EmojiName is required"))?;

    let r_id = DiscussionService::new()?
        .insert_react_kind(emoji_name)
        .await
        .map_err(|e| {
            tracing::error!(user_id = user.user_id, "insert react kind failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Emoji added successfully",
        "R_Id": r_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReactCommentRequest {
    #[serde(rename = "CommentID")]
    pub comment_id: Option<i32>,
    #[serde(rename = "R_Id")]
    pub r_id: Option<i32>,
}

/// POST /api/react-comment - attach a reaction to a comment
pub async fn react_comment(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ReactCommentRequest>,
) -> Result<Json<Value>, ApiError> {
    let (comment_id, r_id) = match (payload.comment_id, payload.r_id) {
        (Some(comment_id), Some(r_id)) => (comment_id, r_id),
        _ => return Err(ApiError::validation("CommentID and R_Id are required")),
    };

    DiscussionService::new()?
        .insert_reaction(comment_id, user.user_id, r_id)
        .await
        .map_err(|e| {
            tracing::error!(
                comment_id,
                user_id = user.user_id,
                "insert reaction failed: {}",
                e
            );
            ApiError::from(e)
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Reaction added successfully.",
    })))
}
