use sqlx::PgPool;

use super::StoreError;
use crate::comments::{aggregate, Comment};
use crate::database::rows::{col, CommentReactionRow, ReactKindRow};
use crate::database::Database;

/// Comments, replies and reactions against the discussion routines.
pub struct DiscussionService {
    pool: PgPool,
}

impl DiscussionService {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            pool: Database::pool()?,
        })
    }

    /// Insert a comment or reply with optional mentions. The insert and its
    /// commit are atomic; any failure before commit rolls the whole write
    /// back when the transaction drops.
    pub async fn insert_comment(
        &self,
        user_id: i32,
        comment_text: &str,
        parent_id: Option<i32>,
        mentioned_user_ids: Option<&[i32]>,
    ) -> Result<i32, StoreError> {
        let mentioned_json = mentioned_user_ids
            .filter(|ids| !ids.is_empty())
            .and_then(|ids| serde_json::to_string(ids).ok());

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"SELECT "NewCommentID" FROM orbis.insert_comment($1, $2, $3, $4)"#,
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(comment_text)
        .bind(mentioned_json)
        .fetch_one(&mut *tx)
        .await?;
        let new_comment_id: i32 = col(&row, "NewCommentID")?;
        tx.commit().await?;

        Ok(new_comment_id)
    }

    /// All comments with their accumulated reactions, first-seen order.
    pub async fn fetch_comments(&self) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.get_all_comments()")
            .fetch_all(&self.pool)
            .await?;

        let rows = rows
            .iter()
            .map(CommentReactionRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(aggregate(rows))
    }

    pub async fn list_react_kinds(&self) -> Result<Vec<ReactKindRow>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.get_all_reacts()")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| ReactKindRow::from_row(row).map_err(StoreError::from))
            .collect()
    }

    /// Register a new reaction kind (emoji), returning its id.
    pub async fn insert_react_kind(&self, emoji_name: &str) -> Result<i32, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(r#"SELECT "R_Id" FROM orbis.insert_react_kind($1)"#)
            .bind(emoji_name)
            .fetch_one(&mut *tx)
            .await?;
        let r_id: i32 = col(&row, "R_Id")?;
        tx.commit().await?;

        Ok(r_id)
    }

    /// Attach a reaction to a comment on behalf of a user.
    pub async fn insert_reaction(
        &self,
        comment_id: i32,
        user_id: i32,
        r_id: i32,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT orbis.insert_comment_reaction($1, $2, $3)")
            .bind(comment_id)
            .bind(user_id)
            .bind(r_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
