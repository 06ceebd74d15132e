//! Aggregation of flat comment/reaction rows into comments-with-reactions.
//!
//! The store returns one row per (comment, reaction-kind) pair, with comment
//! and author fields repeated and the reaction fields null for comments
//! nobody reacted to. [`aggregate`] folds that shape into the nested form the
//! frontend renders.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::database::rows::CommentReactionRow;

/// Display name substituted when the author column comes back null
/// (e.g. the account was removed after commenting).
const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reaction {
    #[serde(rename = "R_Id")]
    pub r_id: i32,
    #[serde(rename = "EmojiName")]
    pub emoji_name: String,
    #[serde(rename = "Count")]
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Comment {
    #[serde(rename = "CommentID")]
    pub comment_id: i32,
    #[serde(rename = "UserID")]
    pub user_id: Option<i32>,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "CommentText")]
    pub comment_text: String,
    /// Reply target, carried through as-is. The aggregated view stays flat;
    /// nesting replies under parents is the frontend's concern.
    #[serde(rename = "ParentID")]
    pub parent_id: Option<i32>,
    #[serde(rename = "CreatedAt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "MentionedUsersInfo")]
    pub mentioned_users: Vec<Value>,
    #[serde(rename = "Reactions")]
    pub reactions: Vec<Reaction>,
}

impl Comment {
    fn from_first_row(row: &CommentReactionRow) -> Self {
        Self {
            comment_id: row.comment_id,
            user_id: row.user_id,
            user_name: row
                .user_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_USER.to_string()),
            comment_text: row.comment_text.clone().unwrap_or_default(),
            parent_id: row.parent_id,
            created_at: row.created_at,
            mentioned_users: parse_mentions(row.mentioned_users_info.as_deref()),
            reactions: Vec::new(),
        }
    }
}

/// Fold flat rows into unique comments, first-seen order preserved, each
/// carrying its accumulated reaction list.
///
/// Single linear pass over the input. A comment with no reaction rows ends up
/// with an empty `Reactions` list, never a missing field. At most one
/// reaction entry survives per (comment, kind) pair; the first row for a pair
/// wins.
pub fn aggregate(rows: impl IntoIterator<Item = CommentReactionRow>) -> Vec<Comment> {
    let mut ordered: Vec<Comment> = Vec::new();
    let mut index_by_id: HashMap<i32, usize> = HashMap::new();

    for row in rows {
        let idx = match index_by_id.get(&row.comment_id) {
            Some(&idx) => idx,
            None => {
                ordered.push(Comment::from_first_row(&row));
                index_by_id.insert(row.comment_id, ordered.len() - 1);
                ordered.len() - 1
            }
        };

        let comment = &mut ordered[idx];

        if let Some(r_id) = row.r_id {
            if !comment.reactions.iter().any(|r| r.r_id == r_id) {
                comment.reactions.push(Reaction {
                    r_id,
                    emoji_name: row.emoji_name.unwrap_or_default(),
                    count: row.react_count.unwrap_or(0),
                });
            }
        }

        // Later rows can carry mentions the first row lacked when the join
        // splits them across reaction rows.
        if comment.mentioned_users.is_empty() {
            if let Some(raw) = row.mentioned_users_info.as_deref() {
                comment.mentioned_users = parse_mentions(Some(raw));
            }
        }
    }

    ordered
}

/// Parse the store's JSON mentions column. Anything other than a JSON array
/// (including malformed payloads) becomes an empty list rather than an error;
/// a bad mention blob must not take the whole discussion feed down.
fn parse_mentions(raw: Option<&str>) -> Vec<Value> {
    match raw {
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        None => Vec::new(),
    }
}
