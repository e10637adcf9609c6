use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::ToolDetail;

/// Who a bookmark belongs to: a signed-in account or an anonymous browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookmarkOwner {
    User(i64),
    Session(String),
}

impl BookmarkOwner {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            BookmarkOwner::User(id) => Some(*id),
            BookmarkOwner::Session(_) => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            BookmarkOwner::User(_) => None,
            BookmarkOwner::Session(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BookmarkRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub tool_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Freshly created bookmark along with the tool it points at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bookmark {
    pub id: i64,
    pub tool_id: i64,
    pub tool: ToolDetail,
    pub created_at: DateTime<Utc>,
}
