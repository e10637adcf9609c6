use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::database::models::{Bookmark, BookmarkOwner, ToolDetail};
use crate::database::repositories::{BookmarkRepository, ToolRepository};
use crate::database::DatabaseError;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("tool_id is required")]
    ToolIdRequired,
    #[error("Tool not found")]
    ToolNotFound,
    #[error("Tool is already bookmarked")]
    AlreadyBookmarked,
    #[error("Bookmark not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<BookmarkError> for ApiError {
    fn from(err: BookmarkError) -> Self {
        let message = err.to_string();
        match err {
            BookmarkError::ToolIdRequired => ApiError::invalid_request(message),
            BookmarkError::ToolNotFound | BookmarkError::NotFound => ApiError::not_found(message),
            BookmarkError::AlreadyBookmarked => ApiError::conflict("ALREADY_BOOKMARKED", message),
            BookmarkError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddBookmarkInput {
    pub tool_id: i64,
}

pub struct BookmarkService {
    bookmarks: Arc<dyn BookmarkRepository>,
    tools: Arc<dyn ToolRepository>,
}

impl BookmarkService {
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>, tools: Arc<dyn ToolRepository>) -> Self {
        Self { bookmarks, tools }
    }

    /// Callers without any identity simply have no bookmarks.
    pub async fn list(&self, owner: Option<&BookmarkOwner>) -> Result<Vec<ToolDetail>, BookmarkError> {
        match owner {
            Some(owner) => Ok(self.bookmarks.list_tools(owner).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn add(&self, owner: &BookmarkOwner, tool_id: i64) -> Result<Bookmark, BookmarkError> {
        if tool_id == 0 {
            return Err(BookmarkError::ToolIdRequired);
        }

        let tool = self
            .tools
            .find_by_id(tool_id)
            .await?
            .filter(|t| !t.is_archived())
            .ok_or(BookmarkError::ToolNotFound)?;

        if self.bookmarks.find(owner, tool_id).await?.is_some() {
            return Err(BookmarkError::AlreadyBookmarked);
        }

        let row = self.bookmarks.create(owner, tool_id).await.map_err(|e| {
            if e.is_unique_violation() {
                BookmarkError::AlreadyBookmarked
            } else {
                BookmarkError::Database(e)
            }
        })?;

        if let Err(e) = self.tools.adjust_bookmark_count(tool_id, 1).await {
            tracing::warn!("Failed to increment bookmark count of tool {}: {}", tool_id, e);
        }

        let tool = self.tools.load_detail(tool).await?;
        Ok(Bookmark {
            id: row.id,
            tool_id: row.tool_id,
            tool,
            created_at: row.created_at,
        })
    }

    pub async fn remove(
        &self,
        owner: Option<&BookmarkOwner>,
        tool_id: i64,
    ) -> Result<(), BookmarkError> {
        let owner = owner.ok_or(BookmarkError::NotFound)?;
        if !self.bookmarks.delete(owner, tool_id).await? {
            return Err(BookmarkError::NotFound);
        }

        if let Err(e) = self.tools.adjust_bookmark_count(tool_id, -1).await {
            tracing::warn!("Failed to decrement bookmark count of tool {}: {}", tool_id, e);
        }
        Ok(())
    }

    /// Hand a browser session's bookmarks over to the account that just signed in.
    ///
    /// Never fails; problems are logged and the session's bookmarks stay where they were.
    pub async fn migrate_session(&self, user_id: i64, session_id: &str) {
        match self.bookmarks.migrate_session(user_id, session_id).await {
            Ok(0) => {}
            Ok(moved) => tracing::info!("Moved {} session bookmarks to user {}", moved, user_id),
            Err(e) => tracing::warn!(
                "Failed to migrate bookmarks of session {} to user {}: {}",
                session_id,
                user_id,
                e
            ),
        }
    }
}
