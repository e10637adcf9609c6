use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::database::models::Badge;
use crate::database::repositories::{BadgeRepository, ToolRepository};
use crate::database::DatabaseError;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("Badge not found")]
    NotFound,
    #[error("Tool not found")]
    ToolNotFound,
    #[error("Badge already assigned to tool")]
    AlreadyAssigned,
    #[error("Badge not assigned to tool")]
    NotAssigned,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<BadgeError> for ApiError {
    fn from(err: BadgeError) -> Self {
        let message = err.to_string();
        match err {
            BadgeError::NotFound | BadgeError::ToolNotFound | BadgeError::NotAssigned => {
                ApiError::not_found(message)
            }
            BadgeError::AlreadyAssigned => ApiError::conflict("ALREADY_ASSIGNED", message),
            BadgeError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssignBadgeInput {
    pub badge_id: i64,
}

pub struct BadgeService {
    badges: Arc<dyn BadgeRepository>,
    tools: Arc<dyn ToolRepository>,
}

impl BadgeService {
    pub fn new(badges: Arc<dyn BadgeRepository>, tools: Arc<dyn ToolRepository>) -> Self {
        Self { badges, tools }
    }

    pub async fn list(&self) -> Result<Vec<Badge>, BadgeError> {
        Ok(self.badges.list().await?)
    }

    pub async fn for_tool(&self, tool_id: i64) -> Result<Vec<Badge>, BadgeError> {
        Ok(self.badges.list_for_tool(tool_id).await?)
    }

    pub async fn assign(&self, tool_id: i64, badge_id: i64) -> Result<(), BadgeError> {
        self.badges
            .find_by_id(badge_id)
            .await?
            .ok_or(BadgeError::NotFound)?;
        self.tools
            .find_by_id(tool_id)
            .await?
            .ok_or(BadgeError::ToolNotFound)?;

        if self.badges.is_assigned(tool_id, badge_id).await? {
            return Err(BadgeError::AlreadyAssigned);
        }

        self.badges.assign(tool_id, badge_id).await.map_err(|e| {
            if e.is_unique_violation() {
                BadgeError::AlreadyAssigned
            } else {
                BadgeError::Database(e)
            }
        })
    }

    pub async fn remove(&self, tool_id: i64, badge_id: i64) -> Result<(), BadgeError> {
        if !self.badges.is_assigned(tool_id, badge_id).await? {
            return Err(BadgeError::NotAssigned);
        }
        Ok(self.badges.unassign(tool_id, badge_id).await?)
    }
}
