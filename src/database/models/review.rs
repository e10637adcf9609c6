use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Lifecycle state controlling public visibility of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Hidden,
    Removed,
}

impl ModerationStatus {
    /// Transitions into these states change which reviews count toward a tool's rating.
    pub fn affects_aggregates(self) -> bool {
        matches!(
            self,
            ModerationStatus::Approved | ModerationStatus::Hidden | ModerationStatus::Removed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerBrief {
    pub id: i64,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolBrief {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// A review row joined with the reviewer's display name and a brief of the tool.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Review {
    pub id: i64,
    pub tool_id: i64,
    pub user_id: i64,
    pub rating_overall: i32,
    pub rating_ease_of_use: Option<i32>,
    pub rating_value: Option<i32>,
    pub rating_accuracy: Option<i32>,
    pub rating_speed: Option<i32>,
    pub rating_support: Option<i32>,
    pub pros: String,
    pub cons: String,
    pub primary_use_case: Option<String>,
    pub reviewer_role: Option<String>,
    pub company_size: Option<String>,
    pub usage_context: Option<String>,
    pub helpful_count: i32,
    pub moderation_status: ModerationStatus,
    pub moderated_by: Option<i64>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_display_name: String,
    pub tool_slug: String,
    pub tool_name: String,
    pub tool_logo_url: Option<String>,
}

impl Review {
    pub fn reviewer(&self) -> ReviewerBrief {
        ReviewerBrief {
            id: self.user_id,
            display_name: self.user_display_name.clone(),
        }
    }

    pub fn tool(&self) -> ToolBrief {
        ToolBrief {
            id: self.tool_id,
            slug: self.tool_slug.clone(),
            name: self.tool_name.clone(),
            logo_url: self.tool_logo_url.clone(),
        }
    }
}
