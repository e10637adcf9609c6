use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::{ModerationStatus, Report, Review, ReviewerBrief, ToolBrief, ToolDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "moderation_action_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModerationActionType {
    Approve,
    Hide,
    Remove,
    Restore,
}

impl ModerationActionType {
    /// Review status a moderator action moves the review into.
    pub fn target_status(self) -> ModerationStatus {
        match self {
            ModerationActionType::Approve | ModerationActionType::Restore => {
                ModerationStatus::Approved
            }
            ModerationActionType::Hide => ModerationStatus::Hidden,
            ModerationActionType::Remove => ModerationStatus::Removed,
        }
    }
}

/// Audit row joined with the moderator's display name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ModerationAction {
    pub id: i64,
    pub review_id: i64,
    pub moderator_id: i64,
    pub action_type: ModerationActionType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub moderator_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeratorBrief {
    pub id: i64,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModerationHistoryEntry {
    pub id: i64,
    pub action_type: ModerationActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub moderator: ModeratorBrief,
}

impl From<ModerationAction> for ModerationHistoryEntry {
    fn from(action: ModerationAction) -> Self {
        Self {
            id: action.id,
            action_type: action.action_type,
            notes: action.notes,
            created_at: action.created_at,
            moderator: ModeratorBrief {
                id: action.moderator_id,
                display_name: action.moderator_display_name,
            },
        }
    }
}

/// Full review as seen from the moderation back-office
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeratedReview {
    pub id: i64,
    pub tool_id: i64,
    pub user_id: i64,
    pub rating_overall: i32,
    pub pros: String,
    pub cons: String,
    pub helpful_count: i32,
    pub moderation_status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user: ReviewerBrief,
    pub tool: ToolBrief,
}

impl From<&Review> for ModeratedReview {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            tool_id: review.tool_id,
            user_id: review.user_id,
            rating_overall: review.rating_overall,
            pros: review.pros.clone(),
            cons: review.cons.clone(),
            helpful_count: review.helpful_count,
            moderation_status: review.moderation_status,
            moderated_by: review.moderated_by,
            moderated_at: review.moderated_at,
            created_at: review.created_at,
            user: review.reviewer(),
            tool: review.tool(),
        }
    }
}

/// Queue entry: a report plus its target, when the target still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedReport {
    #[serde(flatten)]
    pub report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ModeratedReview>,
}
