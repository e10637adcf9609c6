use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::{Badge, Category, Media, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "relationship_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Similar,
    Alternative,
}

/// A row of the `tools` table.
///
/// `avg_rating_overall`, `review_count` and `bookmark_count` are denormalized
/// counters maintained by the review and bookmark services.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Tool {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_use_cases: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_roles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<String>,
    pub has_free_tier: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
    pub primary_category_id: i64,
    pub avg_rating_overall: f64,
    pub review_count: i32,
    pub bookmark_count: i32,
    pub trending_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Tool {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Tool with its related rows loaded. `media` is only populated on detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDetail {
    #[serde(flatten)]
    pub tool: Tool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<Category>,
    pub tags: Vec<Tag>,
    pub badges: Vec<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
}

impl ToolDetail {
    pub fn bare(tool: Tool) -> Self {
        Self {
            tool,
            primary_category: None,
            tags: Vec::new(),
            badges: Vec::new(),
            media: None,
        }
    }
}
