use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Screenshot,
    Video,
}

/// Screenshot or video attached to a tool
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Media {
    pub id: i64,
    pub tool_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}
