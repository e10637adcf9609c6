use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reportable_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportableType {
    Tool,
    Review,
}

impl ReportableType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tool" => Some(ReportableType::Tool),
            "review" => Some(ReportableType::Review),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_reason", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportReason {
    Spam,
    Abuse,
    Misinformation,
    Other,
}

impl ReportReason {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "spam" => Some(ReportReason::Spam),
            "abuse" => Some(ReportReason::Abuse),
            "misinformation" => Some(ReportReason::Misinformation),
            "other" => Some(ReportReason::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Dismissed,
}

impl ReportStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReportStatus::Pending),
            "reviewed" => Some(ReportStatus::Reviewed),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

/// The thing a report is filed against.
///
/// Serialized as the pair `reportable_type` / `reportable_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "reportable_type", content = "reportable_id", rename_all = "lowercase")]
pub enum ReportTarget {
    Tool(i64),
    Review(i64),
}

impl ReportTarget {
    pub fn new(kind: ReportableType, id: i64) -> Self {
        match kind {
            ReportableType::Tool => ReportTarget::Tool(id),
            ReportableType::Review => ReportTarget::Review(id),
        }
    }

    pub fn kind(&self) -> ReportableType {
        match self {
            ReportTarget::Tool(_) => ReportableType::Tool,
            ReportTarget::Review(_) => ReportableType::Review,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ReportTarget::Tool(id) | ReportTarget::Review(id) => *id,
        }
    }
}

/// Raw `reports` row
#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub reportable_type: ReportableType,
    pub reportable_id: i64,
    pub reporter_user_id: Option<i64>,
    pub reason: ReportReason,
    pub comment: Option<String>,
    pub status: ReportStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: i64,
    #[serde(flatten)]
    pub target: ReportTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_user_id: Option<i64>,
    pub reason: ReportReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            target: ReportTarget::new(row.reportable_type, row.reportable_id),
            reporter_user_id: row.reporter_user_id,
            reason: row.reason,
            comment: row.comment,
            status: row.status,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
        }
    }
}
