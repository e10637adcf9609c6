use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::api::Page;
use crate::database::models::{
    ModeratedReview, ModerationActionType, ModerationHistoryEntry, QueuedReport, Report,
    ReportReason, ReportStatus, ReportTarget,
};
use crate::database::repositories::{
    NewReport, ReportFilter, ReportRepository, ReviewRepository, ToolRepository,
};
use crate::database::DatabaseError;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Tool not found")]
    ToolNotFound,
    #[error("Review not found")]
    ReviewNotFound,
    #[error("Report not found")]
    ReportNotFound,
    #[error("Invalid reason. Must be: spam, abuse, misinformation, or other")]
    InvalidReason,
    #[error("Invalid status. Must be: pending, reviewed, or dismissed")]
    InvalidStatus,
    #[error("You have already reported this {0} today")]
    AlreadyReported(&'static str),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        let message = err.to_string();
        match err {
            ModerationError::ToolNotFound
            | ModerationError::ReviewNotFound
            | ModerationError::ReportNotFound => ApiError::not_found(message),
            ModerationError::InvalidReason | ModerationError::InvalidStatus => {
                ApiError::validation_error(message)
            }
            ModerationError::AlreadyReported(_) => ApiError::conflict("ALREADY_REPORTED", message),
            ModerationError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateReportInput {
    pub reason: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateReportInput {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModerateInput {
    pub notes: Option<String>,
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

pub struct ModerationService {
    reports: Arc<dyn ReportRepository>,
    reviews: Arc<dyn ReviewRepository>,
    tools: Arc<dyn ToolRepository>,
}

impl ModerationService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        reviews: Arc<dyn ReviewRepository>,
        tools: Arc<dyn ToolRepository>,
    ) -> Self {
        Self {
            reports,
            reviews,
            tools,
        }
    }

    pub async fn report_tool(
        &self,
        slug: &str,
        reporter: Option<i64>,
        input: CreateReportInput,
    ) -> Result<Report, ModerationError> {
        let tool = self
            .tools
            .find_by_slug(slug)
            .await?
            .ok_or(ModerationError::ToolNotFound)?;
        self.file_report(ReportTarget::Tool(tool.id), reporter, input)
            .await
    }

    pub async fn report_review(
        &self,
        review_id: i64,
        reporter: Option<i64>,
        input: CreateReportInput,
    ) -> Result<Report, ModerationError> {
        self.reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ModerationError::ReviewNotFound)?;
        self.file_report(ReportTarget::Review(review_id), reporter, input)
            .await
    }

    /// Signed-in reporters may report a given target once per UTC day; anonymous reports are
    /// never deduplicated.
    async fn file_report(
        &self,
        target: ReportTarget,
        reporter: Option<i64>,
        input: CreateReportInput,
    ) -> Result<Report, ModerationError> {
        let reason = ReportReason::parse(&input.reason).ok_or(ModerationError::InvalidReason)?;

        if let Some(reporter_id) = reporter {
            let since = start_of_day(Utc::now());
            if self.reports.count_since(reporter_id, target, since).await? > 0 {
                let noun = match target {
                    ReportTarget::Tool(_) => "tool",
                    ReportTarget::Review(_) => "review",
                };
                return Err(ModerationError::AlreadyReported(noun));
            }
        }

        let report = self
            .reports
            .create(&NewReport {
                target,
                reporter_user_id: reporter,
                reason,
                comment: input.comment.filter(|c| !c.is_empty()),
            })
            .await?;
        tracing::info!(
            "Report {} filed against {:?} {}",
            report.id,
            target.kind(),
            target.id()
        );
        Ok(report)
    }

    /// Reports matching `filter`, each with its target attached when the target still exists.
    pub async fn queue(
        &self,
        filter: ReportFilter,
        page: Page,
    ) -> Result<(Vec<QueuedReport>, i64), ModerationError> {
        let (reports, total) = self.reports.list(filter, page).await?;

        let mut queued = Vec::with_capacity(reports.len());
        for report in reports {
            let mut entry = QueuedReport {
                report,
                tool: None,
                review: None,
            };
            match entry.report.target {
                ReportTarget::Tool(id) => {
                    if let Some(tool) = self.tools.find_by_id(id).await? {
                        entry.tool = Some(self.tools.load_detail(tool).await?);
                    }
                }
                ReportTarget::Review(id) => {
                    entry.review = self
                        .reviews
                        .find_by_id(id)
                        .await?
                        .map(|review| ModeratedReview::from(&review));
                }
            }
            queued.push(entry);
        }

        Ok((queued, total))
    }

    pub async fn pending_reports(&self, page: Page) -> Result<(Vec<Report>, i64), ModerationError> {
        let filter = ReportFilter {
            kind: None,
            status: Some(ReportStatus::Pending),
        };
        Ok(self.reports.list(filter, page).await?)
    }

    pub async fn get_report(&self, id: i64) -> Result<Report, ModerationError> {
        self.reports
            .find_by_id(id)
            .await?
            .ok_or(ModerationError::ReportNotFound)
    }

    pub async fn update_report_status(
        &self,
        id: i64,
        status: &str,
        moderator_id: i64,
    ) -> Result<(), ModerationError> {
        let status = ReportStatus::parse(status).ok_or(ModerationError::InvalidStatus)?;
        self.get_report(id).await?;
        self.reports.set_status(id, status, moderator_id).await?;
        Ok(())
    }

    /// Apply a moderator decision to a review and return it as it now stands.
    ///
    /// The audit row and the rating refresh are best effort.
    pub async fn moderate(
        &self,
        review_id: i64,
        moderator_id: i64,
        action: ModerationActionType,
        notes: Option<String>,
    ) -> Result<ModeratedReview, ModerationError> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ModerationError::ReviewNotFound)?;

        let status = action.target_status();
        self.reviews
            .set_status(review_id, status, moderator_id)
            .await?;

        let notes = notes.filter(|n| !n.is_empty());
        if let Err(e) = self
            .reports
            .record_action(review_id, moderator_id, action, notes.as_deref())
            .await
        {
            tracing::warn!(
                "Failed to record {:?} of review {} by {}: {}",
                action,
                review_id,
                moderator_id,
                e
            );
        }

        if status.affects_aggregates() {
            if let Err(e) = self.reviews.refresh_tool_rating(review.tool_id).await {
                tracing::warn!("Failed to refresh rating of tool {}: {}", review.tool_id, e);
            }
        }

        let refreshed = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ModerationError::ReviewNotFound)?;
        Ok(ModeratedReview::from(&refreshed))
    }

    pub async fn history(
        &self,
        review_id: i64,
    ) -> Result<Vec<ModerationHistoryEntry>, ModerationError> {
        self.reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ModerationError::ReviewNotFound)?;
        let actions = self.reports.history(review_id).await?;
        Ok(actions.into_iter().map(ModerationHistoryEntry::from).collect())
    }
}
