use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::api::Page;
use crate::database::manager::DbResult;
use crate::database::models::{
    ModerationAction, ModerationActionType, Report, ReportReason, ReportRow, ReportStatus,
    ReportTarget, ReportableType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub target: ReportTarget,
    pub reporter_user_id: Option<i64>,
    pub reason: ReportReason,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub kind: Option<ReportableType>,
    pub status: Option<ReportStatus>,
}

/// Reports plus the review moderation audit trail.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Inserted with status `pending`.
    async fn create(&self, report: &NewReport) -> DbResult<Report>;

    /// Reports filed by `reporter_id` against `target` at or after `since`.
    async fn count_since(
        &self,
        reporter_id: i64,
        target: ReportTarget,
        since: DateTime<Utc>,
    ) -> DbResult<i64>;

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Report>>;

    /// Newest first.
    async fn list(&self, filter: ReportFilter, page: Page) -> DbResult<(Vec<Report>, i64)>;

    async fn set_status(&self, id: i64, status: ReportStatus, reviewed_by: i64) -> DbResult<()>;

    async fn record_action(
        &self,
        review_id: i64,
        moderator_id: i64,
        action: ModerationActionType,
        notes: Option<&str>,
    ) -> DbResult<()>;

    /// Audit rows of a review, newest first.
    async fn history(&self, review_id: i64) -> DbResult<Vec<ModerationAction>>;
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: ReportFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND reportable_type = ").push_bind(kind);
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, report: &NewReport) -> DbResult<Report> {
        let row = sqlx::query_as::<_, ReportRow>(
            "INSERT INTO reports (reportable_type, reportable_id, reporter_user_id, reason, comment, status) \
             VALUES ($1, $2, $3, $4, $5, 'pending') RETURNING *",
        )
        .bind(report.target.kind())
        .bind(report.target.id())
        .bind(report.reporter_user_id)
        .bind(report.reason)
        .bind(&report.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn count_since(
        &self,
        reporter_id: i64,
        target: ReportTarget,
        since: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE reporter_user_id = $1 \
             AND reportable_type = $2 AND reportable_id = $3 AND created_at >= $4",
        )
        .bind(reporter_id)
        .bind(target.kind())
        .bind(target.id())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Report>> {
        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Report::from))
    }

    async fn list(&self, filter: ReportFilter, page: Page) -> DbResult<(Vec<Report>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports");
        push_filter(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM reports");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<ReportRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Report::from).collect(), total))
    }

    async fn set_status(&self, id: i64, status: ReportStatus, reviewed_by: i64) -> DbResult<()> {
        sqlx::query(
            "UPDATE reports SET status = $2, reviewed_by = $3, reviewed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(reviewed_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_action(
        &self,
        review_id: i64,
        moderator_id: i64,
        action: ModerationActionType,
        notes: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO moderation_actions (review_id, moderator_id, action_type, notes) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(review_id)
        .bind(moderator_id)
        .bind(action)
        .bind(notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn history(&self, review_id: i64) -> DbResult<Vec<ModerationAction>> {
        let actions = sqlx::query_as::<_, ModerationAction>(
            "SELECT ma.*, COALESCE(u.display_name, '') AS moderator_display_name \
             FROM moderation_actions ma LEFT JOIN users u ON u.id = ma.moderator_id \
             WHERE ma.review_id = $1 ORDER BY ma.created_at DESC, ma.id DESC",
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(actions)
    }
}
