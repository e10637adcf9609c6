use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DbResult;

/// Platform totals for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct OverviewStats {
    pub total_tools: i64,
    pub total_categories: i64,
    pub total_reviews: i64,
    pub total_bookmarks: i64,
    pub total_users: i64,
    pub new_tools_week: i64,
    pub new_tools_month: i64,
    pub new_reviews_week: i64,
    pub new_users_week: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TopTool {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub bookmark_count: i32,
    pub review_count: i32,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TopCategory {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub tool_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopToolOrder {
    Bookmarks,
    /// Only tools with at least one review
    Rating,
    Reviews,
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn overview(
        &self,
        week_ago: DateTime<Utc>,
        month_ago: DateTime<Utc>,
    ) -> DbResult<OverviewStats>;
    async fn top_tools(&self, order: TopToolOrder, limit: i64) -> DbResult<Vec<TopTool>>;
    async fn top_categories(&self, limit: i64) -> DbResult<Vec<TopCategory>>;
}

pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn overview(
        &self,
        week_ago: DateTime<Utc>,
        month_ago: DateTime<Utc>,
    ) -> DbResult<OverviewStats> {
        let stats = sqlx::query_as::<_, OverviewStats>(
            "SELECT \
             (SELECT COUNT(*) FROM tools WHERE archived_at IS NULL) AS total_tools, \
             (SELECT COUNT(*) FROM categories) AS total_categories, \
             (SELECT COUNT(*) FROM reviews) AS total_reviews, \
             (SELECT COUNT(*) FROM bookmarks) AS total_bookmarks, \
             (SELECT COUNT(*) FROM users) AS total_users, \
             (SELECT COUNT(*) FROM tools WHERE created_at >= $1 AND archived_at IS NULL) AS new_tools_week, \
             (SELECT COUNT(*) FROM tools WHERE created_at >= $2 AND archived_at IS NULL) AS new_tools_month, \
             (SELECT COUNT(*) FROM reviews WHERE created_at >= $1) AS new_reviews_week, \
             (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS new_users_week",
        )
        .bind(week_ago)
        .bind(month_ago)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn top_tools(&self, order: TopToolOrder, limit: i64) -> DbResult<Vec<TopTool>> {
        let (filter, order_by) = match order {
            TopToolOrder::Bookmarks => ("", "t.bookmark_count DESC"),
            TopToolOrder::Rating => (
                " AND t.review_count >= 1",
                "t.avg_rating_overall DESC, t.review_count DESC",
            ),
            TopToolOrder::Reviews => ("", "t.review_count DESC"),
        };
        let sql = format!(
            "SELECT t.id, t.slug, t.name, t.logo_url, t.bookmark_count, t.review_count, \
             t.avg_rating_overall AS avg_rating \
             FROM tools t WHERE t.archived_at IS NULL{filter} \
             ORDER BY {order_by}, t.id LIMIT $1"
        );
        let tools = sqlx::query_as::<_, TopTool>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(tools)
    }

    async fn top_categories(&self, limit: i64) -> DbResult<Vec<TopCategory>> {
        let categories = sqlx::query_as::<_, TopCategory>(
            "SELECT c.id, c.slug, c.name, COUNT(t.id) AS tool_count \
             FROM categories c \
             LEFT JOIN tools t ON t.primary_category_id = c.id AND t.archived_at IS NULL \
             GROUP BY c.id, c.slug, c.name \
             ORDER BY tool_count DESC, c.id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }
}
