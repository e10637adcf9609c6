use chrono::{Duration, Months, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::database::repositories::{
    AnalyticsRepository, OverviewStats, TopCategory, TopTool, TopToolOrder,
};
use crate::database::DatabaseError;
use crate::error::ApiError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTools {
    pub by_bookmarks: Vec<TopTool>,
    pub by_rating: Vec<TopTool>,
    pub by_reviews: Vec<TopTool>,
}

/// `?limit=` for the leaderboards: missing or non-positive means 10, capped at 50.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(l) if l > MAX_LIMIT => MAX_LIMIT,
        Some(l) if l > 0 => l,
        _ => DEFAULT_LIMIT,
    }
}

pub struct AnalyticsService {
    analytics: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(analytics: Arc<dyn AnalyticsRepository>) -> Self {
        Self { analytics }
    }

    pub async fn overview(&self) -> Result<OverviewStats, AnalyticsError> {
        let now = Utc::now();
        let week_ago = now - Duration::days(7);
        let month_ago = now
            .checked_sub_months(Months::new(1))
            .unwrap_or(now - Duration::days(30));
        Ok(self.analytics.overview(week_ago, month_ago).await?)
    }

    pub async fn top_tools(&self, limit: Option<i64>) -> Result<TopTools, AnalyticsError> {
        let limit = clamp_limit(limit);
        Ok(TopTools {
            by_bookmarks: self
                .analytics
                .top_tools(TopToolOrder::Bookmarks, limit)
                .await?,
            by_rating: self.analytics.top_tools(TopToolOrder::Rating, limit).await?,
            by_reviews: self.analytics.top_tools(TopToolOrder::Reviews, limit).await?,
        })
    }

    pub async fn top_categories(&self, limit: Option<i64>) -> Result<Vec<TopCategory>, AnalyticsError> {
        Ok(self.analytics.top_categories(clamp_limit(limit)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 10);
        assert_eq!(clamp_limit(Some(-3)), 10);
        assert_eq!(clamp_limit(Some(7)), 7);
        assert_eq!(clamp_limit(Some(51)), 50);
    }

    #[tokio::test]
    async fn rating_board_skips_unreviewed_tools() {
        let store = MemoryStore::new();
        let category = store.seed_category("chat", "Chat");
        store.seed_tool_with("rated", category.id, |t| {
            t.avg_rating_overall = 4.0;
            t.review_count = 3;
            t.bookmark_count = 1;
        });
        store.seed_tool_with("popular", category.id, |t| t.bookmark_count = 12);

        let svc = AnalyticsService::new(store.repositories().analytics);
        let top = svc.top_tools(None).await.unwrap();
        assert_eq!(top.by_rating.len(), 1);
        assert_eq!(top.by_rating[0].slug, "rated");
        assert_eq!(top.by_bookmarks[0].slug, "popular");
        assert_eq!(top.by_reviews[0].slug, "rated");
    }

    #[tokio::test]
    async fn overview_counts_live_tools() {
        let store = MemoryStore::new();
        let category = store.seed_category("chat", "Chat");
        store.seed_tool("a", category.id);
        store.seed_tool_with("b", category.id, |t| t.archived_at = Some(Utc::now()));
        store.seed_user("u@example.com", "U");

        let stats = AnalyticsService::new(store.repositories().analytics)
            .overview()
            .await
            .unwrap();
        assert_eq!(stats.total_tools, 1);
        assert_eq!(stats.total_categories, 1);
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.new_users_week, 1);
    }
}
