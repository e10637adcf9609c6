use async_trait::async_trait;
use sqlx::PgPool;

use crate::api::Page;
use crate::database::manager::DbResult;
use crate::database::models::{ModerationStatus, Review};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    Newest,
    MostHelpful,
    Highest,
    Lowest,
}

impl ReviewSort {
    /// Unknown or missing values fall back to `newest`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("most_helpful") => ReviewSort::MostHelpful,
            Some("highest") => ReviewSort::Highest,
            Some("lowest") => ReviewSort::Lowest,
            _ => ReviewSort::Newest,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            ReviewSort::Newest => "r.created_at DESC, r.id DESC",
            ReviewSort::MostHelpful => "r.helpful_count DESC, r.created_at DESC, r.id DESC",
            ReviewSort::Highest => "r.rating_overall DESC, r.created_at DESC, r.id DESC",
            ReviewSort::Lowest => "r.rating_overall ASC, r.created_at DESC, r.id DESC",
        }
    }
}

/// A validated review ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
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
    pub moderation_status: ModerationStatus,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Approved reviews of a tool only.
    async fn list_approved(
        &self,
        tool_id: i64,
        sort: ReviewSort,
        page: Page,
    ) -> DbResult<(Vec<Review>, i64)>;

    /// Every review written by a user regardless of status, newest first.
    async fn list_by_user(&self, user_id: i64, page: Page) -> DbResult<(Vec<Review>, i64)>;

    async fn has_reviewed(&self, tool_id: i64, user_id: i64) -> DbResult<bool>;

    async fn create(&self, review: &NewReview) -> DbResult<Review>;

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Review>>;

    async fn set_status(
        &self,
        id: i64,
        status: ModerationStatus,
        moderator_id: i64,
    ) -> DbResult<()>;

    /// Recompute `avg_rating_overall` and `review_count` of a tool from its approved reviews.
    async fn refresh_tool_rating(&self, tool_id: i64) -> DbResult<()>;
}

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_REVIEW: &str = "SELECT r.*, u.display_name AS user_display_name, \
     t.slug AS tool_slug, t.name AS tool_name, t.logo_url AS tool_logo_url \
     FROM reviews r \
     JOIN users u ON u.id = r.user_id \
     JOIN tools t ON t.id = r.tool_id";

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn list_approved(
        &self,
        tool_id: i64,
        sort: ReviewSort,
        page: Page,
    ) -> DbResult<(Vec<Review>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reviews WHERE tool_id = $1 AND moderation_status = 'approved'",
        )
        .bind(tool_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "{SELECT_REVIEW} WHERE r.tool_id = $1 AND r.moderation_status = 'approved' \
             ORDER BY {} LIMIT $2 OFFSET $3",
            sort.order_by()
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(tool_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((reviews, total))
    }

    async fn list_by_user(&self, user_id: i64, page: Page) -> DbResult<(Vec<Review>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "{SELECT_REVIEW} WHERE r.user_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            ReviewSort::Newest.order_by()
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((reviews, total))
    }

    async fn has_reviewed(&self, tool_id: i64, user_id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE tool_id = $1 AND user_id = $2)",
        )
        .bind(tool_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, review: &NewReview) -> DbResult<Review> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO reviews (tool_id, user_id, rating_overall, rating_ease_of_use, \
             rating_value, rating_accuracy, rating_speed, rating_support, pros, cons, \
             primary_use_case, reviewer_role, company_size, usage_context, moderation_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING id",
        )
        .bind(review.tool_id)
        .bind(review.user_id)
        .bind(review.rating_overall)
        .bind(review.rating_ease_of_use)
        .bind(review.rating_value)
        .bind(review.rating_accuracy)
        .bind(review.rating_speed)
        .bind(review.rating_support)
        .bind(&review.pros)
        .bind(&review.cons)
        .bind(&review.primary_use_case)
        .bind(&review.reviewer_role)
        .bind(&review.company_size)
        .bind(&review.usage_context)
        .bind(review.moderation_status)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!("{SELECT_REVIEW} WHERE r.id = $1");
        let created = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Review>> {
        let sql = format!("{SELECT_REVIEW} WHERE r.id = $1");
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn set_status(
        &self,
        id: i64,
        status: ModerationStatus,
        moderator_id: i64,
    ) -> DbResult<()> {
        sqlx::query(
            "UPDATE reviews SET moderation_status = $2, moderated_by = $3, moderated_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(moderator_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn refresh_tool_rating(&self, tool_id: i64) -> DbResult<()> {
        sqlx::query(
            "UPDATE tools SET \
             avg_rating_overall = agg.avg_rating, review_count = agg.review_count \
             FROM (SELECT COALESCE(AVG(rating_overall), 0)::DOUBLE PRECISION AS avg_rating, \
                          COUNT(*)::INTEGER AS review_count \
                   FROM reviews WHERE tool_id = $1 AND moderation_status = 'approved') agg \
             WHERE tools.id = $1",
        )
        .bind(tool_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
