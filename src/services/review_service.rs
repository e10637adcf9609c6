use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::api::Page;
use crate::database::models::{ModerationStatus, Review, ReviewerBrief};
use crate::database::repositories::{NewReview, ReviewRepository, ReviewSort, ToolRepository};
use crate::database::DatabaseError;
use crate::error::ApiError;

/// Maximum length of `pros` and `cons`, counted in characters
pub const MAX_TEXT_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Tool not found")]
    ToolNotFound,
    #[error("Rating is required")]
    RatingRequired,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Pros field is required")]
    ProsRequired,
    #[error("Pros must be 500 characters or less")]
    ProsTooLong,
    #[error("Cons field is required")]
    ConsRequired,
    #[error("Cons must be 500 characters or less")]
    ConsTooLong,
    #[error("You have already reviewed this tool")]
    AlreadyReviewed,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        let message = err.to_string();
        match err {
            ReviewError::ToolNotFound => ApiError::not_found(message),
            ReviewError::RatingRequired => ApiError::validation(message, "rating_overall", "required"),
            ReviewError::InvalidRating => ApiError::validation(message, "rating", "invalid"),
            ReviewError::ProsRequired => ApiError::validation(message, "pros", "required"),
            ReviewError::ProsTooLong => ApiError::validation(message, "pros", "too_long"),
            ReviewError::ConsRequired => ApiError::validation(message, "cons", "required"),
            ReviewError::ConsTooLong => ApiError::validation(message, "cons", "too_long"),
            ReviewError::AlreadyReviewed => ApiError::conflict("ALREADY_REVIEWED", message),
            ReviewError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateReviewInput {
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
}

impl CreateReviewInput {
    /// First violated rule wins.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.rating_overall == 0 {
            return Err(ReviewError::RatingRequired);
        }
        let secondary = [
            self.rating_ease_of_use,
            self.rating_value,
            self.rating_accuracy,
            self.rating_speed,
            self.rating_support,
        ];
        if !in_range(self.rating_overall) || secondary.into_iter().flatten().any(|r| !in_range(r)) {
            return Err(ReviewError::InvalidRating);
        }

        if self.pros.is_empty() {
            return Err(ReviewError::ProsRequired);
        }
        if self.pros.chars().count() > MAX_TEXT_LEN {
            return Err(ReviewError::ProsTooLong);
        }
        if self.cons.is_empty() {
            return Err(ReviewError::ConsRequired);
        }
        if self.cons.chars().count() > MAX_TEXT_LEN {
            return Err(ReviewError::ConsTooLong);
        }
        Ok(())
    }
}

fn in_range(rating: i32) -> bool {
    (1..=5).contains(&rating)
}

/// Public shape of an approved review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub rating_overall: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_ease_of_use: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_accuracy: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_speed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_support: Option<i32>,
    pub pros: String,
    pub cons: String,
    pub primary_use_case: Option<String>,
    pub reviewer_role: Option<String>,
    pub company_size: Option<String>,
    pub usage_context: Option<String>,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub user: ReviewerBrief,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        let user = review.reviewer();
        Self {
            id: review.id,
            rating_overall: review.rating_overall,
            rating_ease_of_use: review.rating_ease_of_use,
            rating_value: review.rating_value,
            rating_accuracy: review.rating_accuracy,
            rating_speed: review.rating_speed,
            rating_support: review.rating_support,
            pros: review.pros,
            cons: review.cons,
            primary_use_case: review.primary_use_case,
            reviewer_role: review.reviewer_role,
            company_size: review.company_size,
            usage_context: review.usage_context,
            helpful_count: review.helpful_count,
            created_at: review.created_at,
            user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewedTool {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// A review as listed on its author's own page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserReviewResponse {
    pub id: i64,
    pub rating_overall: i32,
    pub pros: String,
    pub cons: String,
    pub helpful_count: i32,
    pub moderation_status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub tool: ReviewedTool,
}

impl From<Review> for UserReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            rating_overall: review.rating_overall,
            pros: review.pros,
            cons: review.cons,
            helpful_count: review.helpful_count,
            moderation_status: review.moderation_status,
            created_at: review.created_at,
            tool: ReviewedTool {
                slug: review.tool_slug,
                name: review.tool_name,
                logo_url: review.tool_logo_url,
            },
        }
    }
}

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    tools: Arc<dyn ToolRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>, tools: Arc<dyn ToolRepository>) -> Self {
        Self { reviews, tools }
    }

    /// Approved reviews of a live tool.
    pub async fn list(
        &self,
        slug: &str,
        sort: ReviewSort,
        page: Page,
    ) -> Result<(Vec<ReviewResponse>, i64), ReviewError> {
        let tool = self
            .tools
            .find_by_slug(slug)
            .await?
            .ok_or(ReviewError::ToolNotFound)?;
        let (reviews, total) = self.reviews.list_approved(tool.id, sort, page).await?;
        Ok((reviews.into_iter().map(ReviewResponse::from).collect(), total))
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        page: Page,
    ) -> Result<(Vec<UserReviewResponse>, i64), ReviewError> {
        let (reviews, total) = self.reviews.list_by_user(user_id, page).await?;
        Ok((reviews.into_iter().map(UserReviewResponse::from).collect(), total))
    }

    /// Reviews are published immediately; the tool's rating is refreshed afterwards.
    pub async fn create(
        &self,
        slug: &str,
        user_id: i64,
        input: CreateReviewInput,
    ) -> Result<ReviewResponse, ReviewError> {
        input.validate()?;

        let tool = self
            .tools
            .find_by_slug(slug)
            .await?
            .ok_or(ReviewError::ToolNotFound)?;

        if self.reviews.has_reviewed(tool.id, user_id).await? {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = self
            .reviews
            .create(&NewReview {
                tool_id: tool.id,
                user_id,
                rating_overall: input.rating_overall,
                rating_ease_of_use: input.rating_ease_of_use,
                rating_value: input.rating_value,
                rating_accuracy: input.rating_accuracy,
                rating_speed: input.rating_speed,
                rating_support: input.rating_support,
                pros: input.pros,
                cons: input.cons,
                primary_use_case: input.primary_use_case,
                reviewer_role: input.reviewer_role,
                company_size: input.company_size,
                usage_context: input.usage_context,
                moderation_status: ModerationStatus::Approved,
            })
            .await?;

        if let Err(e) = self.reviews.refresh_tool_rating(tool.id).await {
            tracing::warn!("Failed to refresh rating of tool {}: {}", tool.id, e);
        }

        Ok(review.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn service(store: &MemoryStore) -> ReviewService {
        let repos = store.repositories();
        ReviewService::new(repos.reviews, repos.tools)
    }

    fn input(rating: i32) -> CreateReviewInput {
        CreateReviewInput {
            rating_overall: rating,
            pros: "great".into(),
            cons: "pricey".into(),
            ..Default::default()
        }
    }

    #[test]
    fn validation_order() {
        assert!(matches!(input(0).validate(), Err(ReviewError::RatingRequired)));
        assert!(matches!(input(6).validate(), Err(ReviewError::InvalidRating)));
        assert!(matches!(input(-1).validate(), Err(ReviewError::InvalidRating)));

        let secondary = CreateReviewInput {
            rating_speed: Some(0),
            ..input(4)
        };
        assert!(matches!(secondary.validate(), Err(ReviewError::InvalidRating)));

        let no_pros = CreateReviewInput {
            pros: String::new(),
            cons: String::new(),
            ..input(4)
        };
        assert!(matches!(no_pros.validate(), Err(ReviewError::ProsRequired)));

        let long_cons = CreateReviewInput {
            cons: "x".repeat(MAX_TEXT_LEN + 1),
            ..input(4)
        };
        assert!(matches!(long_cons.validate(), Err(ReviewError::ConsTooLong)));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = CreateReviewInput {
            pros: "é".repeat(MAX_TEXT_LEN),
            ..input(5)
        };
        assert!(accented.validate().is_ok());
    }

    #[tokio::test]
    async fn second_review_is_rejected() {
        let store = MemoryStore::new();
        let category = store.seed_category("chat", "Chat");
        store.seed_tool("chatgpt", category.id);
        let user = store.seed_user("ada@example.com", "Ada");
        let svc = service(&store);

        let created = svc.create("chatgpt", user.id, input(5)).await.unwrap();
        assert_eq!(created.rating_overall, 5);
        assert_eq!(created.user.display_name, "Ada");

        let err = svc.create("chatgpt", user.id, input(4)).await.unwrap_err();
        assert!(matches!(err, ReviewError::AlreadyReviewed));
    }

    #[tokio::test]
    async fn validation_runs_before_tool_lookup() {
        let store = MemoryStore::new();
        let err = service(&store).create("missing", 1, input(9)).await.unwrap_err();
        assert!(matches!(err, ReviewError::InvalidRating));

        let err = service(&store).create("missing", 1, input(3)).await.unwrap_err();
        assert!(matches!(err, ReviewError::ToolNotFound));
    }

    #[tokio::test]
    async fn creating_a_review_refreshes_the_tool_rating() {
        let store = MemoryStore::new();
        let category = store.seed_category("chat", "Chat");
        let tool = store.seed_tool("bard", category.id);
        let svc = service(&store);

        for (email, rating) in [("a@example.com", 5), ("b@example.com", 2)] {
            let user = store.seed_user(email, "Reviewer");
            svc.create("bard", user.id, input(rating)).await.unwrap();
        }

        let refreshed = store.tool(tool.id);
        assert_eq!(refreshed.review_count, 2);
        assert!((refreshed.avg_rating_overall - 3.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn listing_only_shows_approved_reviews() {
        let store = MemoryStore::new();
        let category = store.seed_category("chat", "Chat");
        store.seed_tool("claude", category.id);
        let author = store.seed_user("a@example.com", "A");
        let other = store.seed_user("b@example.com", "B");
        let svc = service(&store);

        let visible = svc.create("claude", author.id, input(5)).await.unwrap();
        let hidden = svc.create("claude", other.id, input(1)).await.unwrap();
        store.set_review_status(hidden.id, ModerationStatus::Hidden);

        let (reviews, total) = svc
            .list("claude", ReviewSort::Lowest, Page::new(1, 10, 10))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(reviews[0].id, visible.id);

        let (mine, _) = svc.list_for_user(other.id, Page::new(1, 10, 10)).await.unwrap();
        assert_eq!(mine[0].moderation_status, ModerationStatus::Hidden);
        assert_eq!(mine[0].tool.slug, "claude");
    }

    #[test]
    fn absent_secondary_ratings_are_omitted() {
        let response = ReviewResponse {
            id: 1,
            rating_overall: 4,
            rating_ease_of_use: None,
            rating_value: Some(3),
            rating_accuracy: None,
            rating_speed: None,
            rating_support: None,
            pros: "p".into(),
            cons: "c".into(),
            primary_use_case: None,
            reviewer_role: None,
            company_size: None,
            usage_context: None,
            helpful_count: 0,
            created_at: Utc::now(),
            user: ReviewerBrief {
                id: 2,
                display_name: "Ada".into(),
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("rating_ease_of_use").is_none());
        assert_eq!(value["rating_value"], 3);
        assert!(value["primary_use_case"].is_null());
    }
}
