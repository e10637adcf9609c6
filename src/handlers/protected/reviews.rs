// handlers/protected/reviews.rs - POST /tools/:slug/reviews handler

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::JsonBody;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::review_service::{CreateReviewInput, ReviewResponse};

/// POST /api/v1/tools/:slug/reviews - Publish a review; one per user and tool
pub async fn create(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<CreateReviewInput>,
) -> ApiResult<ReviewResponse> {
    let review = state.reviews.create(&slug, user.id, input).await?;
    tracing::info!("User {} reviewed {}", user.id, slug);
    Ok(ApiResponse::created(review))
}
