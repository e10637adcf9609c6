// handlers/protected/me.rs - The signed-in caller's account and reviews

use axum::{
    extract::{Query, State},
    Extension,
};

use crate::api::{ListMeta, PageParams};
use crate::app::AppState;
use crate::database::models::UserResponse;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::review_service::UserReviewResponse;

/// GET /api/v1/me - Current user
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<UserResponse> {
    let account = state.auth.me(user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(&account)))
}

/// GET /api/v1/me/reviews - Caller's reviews in every moderation state, newest first
pub async fn reviews(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> ApiResult<Vec<UserReviewResponse>> {
    let page = params.resolve(10);
    let (reviews, total) = state.reviews.list_for_user(user.id, page).await?;
    Ok(ApiResponse::list(reviews, ListMeta::new(page, total)))
}
