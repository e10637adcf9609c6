// handlers/public/reviews.rs - GET /tools/:slug/reviews handler

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::{ListMeta, PageParams};
use crate::app::AppState;
use crate::database::repositories::ReviewSort;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::review_service::ReviewResponse;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// GET /api/v1/tools/:slug/reviews - Approved reviews of a tool
pub async fn list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Vec<ReviewResponse>> {
    let page = PageParams {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve(10);
    let sort = ReviewSort::parse(query.sort.as_deref());

    let (reviews, total) = state.reviews.list(&slug, sort, page).await?;
    Ok(ApiResponse::list(reviews, ListMeta::new(page, total)))
}
