// handlers/public/categories.rs - Category browsing

use axum::extract::{Path, Query, State};

use crate::api::{ListMeta, PageParams};
use crate::app::AppState;
use crate::database::models::{Category, ToolDetail};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/v1/categories - All categories by display order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/v1/categories/:slug/tools - Live tools filed under a category
///
/// Page sizes outside 1..=100 fall back to 20.
pub async fn tools(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Vec<ToolDetail>> {
    let page = params.resolve_with_reset(20);
    let (tools, total) = state.categories.tools(&slug, page).await?;
    Ok(ApiResponse::list(tools, ListMeta::new(page, total)))
}
