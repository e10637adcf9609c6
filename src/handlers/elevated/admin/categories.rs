// handlers/elevated/admin/categories.rs - /admin/categories CRUD

use axum::extract::{Path, State};

use crate::api::{parse_id, JsonBody};
use crate::app::AppState;
use crate::database::models::{Category, CategoryWithCount};
use crate::database::repositories::NewCategory;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, NoContent};
use crate::services::category_service::UpdateCategoryInput;

/// GET /api/v1/admin/categories - With live tool counts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<CategoryWithCount>> {
    Ok(ApiResponse::success(state.categories.list_with_counts().await?))
}

/// POST /api/v1/admin/categories
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewCategory>,
) -> ApiResult<Category> {
    let category = state.categories.create(input).await?;
    tracing::info!("Created category {} ({})", category.slug, category.id);
    Ok(ApiResponse::created(category))
}

/// GET /api/v1/admin/categories/:id
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Category> {
    let id = parse_id(&raw_id, "category")?;
    Ok(ApiResponse::success(state.categories.get(id).await?))
}

/// PATCH /api/v1/admin/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(input): JsonBody<UpdateCategoryInput>,
) -> ApiResult<Category> {
    let id = parse_id(&raw_id, "category")?;
    Ok(ApiResponse::success(state.categories.update(id, input).await?))
}

/// DELETE /api/v1/admin/categories/:id - Refused while tools still use it
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_id(&raw_id, "category")?;
    state.categories.delete(id).await?;
    Ok(NoContent)
}
