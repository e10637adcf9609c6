// handlers/elevated/admin/tags.rs - /admin/tags CRUD

use axum::extract::{Path, State};

use crate::api::{parse_id, JsonBody};
use crate::app::AppState;
use crate::database::models::{Tag, TagWithCount};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, NoContent};
use crate::services::tag_service::{CreateTagInput, UpdateTagInput};

/// GET /api/v1/admin/tags
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<TagWithCount>> {
    Ok(ApiResponse::success(state.tags.list().await?))
}

/// POST /api/v1/admin/tags
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTagInput>,
) -> ApiResult<Tag> {
    Ok(ApiResponse::created(state.tags.create(input).await?))
}

/// GET /api/v1/admin/tags/:id
pub async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Tag> {
    let id = parse_id(&raw_id, "tag")?;
    Ok(ApiResponse::success(state.tags.get(id).await?))
}

/// PATCH /api/v1/admin/tags/:id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(input): JsonBody<UpdateTagInput>,
) -> ApiResult<Tag> {
    let id = parse_id(&raw_id, "tag")?;
    Ok(ApiResponse::success(state.tags.update(id, input).await?))
}

/// DELETE /api/v1/admin/tags/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_id(&raw_id, "tag")?;
    state.tags.delete(id).await?;
    Ok(NoContent)
}
