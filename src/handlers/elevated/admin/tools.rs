// handlers/elevated/admin/tools.rs - /admin/tools CRUD

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::{parse_id, JsonBody, ListMeta, PageParams};
use crate::app::AppState;
use crate::database::models::ToolDetail;
use crate::database::repositories::NewTool;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, NoContent};
use crate::services::tool_service::UpdateToolInput;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminToolQuery {
    pub search: Option<String>,
    pub archived: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// GET /api/v1/admin/tools - Newest first; `archived=true` includes archived tools
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AdminToolQuery>,
) -> ApiResult<Vec<ToolDetail>> {
    let page = PageParams {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve(20);
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let include_archived = query.archived.as_deref() == Some("true");

    let (tools, total) = state
        .tools
        .list_admin(search, include_archived, page)
        .await?;
    Ok(ApiResponse::list(tools, ListMeta::new(page, total)))
}

/// POST /api/v1/admin/tools
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewTool>,
) -> ApiResult<ToolDetail> {
    let tool = state.tools.create(input).await?;
    Ok(ApiResponse::created(tool))
}

/// GET /api/v1/admin/tools/:id - Archived tools included
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<ToolDetail> {
    let id = parse_id(&raw_id, "tool")?;
    Ok(ApiResponse::success(state.tools.get_by_id(id).await?))
}

/// PATCH /api/v1/admin/tools/:id - Partial update
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(input): JsonBody<UpdateToolInput>,
) -> ApiResult<ToolDetail> {
    let id = parse_id(&raw_id, "tool")?;
    Ok(ApiResponse::success(state.tools.update(id, input).await?))
}

/// DELETE /api/v1/admin/tools/:id - Archives rather than deletes
pub async fn archive(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_id(&raw_id, "tool")?;
    state.tools.archive(id).await?;
    Ok(NoContent)
}
