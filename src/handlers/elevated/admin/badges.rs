// handlers/elevated/admin/badges.rs - Badge catalogue and tool assignments

use axum::extract::{Path, State};
use serde_json::Value;

use crate::api::{parse_id, JsonBody};
use crate::app::AppState;
use crate::database::models::Badge;
use crate::error::ApiError;
use crate::middleware::{message, ApiResponse, ApiResult, NoContent};
use crate::services::badge_service::AssignBadgeInput;

/// GET /api/v1/admin/badges
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Badge>> {
    Ok(ApiResponse::success(state.badges.list().await?))
}

/// GET /api/v1/admin/tools/:id/badges
pub async fn for_tool(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Vec<Badge>> {
    let tool_id = parse_id(&raw_id, "tool")?;
    Ok(ApiResponse::success(state.badges.for_tool(tool_id).await?))
}

/// POST /api/v1/admin/tools/:id/badges
pub async fn assign(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(input): JsonBody<AssignBadgeInput>,
) -> ApiResult<Value> {
    let tool_id = parse_id(&raw_id, "tool")?;
    state.badges.assign(tool_id, input.badge_id).await?;
    Ok(ApiResponse::success(message("Badge assigned successfully")))
}

/// DELETE /api/v1/admin/tools/:id/badges/:badge_id
pub async fn remove(
    State(state): State<AppState>,
    Path((raw_id, raw_badge_id)): Path<(String, String)>,
) -> Result<NoContent, ApiError> {
    let tool_id = parse_id(&raw_id, "tool")?;
    let badge_id = parse_id(&raw_badge_id, "badge")?;
    state.badges.remove(tool_id, badge_id).await?;
    Ok(NoContent)
}
