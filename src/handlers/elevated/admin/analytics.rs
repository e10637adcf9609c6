// handlers/elevated/admin/analytics.rs - Dashboard statistics

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::repositories::{OverviewStats, TopCategory};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::analytics_service::TopTools;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// GET /api/v1/admin/analytics/overview
pub async fn overview(State(state): State<AppState>) -> ApiResult<OverviewStats> {
    Ok(ApiResponse::success(state.analytics.overview().await?))
}

/// GET /api/v1/admin/analytics/top-tools?limit=
pub async fn top_tools(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<TopTools> {
    Ok(ApiResponse::success(
        state.analytics.top_tools(query.limit()).await?,
    ))
}

/// GET /api/v1/admin/analytics/top-categories?limit=
pub async fn top_categories(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<TopCategory>> {
    Ok(ApiResponse::success(
        state.analytics.top_categories(query.limit()).await?,
    ))
}
