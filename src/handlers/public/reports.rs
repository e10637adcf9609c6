// handlers/public/reports.rs - Abuse reports against tools and reviews
//
// Anonymous callers may report; signed-in callers are limited to one report
// per target per UTC day.

use axum::extract::{Path, State};

use crate::api::{parse_id, JsonBody};
use crate::app::AppState;
use crate::database::models::Report;
use crate::middleware::{ApiResponse, ApiResult, MaybeAuthUser};
use crate::services::moderation_service::CreateReportInput;

/// POST /api/v1/tools/:slug/report
pub async fn report_tool(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: MaybeAuthUser,
    JsonBody(input): JsonBody<CreateReportInput>,
) -> ApiResult<Report> {
    let reporter = user.map(|u| u.id);
    let report = state.moderation.report_tool(&slug, reporter, input).await?;
    Ok(ApiResponse::created(report))
}

/// POST /api/v1/reviews/:id/report
pub async fn report_review(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    user: MaybeAuthUser,
    JsonBody(input): JsonBody<CreateReportInput>,
) -> ApiResult<Report> {
    let review_id = parse_id(&raw_id, "review")?;
    let reporter = user.map(|u| u.id);
    let report = state
        .moderation
        .report_review(review_id, reporter, input)
        .await?;
    Ok(ApiResponse::created(report))
}
