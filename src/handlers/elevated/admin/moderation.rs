// handlers/elevated/admin/moderation.rs - Report triage and review moderation

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{parse_id, JsonBody, ListMeta, PageParams};
use crate::app::AppState;
use crate::database::models::{
    ModeratedReview, ModerationActionType, ModerationHistoryEntry, QueuedReport, Report,
    ReportStatus, ReportableType,
};
use crate::database::repositories::ReportFilter;
use crate::middleware::{message, ApiResponse, ApiResult, AuthUser};
use crate::services::moderation_service::{ModerateInput, UpdateReportInput};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl QueueQuery {
    /// `None` when a value names no known type or status, so nothing can match.
    ///
    /// A missing `status` means pending; an empty one means any status.
    pub fn filter(&self) -> Option<ReportFilter> {
        let kind = match self.kind.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(ReportableType::parse(raw)?),
        };
        let status = match self.status.as_deref() {
            None => Some(ReportStatus::Pending),
            Some("") => None,
            Some(raw) => Some(ReportStatus::parse(raw)?),
        };
        Some(ReportFilter { kind, status })
    }
}

/// GET /api/v1/admin/moderation/queue?type=&status= - Reports with their targets
pub async fn queue(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> ApiResult<Vec<QueuedReport>> {
    let page = PageParams {
        page: query.page.clone(),
        page_size: query.page_size.clone(),
    }
    .resolve(20);

    let (reports, total) = match query.filter() {
        Some(filter) => state.moderation.queue(filter, page).await?,
        None => (Vec::new(), 0),
    };
    Ok(ApiResponse::list(reports, ListMeta::new(page, total)))
}

/// GET /api/v1/admin/moderation/reports - Pending reports, newest first
pub async fn reports(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Vec<Report>> {
    let page = params.resolve(20);
    let (reports, total) = state.moderation.pending_reports(page).await?;
    Ok(ApiResponse::list(reports, ListMeta::new(page, total)))
}

/// GET /api/v1/admin/moderation/reports/:id
pub async fn report(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Report> {
    let id = parse_id(&raw_id, "report")?;
    Ok(ApiResponse::success(state.moderation.get_report(id).await?))
}

/// PATCH /api/v1/admin/moderation/reports/:id - Set status, stamping the reviewer
pub async fn update_report(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<UpdateReportInput>,
) -> ApiResult<Value> {
    let id = parse_id(&raw_id, "report")?;
    state
        .moderation
        .update_report_status(id, &input.status, user.id)
        .await?;
    Ok(ApiResponse::success(message("Report status updated")))
}

async fn moderate(
    state: &AppState,
    raw_id: &str,
    user: &AuthUser,
    action: ModerationActionType,
    body: Option<Json<ModerateInput>>,
) -> ApiResult<ModeratedReview> {
    let review_id = parse_id(raw_id, "review")?;
    let notes = body.and_then(|Json(input)| input.notes);
    let review = state
        .moderation
        .moderate(review_id, user.id, action, notes)
        .await?;
    tracing::info!("Moderator {} applied {:?} to review {}", user.id, action, review_id);
    Ok(ApiResponse::success(review))
}

/// PATCH /api/v1/admin/moderation/reviews/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    body: Option<Json<ModerateInput>>,
) -> ApiResult<ModeratedReview> {
    moderate(&state, &raw_id, &user, ModerationActionType::Approve, body).await
}

/// PATCH /api/v1/admin/moderation/reviews/:id/hide
pub async fn hide(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    body: Option<Json<ModerateInput>>,
) -> ApiResult<ModeratedReview> {
    moderate(&state, &raw_id, &user, ModerationActionType::Hide, body).await
}

/// PATCH /api/v1/admin/moderation/reviews/:id/remove
pub async fn remove(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    body: Option<Json<ModerateInput>>,
) -> ApiResult<ModeratedReview> {
    moderate(&state, &raw_id, &user, ModerationActionType::Remove, body).await
}

/// GET /api/v1/admin/moderation/history/:review_id - Audit trail, newest first
pub async fn history(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Vec<ModerationHistoryEntry>> {
    let review_id = parse_id(&raw_id, "review")?;
    Ok(ApiResponse::success(state.moderation.history(review_id).await?))
}
