// handlers/public/tools.rs - Tool catalogue: listing, search, detail, alternatives

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::{parse_or, ListMeta, PageParams};
use crate::app::AppState;
use crate::database::models::ToolDetail;
use crate::database::repositories::{PriceFilter, ToolFilter, ToolSort};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tool_service::Alternatives;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Query string shared by the listing and search endpoints.
///
/// Everything is read as text; values that do not parse are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub min_rating: Option<String>,
    pub platform: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ToolQuery {
    pub fn filter(&self) -> ToolFilter {
        let min_rating = parse_or(self.min_rating.as_deref(), 0.0_f64);
        ToolFilter {
            category: non_empty(&self.category),
            price: self.price.as_deref().and_then(PriceFilter::parse),
            min_rating: (min_rating > 0.0).then_some(min_rating),
            platform: non_empty(&self.platform),
            query: None,
        }
    }

    pub fn sort(&self) -> ToolSort {
        ToolSort::parse(self.sort.as_deref())
    }

    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page.clone(),
            page_size: self.page_size.clone(),
        }
    }
}

/// GET /api/v1/tools - List live tools with filters, sort and pagination
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ToolQuery>,
) -> ApiResult<Vec<ToolDetail>> {
    let page = query.page_params().resolve(DEFAULT_PAGE_SIZE);
    let (tools, total) = state
        .tools
        .list(&query.filter(), query.sort(), page)
        .await?;
    Ok(ApiResponse::list(tools, ListMeta::new(page, total)))
}

/// GET /api/v1/search/tools?q= - Free-text search on top of the listing filters
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<ToolQuery>,
) -> ApiResult<Vec<ToolDetail>> {
    let page = query.page_params().resolve(DEFAULT_PAGE_SIZE);
    let text = query.q.clone().unwrap_or_default();

    let mut filter = query.filter();
    filter.query = non_empty(&query.q);

    let (tools, total) = state.tools.list(&filter, query.sort(), page).await?;
    Ok(ApiResponse::list(
        tools,
        ListMeta::new(page, total).with_query(text),
    ))
}

/// GET /api/v1/tools/:slug - Tool detail with category, tags, badges and media
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ToolDetail> {
    let tool = state.tools.get_by_slug(&slug).await?;
    Ok(ApiResponse::success(tool))
}

/// GET /api/v1/tools/:slug/alternatives
pub async fn alternatives(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Alternatives> {
    let alternatives = state.tools.alternatives(&slug).await?;
    Ok(ApiResponse::success(alternatives))
}
