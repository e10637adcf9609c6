use async_trait::async_trait;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::relations::load_details;
use crate::api::Page;
use crate::database::manager::DbResult;
use crate::database::models::{RelationshipType, Tool, ToolDetail};

/// Price bucket filter. Unknown values are ignored by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFilter {
    /// Free tier plus a pricing summary mentioning "free" or "$0"
    Free,
    Freemium,
    Paid,
}

impl PriceFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(PriceFilter::Free),
            "freemium" => Some(PriceFilter::Freemium),
            "paid" => Some(PriceFilter::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolSort {
    #[default]
    TopRated,
    MostBookmarked,
    Trending,
    Newest,
}

impl ToolSort {
    /// Unknown or missing values fall back to `top_rated`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("most_bookmarked") => ToolSort::MostBookmarked,
            Some("trending") => ToolSort::Trending,
            Some("newest") => ToolSort::Newest,
            _ => ToolSort::TopRated,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            ToolSort::TopRated => " ORDER BY tools.avg_rating_overall DESC, tools.review_count DESC, tools.id",
            ToolSort::MostBookmarked => " ORDER BY tools.bookmark_count DESC, tools.id",
            ToolSort::Trending => " ORDER BY tools.trending_score DESC, tools.id",
            ToolSort::Newest => " ORDER BY tools.created_at DESC, tools.id DESC",
        }
    }
}

/// Public listing filters; `query` is only set by search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolFilter {
    pub category: Option<String>,
    pub price: Option<PriceFilter>,
    pub min_rating: Option<f64>,
    pub platform: Option<String>,
    pub query: Option<String>,
}

/// Insert payload for a new tool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTool {
    pub slug: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub best_for: Option<String>,
    pub primary_use_cases: Option<String>,
    pub pricing_summary: Option<String>,
    pub target_roles: Option<String>,
    pub platforms: Option<String>,
    pub has_free_tier: bool,
    pub official_url: Option<String>,
    pub primary_category_id: i64,
}

#[async_trait]
pub trait ToolRepository: Send + Sync {
    /// Live tools matching `filter`, sorted and paged, with category/tags/badges loaded.
    async fn list(
        &self,
        filter: &ToolFilter,
        sort: ToolSort,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)>;

    /// Back-office listing, newest first.
    async fn list_admin(
        &self,
        search: Option<&str>,
        include_archived: bool,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)>;

    async fn list_by_category(
        &self,
        category_id: i64,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)>;

    /// Live (non-archived) tool by slug.
    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Tool>>;

    /// Tool by id, archived or not.
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Tool>>;

    /// Load every relation of a single tool, media included.
    async fn load_detail(&self, tool: Tool) -> DbResult<ToolDetail>;

    async fn alternatives(
        &self,
        tool_id: i64,
        kind: RelationshipType,
        limit: i64,
    ) -> DbResult<Vec<ToolDetail>>;

    async fn slug_exists(&self, slug: &str) -> DbResult<bool>;

    async fn create(&self, tool: &NewTool) -> DbResult<Tool>;

    /// Persist every editable column of `tool`.
    async fn update(&self, tool: &Tool) -> DbResult<Tool>;

    async fn archive(&self, id: i64) -> DbResult<()>;

    /// Add `delta` to the bookmark counter, never going below zero.
    async fn adjust_bookmark_count(&self, id: i64, delta: i32) -> DbResult<()>;
}

pub struct PgToolRepository {
    pool: PgPool,
}

impl PgToolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ToolFilter) {
    qb.push(" WHERE tools.archived_at IS NULL");

    if let Some(category) = &filter.category {
        qb.push(" AND tools.primary_category_id IN (SELECT id FROM categories WHERE slug = ")
            .push_bind(category.clone())
            .push(")");
    }

    match filter.price {
        Some(PriceFilter::Free) => {
            qb.push(
                " AND tools.has_free_tier = TRUE \
                 AND (tools.pricing_summary ILIKE '%free%' OR tools.pricing_summary ILIKE '%$0%')",
            );
        }
        Some(PriceFilter::Freemium) => {
            qb.push(" AND tools.has_free_tier = TRUE");
        }
        Some(PriceFilter::Paid) => {
            qb.push(" AND tools.has_free_tier = FALSE");
        }
        None => {}
    }

    if let Some(min_rating) = filter.min_rating.filter(|r| *r > 0.0) {
        qb.push(" AND tools.avg_rating_overall >= ").push_bind(min_rating);
    }

    if let Some(platform) = &filter.platform {
        qb.push(" AND LOWER(tools.platforms) LIKE ")
            .push_bind(format!("%{}%", platform.to_lowercase()));
    }

    if let Some(query) = filter.query.as_deref().filter(|q| !q.is_empty()) {
        let term = format!("%{}%", query.to_lowercase());
        qb.push(" AND (");
        for (i, column) in ["name", "tagline", "description", "best_for", "primary_use_cases"]
            .iter()
            .enumerate()
        {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("LOWER(tools.{column}) LIKE "))
                .push_bind(term.clone());
        }
        qb.push(")");
    }
}

fn push_admin_filters(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>, include_archived: bool) {
    qb.push(" WHERE TRUE");
    if !include_archived {
        qb.push(" AND tools.archived_at IS NULL");
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        let term = format!("%{}%", search.to_lowercase());
        qb.push(" AND (LOWER(tools.name) LIKE ")
            .push_bind(term.clone())
            .push(" OR LOWER(tools.slug) LIKE ")
            .push_bind(term)
            .push(")");
    }
}

#[async_trait]
impl ToolRepository for PgToolRepository {
    async fn list(
        &self,
        filter: &ToolFilter,
        sort: ToolSort,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tools");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT tools.* FROM tools");
        push_filters(&mut select, filter);
        select
            .push(sort.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let tools: Vec<Tool> = select.build_query_as::<Tool>().fetch_all(&self.pool).await?;

        Ok((load_details(&self.pool, tools, false).await?, total))
    }

    async fn list_admin(
        &self,
        search: Option<&str>,
        include_archived: bool,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tools");
        push_admin_filters(&mut count, search, include_archived);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT tools.* FROM tools");
        push_admin_filters(&mut select, search, include_archived);
        select
            .push(ToolSort::Newest.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let tools: Vec<Tool> = select.build_query_as::<Tool>().fetch_all(&self.pool).await?;

        Ok((load_details(&self.pool, tools, false).await?, total))
    }

    async fn list_by_category(
        &self,
        category_id: i64,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tools WHERE primary_category_id = $1 AND archived_at IS NULL",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        let tools = sqlx::query_as::<_, Tool>(
            "SELECT * FROM tools WHERE primary_category_id = $1 AND archived_at IS NULL \
             ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(category_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((load_details(&self.pool, tools, false).await?, total))
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Tool>> {
        let tool = sqlx::query_as::<_, Tool>(
            "SELECT * FROM tools WHERE slug = $1 AND archived_at IS NULL",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tool)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Tool>> {
        let tool = sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tool)
    }

    async fn load_detail(&self, tool: Tool) -> DbResult<ToolDetail> {
        let mut details = load_details(&self.pool, vec![tool.clone()], true).await?;
        Ok(details.pop().unwrap_or_else(|| ToolDetail::bare(tool)))
    }

    async fn alternatives(
        &self,
        tool_id: i64,
        kind: RelationshipType,
        limit: i64,
    ) -> DbResult<Vec<ToolDetail>> {
        let tools = sqlx::query_as::<_, Tool>(
            "SELECT tools.* FROM tools \
             JOIN tool_alternatives ta ON ta.alternative_tool_id = tools.id \
             WHERE ta.tool_id = $1 AND ta.relationship_type = $2 AND tools.archived_at IS NULL \
             ORDER BY ta.id LIMIT $3",
        )
        .bind(tool_id)
        .bind(kind)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        load_details(&self.pool, tools, false).await
    }

    async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tools WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, tool: &NewTool) -> DbResult<Tool> {
        let created = sqlx::query_as::<_, Tool>(
            "INSERT INTO tools (slug, name, logo_url, tagline, description, best_for, \
             primary_use_cases, pricing_summary, target_roles, platforms, has_free_tier, \
             official_url, primary_category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(&tool.slug)
        .bind(&tool.name)
        .bind(&tool.logo_url)
        .bind(&tool.tagline)
        .bind(&tool.description)
        .bind(&tool.best_for)
        .bind(&tool.primary_use_cases)
        .bind(&tool.pricing_summary)
        .bind(&tool.target_roles)
        .bind(&tool.platforms)
        .bind(tool.has_free_tier)
        .bind(&tool.official_url)
        .bind(tool.primary_category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, tool: &Tool) -> DbResult<Tool> {
        let updated = sqlx::query_as::<_, Tool>(
            "UPDATE tools SET name = $2, logo_url = $3, tagline = $4, description = $5, \
             best_for = $6, primary_use_cases = $7, pricing_summary = $8, target_roles = $9, \
             platforms = $10, has_free_tier = $11, official_url = $12, primary_category_id = $13, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(tool.id)
        .bind(&tool.name)
        .bind(&tool.logo_url)
        .bind(&tool.tagline)
        .bind(&tool.description)
        .bind(&tool.best_for)
        .bind(&tool.primary_use_cases)
        .bind(&tool.pricing_summary)
        .bind(&tool.target_roles)
        .bind(&tool.platforms)
        .bind(tool.has_free_tier)
        .bind(&tool.official_url)
        .bind(tool.primary_category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn archive(&self, id: i64) -> DbResult<()> {
        sqlx::query("UPDATE tools SET archived_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn adjust_bookmark_count(&self, id: i64, delta: i32) -> DbResult<()> {
        sqlx::query("UPDATE tools SET bookmark_count = GREATEST(bookmark_count + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
