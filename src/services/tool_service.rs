use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::api::Page;
use crate::database::models::{RelationshipType, Tool, ToolDetail};
use crate::database::repositories::{NewTool, ToolFilter, ToolRepository, ToolSort};
use crate::database::DatabaseError;
use crate::error::ApiError;

/// Upper bound on each alternatives bucket
pub const MAX_ALTERNATIVES: i64 = 6;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found")]
    NotFound,
    #[error("Slug is required")]
    SlugRequired,
    #[error("Name is required")]
    NameRequired,
    #[error("Name cannot be empty")]
    NameEmpty,
    #[error("Category is required")]
    CategoryRequired,
    #[error("Category cannot be empty")]
    CategoryEmpty,
    #[error("A tool with this slug already exists")]
    SlugExists,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        let message = err.to_string();
        match err {
            ToolError::NotFound => ApiError::not_found(message),
            ToolError::SlugRequired => ApiError::validation(message, "slug", "required"),
            ToolError::NameRequired | ToolError::NameEmpty => {
                ApiError::validation(message, "name", "required")
            }
            ToolError::CategoryRequired | ToolError::CategoryEmpty => {
                ApiError::validation(message, "primary_category_id", "required")
            }
            ToolError::SlugExists => ApiError::conflict("SLUG_EXISTS", message),
            ToolError::Database(e) => e.into(),
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateToolInput {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub best_for: Option<String>,
    pub primary_use_cases: Option<String>,
    pub pricing_summary: Option<String>,
    pub target_roles: Option<String>,
    pub platforms: Option<String>,
    pub has_free_tier: Option<bool>,
    pub official_url: Option<String>,
    pub primary_category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternatives {
    pub similar: Vec<ToolDetail>,
    pub alternatives: Vec<ToolDetail>,
}

pub struct ToolService {
    tools: Arc<dyn ToolRepository>,
}

impl ToolService {
    pub fn new(tools: Arc<dyn ToolRepository>) -> Self {
        Self { tools }
    }

    pub async fn list(
        &self,
        filter: &ToolFilter,
        sort: ToolSort,
        page: Page,
    ) -> Result<(Vec<ToolDetail>, i64), ToolError> {
        Ok(self.tools.list(filter, sort, page).await?)
    }

    /// Public detail view; archived tools are invisible here.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ToolDetail, ToolError> {
        let tool = self.live_tool(slug).await?;
        Ok(self.tools.load_detail(tool).await?)
    }

    pub async fn alternatives(&self, slug: &str) -> Result<Alternatives, ToolError> {
        let tool = self.live_tool(slug).await?;
        let similar = self
            .tools
            .alternatives(tool.id, RelationshipType::Similar, MAX_ALTERNATIVES)
            .await?;
        let alternatives = self
            .tools
            .alternatives(tool.id, RelationshipType::Alternative, MAX_ALTERNATIVES)
            .await?;
        Ok(Alternatives {
            similar,
            alternatives,
        })
    }

    pub async fn list_admin(
        &self,
        search: Option<&str>,
        include_archived: bool,
        page: Page,
    ) -> Result<(Vec<ToolDetail>, i64), ToolError> {
        Ok(self.tools.list_admin(search, include_archived, page).await?)
    }

    /// Admin detail view, archived tools included.
    pub async fn get_by_id(&self, id: i64) -> Result<ToolDetail, ToolError> {
        let tool = self.tools.find_by_id(id).await?.ok_or(ToolError::NotFound)?;
        Ok(self.tools.load_detail(tool).await?)
    }

    pub async fn create(&self, input: NewTool) -> Result<ToolDetail, ToolError> {
        if input.slug.trim().is_empty() {
            return Err(ToolError::SlugRequired);
        }
        if input.name.trim().is_empty() {
            return Err(ToolError::NameRequired);
        }
        if input.primary_category_id == 0 {
            return Err(ToolError::CategoryRequired);
        }

        if self.tools.slug_exists(&input.slug).await? {
            return Err(ToolError::SlugExists);
        }

        let created = self.tools.create(&input).await.map_err(|e| {
            if e.is_unique_violation() {
                ToolError::SlugExists
            } else {
                ToolError::Database(e)
            }
        })?;
        tracing::info!("Created tool {} ({})", created.slug, created.id);

        Ok(self.tools.load_detail(created).await?)
    }

    pub async fn update(&self, id: i64, input: UpdateToolInput) -> Result<ToolDetail, ToolError> {
        let mut tool = self.tools.find_by_id(id).await?.ok_or(ToolError::NotFound)?;
        apply_update(&mut tool, input)?;

        let updated = self.tools.update(&tool).await?;
        Ok(self.tools.load_detail(updated).await?)
    }

    pub async fn archive(&self, id: i64) -> Result<(), ToolError> {
        self.tools.find_by_id(id).await?.ok_or(ToolError::NotFound)?;
        self.tools.archive(id).await?;
        tracing::info!("Archived tool {}", id);
        Ok(())
    }

    async fn live_tool(&self, slug: &str) -> Result<Tool, ToolError> {
        self.tools
            .find_by_slug(slug)
            .await?
            .ok_or(ToolError::NotFound)
    }
}

/// Empty strings clear optional text columns.
fn text(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn apply_update(tool: &mut Tool, input: UpdateToolInput) -> Result<(), ToolError> {
    if let Some(name) = input.name {
        if name.trim().is_empty() {
            return Err(ToolError::NameEmpty);
        }
        tool.name = name;
    }
    if let Some(category_id) = input.primary_category_id {
        if category_id == 0 {
            return Err(ToolError::CategoryEmpty);
        }
        tool.primary_category_id = category_id;
    }
    if let Some(v) = input.logo_url {
        tool.logo_url = text(v);
    }
    if let Some(v) = input.tagline {
        tool.tagline = text(v);
    }
    if let Some(v) = input.description {
        tool.description = text(v);
    }
    if let Some(v) = input.best_for {
        tool.best_for = text(v);
    }
    if let Some(v) = input.primary_use_cases {
        tool.primary_use_cases = text(v);
    }
    if let Some(v) = input.pricing_summary {
        tool.pricing_summary = text(v);
    }
    if let Some(v) = input.target_roles {
        tool.target_roles = text(v);
    }
    if let Some(v) = input.platforms {
        tool.platforms = text(v);
    }
    if let Some(v) = input.has_free_tier {
        tool.has_free_tier = v;
    }
    if let Some(v) = input.official_url {
        tool.official_url = text(v);
    }
    Ok(())
}
