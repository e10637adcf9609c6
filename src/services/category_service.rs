use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::api::Page;
use crate::database::models::{Category, CategoryWithCount, ToolDetail};
use crate::database::repositories::{CategoryRepository, NewCategory, ToolRepository};
use crate::database::DatabaseError;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found")]
    NotFound,
    #[error("Slug is required")]
    SlugRequired,
    #[error("Name is required")]
    NameRequired,
    #[error("Name cannot be empty")]
    NameEmpty,
    #[error("A category with this slug already exists")]
    SlugExists,
    #[error("Cannot delete category with tools. Reassign tools first.")]
    HasTools,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        let message = err.to_string();
        match err {
            CategoryError::NotFound => ApiError::not_found(message),
            CategoryError::SlugRequired => ApiError::validation(message, "slug", "required"),
            CategoryError::NameRequired | CategoryError::NameEmpty => {
                ApiError::validation(message, "name", "required")
            }
            CategoryError::SlugExists => ApiError::conflict("SLUG_EXISTS", message),
            CategoryError::HasTools => ApiError::conflict("HAS_TOOLS", message),
            CategoryError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub display_order: Option<i32>,
}

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    tools: Arc<dyn ToolRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, tools: Arc<dyn ToolRepository>) -> Self {
        Self { categories, tools }
    }

    pub async fn list(&self) -> Result<Vec<Category>, CategoryError> {
        Ok(self.categories.list().await?)
    }

    /// Live tools in the category identified by `slug`.
    pub async fn tools(
        &self,
        slug: &str,
        page: Page,
    ) -> Result<(Vec<ToolDetail>, i64), CategoryError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or(CategoryError::NotFound)?;
        Ok(self.tools.list_by_category(category.id, page).await?)
    }

    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, CategoryError> {
        Ok(self.categories.list_with_counts().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Category, CategoryError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    pub async fn create(&self, input: NewCategory) -> Result<Category, CategoryError> {
        if input.slug.trim().is_empty() {
            return Err(CategoryError::SlugRequired);
        }
        if input.name.trim().is_empty() {
            return Err(CategoryError::NameRequired);
        }
        if self.categories.slug_exists(&input.slug).await? {
            return Err(CategoryError::SlugExists);
        }

        self.categories.create(&input).await.map_err(|e| {
            if e.is_unique_violation() {
                CategoryError::SlugExists
            } else {
                CategoryError::Database(e)
            }
        })
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryError> {
        let mut category = self.get(id).await?;

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(CategoryError::NameEmpty);
            }
            category.name = name;
        }
        if let Some(description) = input.description {
            category.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(icon_url) = input.icon_url {
            category.icon_url = Some(icon_url).filter(|u| !u.is_empty());
        }
        if let Some(display_order) = input.display_order {
            category.display_order = display_order;
        }

        Ok(self.categories.update(&category).await?)
    }

    /// Refused while any tool, archived or not, is filed under the category.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryError> {
        self.get(id).await?;
        if self.categories.referencing_tool_count(id).await? > 0 {
            return Err(CategoryError::HasTools);
        }
        self.categories.delete(id).await.map_err(|e| {
            if e.is_foreign_key_violation() {
                CategoryError::HasTools
            } else {
                CategoryError::Database(e)
            }
        })?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}
