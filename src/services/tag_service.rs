use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::database::models::{Tag, TagWithCount};
use crate::database::repositories::TagRepository;
use crate::database::DatabaseError;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("Tag not found")]
    NotFound,
    #[error("Slug is required")]
    SlugRequired,
    #[error("Name is required")]
    NameRequired,
    #[error("Name cannot be empty")]
    NameEmpty,
    #[error("A tag with this slug already exists")]
    SlugExists,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        let message = err.to_string();
        match err {
            TagError::NotFound => ApiError::not_found(message),
            TagError::SlugRequired => ApiError::validation(message, "slug", "required"),
            TagError::NameRequired | TagError::NameEmpty => {
                ApiError::validation(message, "name", "required")
            }
            TagError::SlugExists => ApiError::conflict("SLUG_EXISTS", message),
            TagError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTagInput {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTagInput {
    pub name: Option<String>,
}

pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn list(&self) -> Result<Vec<TagWithCount>, TagError> {
        Ok(self.tags.list_with_counts().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Tag, TagError> {
        self.tags.find_by_id(id).await?.ok_or(TagError::NotFound)
    }

    pub async fn create(&self, input: CreateTagInput) -> Result<Tag, TagError> {
        if input.slug.trim().is_empty() {
            return Err(TagError::SlugRequired);
        }
        if input.name.trim().is_empty() {
            return Err(TagError::NameRequired);
        }
        if self.tags.slug_exists(&input.slug).await? {
            return Err(TagError::SlugExists);
        }

        self.tags
            .create(&input.slug, &input.name)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    TagError::SlugExists
                } else {
                    TagError::Database(e)
                }
            })
    }

    pub async fn update(&self, id: i64, input: UpdateTagInput) -> Result<Tag, TagError> {
        let mut tag = self.get(id).await?;
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(TagError::NameEmpty);
            }
            tag.name = name;
        }
        Ok(self.tags.update(&tag).await?)
    }

    /// Tool assignments go with the tag.
    pub async fn delete(&self, id: i64) -> Result<(), TagError> {
        self.get(id).await?;
        self.tags.delete(id).await?;
        tracing::info!("Deleted tag {}", id);
        Ok(())
    }
}
