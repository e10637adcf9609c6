use async_trait::async_trait;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DbResult;
use crate::database::models::{Category, CategoryWithCount};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCategory {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub display_order: i32,
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories by `display_order`.
    async fn list(&self) -> DbResult<Vec<Category>>;
    async fn list_with_counts(&self) -> DbResult<Vec<CategoryWithCount>>;
    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Category>>;
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Category>>;
    async fn slug_exists(&self, slug: &str) -> DbResult<bool>;
    async fn create(&self, category: &NewCategory) -> DbResult<Category>;
    async fn update(&self, category: &Category) -> DbResult<Category>;
    async fn delete(&self, id: i64) -> DbResult<()>;
    /// Number of tools filed under the category, archived ones included.
    async fn referencing_tool_count(&self, id: i64) -> DbResult<i64>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CountedRow {
    #[sqlx(flatten)]
    category: Category,
    tool_count: i64,
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> DbResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY display_order, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn list_with_counts(&self) -> DbResult<Vec<CategoryWithCount>> {
        let rows = sqlx::query_as::<_, CountedRow>(
            "SELECT c.*, \
             (SELECT COUNT(*) FROM tools t WHERE t.primary_category_id = c.id AND t.archived_at IS NULL) \
             AS tool_count \
             FROM categories c ORDER BY c.display_order, c.id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryWithCount {
                category: row.category,
                tool_count: row.tool_count,
            })
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, category: &NewCategory) -> DbResult<Category> {
        let created = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (slug, name, description, icon_url, display_order) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&category.slug)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon_url)
        .bind(category.display_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, category: &Category) -> DbResult<Category> {
        let updated = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, description = $3, icon_url = $4, \
             display_order = $5, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon_url)
        .bind(category.display_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn referencing_tool_count(&self, id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tools WHERE primary_category_id = $1")
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
