use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DbResult;
use crate::database::models::{Tag, TagWithCount};

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags by name, each with the number of tools carrying it.
    async fn list_with_counts(&self) -> DbResult<Vec<TagWithCount>>;
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Tag>>;
    async fn slug_exists(&self, slug: &str) -> DbResult<bool>;
    async fn create(&self, slug: &str, name: &str) -> DbResult<Tag>;
    async fn update(&self, tag: &Tag) -> DbResult<Tag>;
    /// Unassign the tag from every tool, then delete it.
    async fn delete(&self, id: i64) -> DbResult<()>;
}

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CountedRow {
    #[sqlx(flatten)]
    tag: Tag,
    tool_count: i64,
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list_with_counts(&self) -> DbResult<Vec<TagWithCount>> {
        let rows = sqlx::query_as::<_, CountedRow>(
            "SELECT t.*, (SELECT COUNT(*) FROM tool_tags tt WHERE tt.tag_id = t.id) AS tool_count \
             FROM tags t ORDER BY t.name, t.id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TagWithCount {
                tag: row.tag,
                tool_count: row.tool_count,
            })
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tags WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, slug: &str, name: &str) -> DbResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (slug, name) VALUES ($1, $2) RETURNING *")
            .bind(slug)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn update(&self, tag: &Tag) -> DbResult<Tag> {
        let updated = sqlx::query_as::<_, Tag>("UPDATE tags SET name = $2 WHERE id = $1 RETURNING *")
            .bind(tag.id)
            .bind(&tag.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM tool_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
