use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DbResult;
use crate::database::models::Badge;

#[async_trait]
pub trait BadgeRepository: Send + Sync {
    async fn list(&self) -> DbResult<Vec<Badge>>;
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Badge>>;
    async fn list_for_tool(&self, tool_id: i64) -> DbResult<Vec<Badge>>;
    async fn is_assigned(&self, tool_id: i64, badge_id: i64) -> DbResult<bool>;
    async fn assign(&self, tool_id: i64, badge_id: i64) -> DbResult<()>;
    async fn unassign(&self, tool_id: i64, badge_id: i64) -> DbResult<()>;
}

pub struct PgBadgeRepository {
    pool: PgPool,
}

impl PgBadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRepository for PgBadgeRepository {
    async fn list(&self) -> DbResult<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>("SELECT * FROM badges ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(badges)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Badge>> {
        let badge = sqlx::query_as::<_, Badge>("SELECT * FROM badges WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(badge)
    }

    async fn list_for_tool(&self, tool_id: i64) -> DbResult<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            "SELECT b.* FROM badges b JOIN tool_badges tb ON tb.badge_id = b.id \
             WHERE tb.tool_id = $1 ORDER BY tb.assigned_at, b.id",
        )
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(badges)
    }

    async fn is_assigned(&self, tool_id: i64, badge_id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tool_badges WHERE tool_id = $1 AND badge_id = $2)",
        )
        .bind(tool_id)
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn assign(&self, tool_id: i64, badge_id: i64) -> DbResult<()> {
        sqlx::query("INSERT INTO tool_badges (tool_id, badge_id, assigned_at) VALUES ($1, $2, NOW())")
            .bind(tool_id)
            .bind(badge_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn unassign(&self, tool_id: i64, badge_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM tool_badges WHERE tool_id = $1 AND badge_id = $2")
            .bind(tool_id)
            .bind(badge_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
