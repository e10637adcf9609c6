use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::relations::load_details;
use crate::database::manager::DbResult;
use crate::database::models::{BookmarkOwner, BookmarkRow, Tool, ToolDetail};

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Bookmarked tools of `owner`, most recently bookmarked first.
    async fn list_tools(&self, owner: &BookmarkOwner) -> DbResult<Vec<ToolDetail>>;
    async fn find(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<Option<BookmarkRow>>;
    async fn create(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<BookmarkRow>;
    /// Returns whether a row was removed.
    async fn delete(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<bool>;
    /// Reassign a session's bookmarks to a user, skipping tools the user already bookmarked.
    /// Returns the number of bookmarks moved.
    async fn migrate_session(&self, user_id: i64, session_id: &str) -> DbResult<u64>;
}

pub struct PgBookmarkRepository {
    pool: PgPool,
}

impl PgBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_owner(qb: &mut QueryBuilder<'_, Postgres>, column_prefix: &str, owner: &BookmarkOwner) {
    match owner {
        BookmarkOwner::User(id) => {
            qb.push(format!("{column_prefix}user_id = ")).push_bind(*id);
        }
        BookmarkOwner::Session(session) => {
            qb.push(format!("{column_prefix}session_id = "))
                .push_bind(session.clone());
        }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    async fn list_tools(&self, owner: &BookmarkOwner) -> DbResult<Vec<ToolDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT tools.* FROM tools JOIN bookmarks b ON b.tool_id = tools.id WHERE ",
        );
        push_owner(&mut qb, "b.", owner);
        qb.push(" ORDER BY b.created_at DESC, b.id DESC");
        let tools: Vec<Tool> = qb.build_query_as::<Tool>().fetch_all(&self.pool).await?;

        load_details(&self.pool, tools, false).await
    }

    async fn find(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<Option<BookmarkRow>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bookmarks WHERE tool_id = ");
        qb.push_bind(tool_id).push(" AND ");
        push_owner(&mut qb, "", owner);
        let row = qb
            .build_query_as::<BookmarkRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<BookmarkRow> {
        let row = sqlx::query_as::<_, BookmarkRow>(
            "INSERT INTO bookmarks (user_id, session_id, tool_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(owner.user_id())
        .bind(owner.session_id())
        .bind(tool_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<bool> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM bookmarks WHERE tool_id = ");
        qb.push_bind(tool_id).push(" AND ");
        push_owner(&mut qb, "", owner);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn migrate_session(&self, user_id: i64, session_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE bookmarks SET user_id = $1, session_id = NULL \
             WHERE session_id = $2 \
             AND tool_id NOT IN (SELECT tool_id FROM bookmarks WHERE user_id = $1)",
        )
        .bind(user_id)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
