use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use crate::database::manager::DbResult;
use crate::database::models::{Badge, Category, Media, Tag, Tool, ToolDetail};

#[derive(FromRow)]
struct TaggedRow {
    tool_id: i64,
    #[sqlx(flatten)]
    tag: Tag,
}

#[derive(FromRow)]
struct BadgedRow {
    tool_id: i64,
    #[sqlx(flatten)]
    badge: Badge,
}

/// Attach primary category, tags and badges (and optionally media) to a batch of tools.
///
/// One query per relation regardless of batch size; input order is preserved.
pub async fn load_details(
    pool: &PgPool,
    tools: Vec<Tool>,
    with_media: bool,
) -> DbResult<Vec<ToolDetail>> {
    if tools.is_empty() {
        return Ok(Vec::new());
    }

    let tool_ids: Vec<i64> = tools.iter().map(|t| t.id).collect();
    let category_ids: Vec<i64> = tools.iter().map(|t| t.primary_category_id).collect();

    let categories: HashMap<i64, Category> =
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ANY($1)")
            .bind(&category_ids)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

    let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
    let tag_rows = sqlx::query_as::<_, TaggedRow>(
        "SELECT tt.tool_id, tags.* FROM tags \
         JOIN tool_tags tt ON tt.tag_id = tags.id \
         WHERE tt.tool_id = ANY($1) ORDER BY tags.name",
    )
    .bind(&tool_ids)
    .fetch_all(pool)
    .await?;
    for row in tag_rows {
        tags.entry(row.tool_id).or_default().push(row.tag);
    }

    let mut badges: HashMap<i64, Vec<Badge>> = HashMap::new();
    let badge_rows = sqlx::query_as::<_, BadgedRow>(
        "SELECT tb.tool_id, badges.* FROM badges \
         JOIN tool_badges tb ON tb.badge_id = badges.id \
         WHERE tb.tool_id = ANY($1) ORDER BY badges.name",
    )
    .bind(&tool_ids)
    .fetch_all(pool)
    .await?;
    for row in badge_rows {
        badges.entry(row.tool_id).or_default().push(row.badge);
    }

    let mut media: HashMap<i64, Vec<Media>> = HashMap::new();
    if with_media {
        let rows = sqlx::query_as::<_, Media>(
            "SELECT * FROM media WHERE tool_id = ANY($1) ORDER BY display_order, id",
        )
        .bind(&tool_ids)
        .fetch_all(pool)
        .await?;
        for row in rows {
            media.entry(row.tool_id).or_default().push(row);
        }
    }

    Ok(tools
        .into_iter()
        .map(|tool| {
            let id = tool.id;
            ToolDetail {
                primary_category: categories.get(&tool.primary_category_id).cloned(),
                tags: tags.remove(&id).unwrap_or_default(),
                badges: badges.remove(&id).unwrap_or_default(),
                media: with_media.then(|| media.remove(&id).unwrap_or_default()),
                tool,
            }
        })
        .collect())
}
