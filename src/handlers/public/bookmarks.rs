// handlers/public/bookmarks.rs - /me/bookmarks handlers
//
// Bookmarks belong to the signed-in user when there is one, otherwise to the
// browser's `session_id` cookie. Adding a bookmark without either mints a session.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::cookies::{self, SESSION_COOKIE};
use crate::database::models::{Bookmark, BookmarkOwner, ToolDetail};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, MaybeAuthUser, NoContent};
use crate::services::bookmark_service::{AddBookmarkInput, BookmarkError};

/// Authenticated user first, then the session cookie.
pub fn resolve_owner(user: &MaybeAuthUser, jar: &CookieJar) -> Option<BookmarkOwner> {
    if let Some(user) = user {
        return Some(BookmarkOwner::User(user.id));
    }
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
        .map(BookmarkOwner::Session)
}

/// GET /api/v1/me/bookmarks - Bookmarked tools, newest bookmark first
pub async fn list(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    jar: CookieJar,
) -> ApiResult<Vec<ToolDetail>> {
    let owner = resolve_owner(&user, &jar);
    let tools = state.bookmarks.list(owner.as_ref()).await?;
    Ok(ApiResponse::success(tools))
}

/// POST /api/v1/me/bookmarks - Bookmark a tool
pub async fn add(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<AddBookmarkInput>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<Bookmark>), ApiError> {
    let (owner, jar) = match resolve_owner(&user, &jar) {
        Some(owner) => (owner, jar),
        None => {
            let session_id = Uuid::new_v4().to_string();
            tracing::debug!("Minted bookmark session {}", session_id);
            let cookie = cookies::session_cookie(session_id.clone(), cookies::request_is_https(&headers));
            (BookmarkOwner::Session(session_id), jar.add(cookie))
        }
    };

    let Json(input) = body.map_err(|_| BookmarkError::ToolIdRequired)?;
    let bookmark = state.bookmarks.add(&owner, input.tool_id).await?;
    Ok((jar, ApiResponse::created(bookmark)))
}

/// DELETE /api/v1/me/bookmarks/:tool_id
pub async fn remove(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    jar: CookieJar,
    Path(raw_tool_id): Path<String>,
) -> Result<NoContent, ApiError> {
    let tool_id = raw_tool_id
        .parse::<i64>()
        .map_err(|_| ApiError::invalid_request("Invalid tool_id"))?;

    let owner = resolve_owner(&user, &jar);
    state.bookmarks.remove(owner.as_ref(), tool_id).await?;
    Ok(NoContent)
}
