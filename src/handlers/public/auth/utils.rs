// handlers/public/auth/utils.rs - Cookie handling shared by register and login

use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::cookies::{self, SESSION_COOKIE};
use crate::database::models::UserResponse;
use crate::services::auth_service::AuthSession;

/// Set the auth cookie and hand any anonymous bookmarks over to the account.
///
/// The `session_id` cookie is cleared once its bookmarks have been migrated.
pub async fn start_session(state: &AppState, jar: CookieJar, session: &AuthSession) -> CookieJar {
    let jar = jar.add(cookies::auth_cookie(
        session.token.clone(),
        state.auth.keys().lifetime(),
        state.config.security.secure_cookies,
    ));

    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty());

    match session_id {
        Some(session_id) => {
            state
                .bookmarks
                .migrate_session(session.user.id, &session_id)
                .await;
            jar.add(cookies::expired(SESSION_COOKIE))
        }
        None => jar,
    }
}

pub fn user_payload(session: &AuthSession) -> Value {
    json!({ "user": UserResponse::from(&session.user) })
}
