use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::auth::cookies::AUTH_COOKIE;
use crate::auth::Claims;
use crate::database::models::UserRole;
use crate::error::ApiError;

/// Authenticated caller extracted from the `auth_token` cookie
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Identity of the caller on routes where signing in is optional.
pub type MaybeAuthUser = Option<Extension<AuthUser>>;

fn authenticate(state: &AppState, jar: &CookieJar) -> Result<AuthUser, ApiError> {
    let token = jar
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let claims = state
        .auth
        .keys()
        .validate(&token)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    Ok(AuthUser::from(claims))
}

/// Rejects the request with 401 unless it carries a valid auth cookie.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &jar) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Attaches the caller's identity when present; never rejects.
pub async fn optional_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(user) = authenticate(&state, &jar) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role.is_admin() => next.run(request).await,
        Some(user) => {
            tracing::debug!("User {} denied admin access", user.id);
            ApiError::forbidden("Access denied: admin role required").into_response()
        }
        None => ApiError::forbidden("Access denied: role not found").into_response(),
    }
}
