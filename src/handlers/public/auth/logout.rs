// handlers/public/auth/logout.rs - POST /auth/logout handler

use axum_extra::extract::CookieJar;

use crate::auth::cookies::{self, AUTH_COOKIE};
use crate::middleware::NoContent;

/// POST /api/v1/auth/logout - Drop the auth cookie
///
/// The token itself stays valid until it expires.
pub async fn logout(jar: CookieJar) -> (CookieJar, NoContent) {
    (jar.add(cookies::expired(AUTH_COOKIE)), NoContent)
}
