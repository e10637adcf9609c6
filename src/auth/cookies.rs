use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const AUTH_COOKIE: &str = "auth_token";
pub const SESSION_COOKIE: &str = "session_id";

const SESSION_MAX_AGE_DAYS: i64 = 365;

pub fn auth_cookie(token: String, lifetime: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(lifetime.num_seconds()))
        .build()
}

pub fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

/// Removal cookie (empty value, `Max-Age=0`); pass to `CookieJar::add` so it is
/// sent even when the request did not carry the cookie.
pub fn expired(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}

/// True when the fronting proxy reports the request arrived over TLS.
pub fn request_is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|proto| proto.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}
