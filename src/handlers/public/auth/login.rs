// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::api::extract::auth_body;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::auth_service::LoginInput;

use super::utils::{start_session, user_payload};

/// POST /api/v1/auth/login - Authenticate with email and password
///
/// Unknown emails and wrong passwords both answer 401 `INVALID_CREDENTIALS`.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let input = auth_body(body)?;
    let session = state.auth.login(input).await?;
    tracing::info!("User {} signed in", session.user.id);

    let jar = start_session(&state, jar, &session).await;
    Ok((jar, ApiResponse::success(user_payload(&session))))
}
