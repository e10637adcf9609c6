// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::api::extract::auth_body;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::auth_service::RegisterInput;

use super::utils::{start_session, user_payload};

/// POST /api/v1/auth/register - Create an account and sign it in
///
/// Responds 201 with `{"data":{"user":...}}` and sets the `auth_token` cookie.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let input = auth_body(body)?;
    let session = state.auth.register(input).await?;

    let jar = start_session(&state, jar, &session).await;
    Ok((jar, ApiResponse::created(user_payload(&session))))
}
