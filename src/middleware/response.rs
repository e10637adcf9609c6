use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::ListMeta;

/// Success envelope: `{"data": ...}`, plus `"meta"` for paged lists
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: Option<ListMeta>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            meta: None,
            status_code,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// 200 OK with pagination info
    pub fn list(data: T, meta: ListMeta) -> Self {
        Self {
            data,
            meta: Some(meta),
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return crate::error::ApiError::internal_server_error(
                    "Failed to serialize response data",
                )
                .into_response();
            }
        };

        let body = match self.meta {
            Some(meta) => json!({ "data": data, "meta": meta }),
            None => json!({ "data": data }),
        };

        (self.status_code, Json(body)).into_response()
    }
}

/// 204 with an empty body
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// `{"message": ...}` payload for acknowledgements
pub fn message(text: &str) -> Value {
    json!({ "message": text })
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
