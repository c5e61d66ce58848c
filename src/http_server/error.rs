use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::resolver::error::ResolveError;

pub const SUCCESS_CODE: i32 = 1;
pub const FAILURE_CODE: i32 = -1;
pub const SUCCESS_MSG: &str = "success";

/// JSON envelope every `/songlist` response is wrapped in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: SUCCESS_MSG.to_string(),
            data: Some(data),
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: FAILURE_CODE,
            msg: msg.into(),
            data: None,
        }
    }
}

// Tell axum how to convert `ResolveError` into a response.
pub struct ApiError(pub ResolveError);

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = if err.is_client_error() {
            tracing::warn!("Rejected playlist request: {}", err);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Failed to resolve playlist: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(ApiResult::<()>::failure(err.to_string()))).into_response()
    }
}
