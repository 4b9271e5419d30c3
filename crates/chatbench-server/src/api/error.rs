use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatbench_core::RelayError;
use serde_json::json;

/// Handler failure. Not-found answers carry `{message}`, everything else
/// `{error}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    Conflict(String),
    Unavailable(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound(resource) => json!({ "message": format!("{} not found", resource) }),
            ApiError::BadRequest(error)
            | ApiError::Conflict(error)
            | ApiError::Unavailable(error)
            | ApiError::BadGateway(error)
            | ApiError::Internal(error) => json!({ "error": error }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "API error");
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let message = err.to_string();
        match err {
            RelayError::Busy => ApiError::Conflict(message),
            RelayError::NotConfigured => ApiError::Unavailable(message),
            RelayError::InvalidParams(_) => ApiError::BadRequest(message),
            RelayError::Llm(_) => ApiError::BadGateway(message),
        }
    }
}
