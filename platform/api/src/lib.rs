use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use platform_db::BackendError;
use thiserror::Error;

/// Value of `Access-Control-Allow-Origin` on every response.
pub const ALLOW_ORIGIN: &str = "*";

/// Value of `Access-Control-Allow-Headers` on every response.
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey";

pub type ApiResult<T> = Result<T, ApiError>;

/// Anything that can go wrong while serving a request.
///
/// All variants collapse into the same response: status 500 with the
/// error's message as a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Body(#[from] axum::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The body parsed as JSON `null`, which has no `employees` field to read.
    #[error("cannot read employees from a null body")]
    NullBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            message,
        )
            .into_response()
    }
}
