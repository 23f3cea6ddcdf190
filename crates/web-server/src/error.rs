use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registry::error::RegistryError;
use serde_json::json;
use thiserror::Error;

/// Any failure raised while handling a request.
///
/// This is the single place where failures become status codes.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The request body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),
    #[error("Request body is too large.")]
    PayloadTooLarge,
    #[error("Route {0} not found.")]
    RouteNotFound(String),
    /// The path exists but does not accept this method.
    #[error("Method {method} not allowed on {path}.")]
    MethodNotAllowed { method: String, path: String },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Registry(err) => match err {
                RegistryError::Validation { .. } => StatusCode::BAD_REQUEST,
                RegistryError::Conflict { .. } => StatusCode::CONFLICT,
                RegistryError::NotFound(_) | RegistryError::MalformedIdentifier(_) => {
                    StatusCode::NOT_FOUND
                }
                RegistryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(format!("Validation failed: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Registry(RegistryError::MalformedIdentifier(rejection.body_text()))
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Registry(RegistryError::Internal(db_err)) => {
                tracing::error!(error = ?db_err, "Record store error.");
                "An internal server error occurred.".to_string()
            }
            other => {
                tracing::debug!(%status, error = %other, "Request failed.");
                other.to_string()
            }
        };

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}
