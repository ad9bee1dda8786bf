use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Centralized error types for the service
///
/// Handlers return this enum; its `IntoResponse` impl turns every variant
/// into a JSON body of the form `{"detail": "<message>"}`.
///
/// # Example
///
/// ```no_run
/// use mediafetch::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The extractor could not resolve metadata or produce the file.
    /// Displayed verbatim: the caller sees the extractor's own text.
    #[error("{0}")]
    Extraction(String),

    /// Streaming channel initiation message was missing required fields
    #[error("{0}")]
    Protocol(String),

    /// Request failed local validation (empty URL)
    #[error("{0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status used when this error reaches a client
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Extraction(_) | AppError::Protocol(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "detail": self.to_string()
        }));

        (status, body).into_response()
    }
}
