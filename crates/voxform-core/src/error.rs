use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer
/// converts these into actual HTTP responses, keeping domain errors
/// decoupled from the handlers that raise them.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `configuration_error`)
    fn error_type(&self) -> &str;

    /// Message safe to show to the person using the form
    fn client_message(&self) -> String;
}

/// Error half of every JSON union the server returns: `{ "error": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

/// Render any [`HttpError`] as its status code plus an [`ErrorBody`]
pub fn error_response<E: HttpError + ?Sized>(error: &E) -> Response {
    (error.status_code(), Json(ErrorBody::new(error.client_message()))).into_response()
}
