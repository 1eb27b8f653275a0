use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;
use voxform_core::HttpError;

use crate::types::Engine;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Synthesis failures, each rendered as one fixed user-facing sentence
#[derive(Debug, Error)]
pub enum TtsError {
    /// No provider credential is available for this request
    #[error("API key is not configured.")]
    MissingApiKey,

    /// The request named no engine or an engine we do not know
    #[error("No valid engine selected.")]
    NoEngine,

    /// The provider answered with a non-success status and an error message
    #[error("{engine} API error: {message}")]
    ProviderApiError { engine: Engine, status: u16, message: String },

    /// The provider answered successfully but without usable audio
    #[error("Invalid audio data from {0} API.")]
    InvalidAudio(Engine),

    /// Transport failure or an unreadable response
    #[error("An unexpected error occurred with the {0} API.")]
    Unexpected(Engine),
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoEngine => StatusCode::BAD_REQUEST,
            Self::ProviderApiError { status, .. } => match *status {
                400 => StatusCode::BAD_REQUEST,
                401 => StatusCode::UNAUTHORIZED,
                403 => StatusCode::FORBIDDEN,
                429 => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::InvalidAudio(_) | Self::Unexpected(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::MissingApiKey => "configuration_error",
            Self::NoEngine => "invalid_request_error",
            Self::ProviderApiError { .. } => "api_error",
            Self::InvalidAudio(_) => "invalid_response_error",
            Self::Unexpected(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        tracing::debug!(error_type = self.error_type(), "synthesis request failed");
        voxform_core::error_response(&self)
    }
}
