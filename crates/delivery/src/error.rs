use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;
use voxform_core::HttpError;

/// Failures turning a synthesis result into a downloadable file
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The encoder slot has not been filled yet
    #[error("MP3 encoder library has not loaded yet. Please try again.")]
    EncoderNotLoaded,

    /// The encoder library itself could not be initialized
    #[error("The MP3 encoder failed to load. Please refresh the page and try again.")]
    EncoderUnavailable,

    /// Undecodable payload or an encoder error mid-stream
    #[error("Failed to encode MP3 audio.")]
    EncodeFailed,
}

impl HttpError for DeliveryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::EncoderNotLoaded | Self::EncoderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::EncodeFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::EncoderNotLoaded => "encoder_not_ready",
            Self::EncoderUnavailable => "encoder_unavailable",
            Self::EncodeFailed => "encode_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        voxform_core::error_response(&self)
    }
}
