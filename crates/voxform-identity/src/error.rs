use axum::response::{IntoResponse, Response};
use http::StatusCode;
use voxform_core::HttpError;

/// Authentication errors
///
/// Messages are deliberately generic; the identity provider's own detail is
/// logged where the failure happens and never reaches the page.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Sign-in was rejected or could not be completed
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// Password reset requested without an email address
    #[error("Please enter your email to reset your password.")]
    EmailRequired,

    /// The identity provider refused or failed the reset request
    #[error("Failed to send reset link. Is the email correct?")]
    ResetFailed,

    /// A signed-in user is required and the session has none
    #[error("Please sign in to continue.")]
    SignInRequired,

    /// The refresh token was rejected; the session is signed out
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    /// Session state was read where no gate was mounted
    #[error("identity gate accessed outside of its scope")]
    OutsideScope,
}

impl HttpError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::SignInRequired | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::EmailRequired | Self::ResetFailed => StatusCode::BAD_REQUEST,
            Self::OutsideScope => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidCredentials | Self::SignInRequired | Self::SessionExpired => "authentication_error",
            Self::EmailRequired | Self::ResetFailed => "invalid_request_error",
            Self::OutsideScope => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        voxform_core::error_response(&self)
    }
}
