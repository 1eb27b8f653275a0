use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::de::DeserializeOwned;
use voxform_core::ErrorBody;

/// Extractor for JSON action bodies
///
/// Rejections use the same `{ "error": ... }` shape as synthesis failures.
pub struct ExtractPayload<T>(pub T);

/// Body limit for speech requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

fn reject(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(ErrorBody::new(message))).into_response()
}

fn is_json(parts: &http::request::Parts) -> bool {
    parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

impl<S, T: DeserializeOwned> axum::extract::FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if !is_json(&parts) {
            return Err(reject(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Content-Type, expected: 'Content-Type: application/json'",
            ));
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                reject(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"),
                )
            } else {
                reject(StatusCode::BAD_REQUEST, format!("Failed to read request body: {err}"))
            }
        })?;

        serde_json::from_slice::<T>(&bytes)
            .map(Self)
            .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("Failed to parse request body: {e}")))
    }
}
