use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, StatusCode, header};

/// MP3 bytes ready to be served as a file download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    file_name: String,
    bytes: Vec<u8>,
}

impl Download {
    /// Characters outside `[A-Za-z0-9._-]` in `file_name` are replaced with `_`
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: sanitize(file_name),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn sanitize(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", self.file_name))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("audio/mp3")),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from(self.bytes),
        )
            .into_response()
    }
}
