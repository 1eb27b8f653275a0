use std::{sync::OnceLock, time::Duration};

use axum::http;
use reqwest::Client;

/// Shared HTTP client so both speech providers reuse one connection pool
///
/// Requests run to completion or fail; the only deadline is the
/// transport timeout configured here.
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            let mut headers = http::HeaderMap::new();
            headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));
            headers.insert(
                http::header::USER_AGENT,
                http::HeaderValue::from_static(concat!("voxform/", env!("CARGO_PKG_VERSION"))),
            );

            Client::builder()
                .timeout(Duration::from_secs(120))
                .pool_idle_timeout(Some(Duration::from_secs(30)))
                .tcp_nodelay(true)
                .default_headers(headers)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("falling back to default HTTP client: {e}");
                    Client::new()
                })
        })
        .clone()
}
