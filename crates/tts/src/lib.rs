#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod catalog;
pub mod clock;
mod error;
mod http_client;
mod provider;
mod request;
mod server;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, TtsError};
pub use provider::gemini::DEFAULT_SAMPLE_RATE;
pub use server::{Server, TtsServerBuilder};
pub use types::{AudioFormat, Engine, SynthesisRequest, SynthesisResult, SynthesizedAudio};
use request::ExtractPayload;

/// Anything that can turn a [`SynthesisRequest`] into a [`SynthesisResult`]
///
/// The form controller depends on this rather than on [`Server`] so that
/// it can be driven without network access.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> SynthesisResult;
}

/// Build the synthesis dispatcher from configuration
pub fn build_server(config: &voxform_config::Config) -> Arc<Server> {
    Arc::new(TtsServerBuilder::new(&config.synthesis).build())
}

/// JSON dispatcher action; the caller layers session authentication on top
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/api/speech", post(speech))
}

/// Public voice catalog for scripted clients
pub fn catalog_router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/api/catalog", get(catalog))
}

async fn speech(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<SynthesisRequest>,
) -> Result<Json<SynthesisResult>> {
    tracing::debug!(engine = ?request.engine, "speech action called");

    let audio = server.dispatch(&request).await?;

    Ok(Json(SynthesisResult::Success(audio)))
}

async fn catalog() -> Json<Catalog> {
    Json(Catalog::all())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;
    use voxform_config::{ApiKeySource, CloudTtsConfig, GeminiConfig, SynthesisConfig};
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    use super::*;

    fn router(upstream: &MockServer) -> Router {
        let base_url = Url::parse(&upstream.uri()).unwrap();
        let config = SynthesisConfig {
            api_key: ApiKeySource::Value {
                value: SecretString::from("k"),
            },
            gemini: GeminiConfig {
                base_url: base_url.clone(),
                ..Default::default()
            },
            cloud_tts: CloudTtsConfig { base_url },
        };

        endpoint_router()
            .merge(catalog_router())
            .with_state(Arc::new(TtsServerBuilder::new(&config).build()))
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn speech_request(body: &Value) -> Request<Body> {
        Request::post("/api/speech")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn speech_returns_success_variant() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "audioContent": "SUQz" })))
            .mount(&upstream)
            .await;

        let (status, body) = call(
            router(&upstream),
            speech_request(&json!({
                "text": "Hello",
                "engine": "cloud-tts",
                "cloudLanguage": "en-US",
                "cloudVoice": "en-US-Wavenet-A",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["audioType"], "mp3");
        assert_eq!(body["sampleRate"], 0);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn speech_returns_error_variant_with_status() {
        let upstream = MockServer::start().await;

        let (status, body) = call(router(&upstream), speech_request(&json!({ "text": "Hello", "engine": "polly" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No valid engine selected." }));
    }

    #[tokio::test]
    async fn catalog_lists_both_engines() {
        let upstream = MockServer::start().await;
        let request = Request::get("/api/catalog").body(Body::empty()).unwrap();

        let (status, body) = call(router(&upstream), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["engines"][0]["engine"], "gemini");
        assert_eq!(body["engines"][0]["voices"].as_array().unwrap().len(), 30);
        assert_eq!(body["engines"][1]["languages"].as_array().unwrap().len(), 10);
    }
}
