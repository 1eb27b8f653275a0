use std::sync::Arc;

use async_trait::async_trait;
use voxform_config::{ApiKeySource, SynthesisConfig};

use crate::{
    Synthesizer,
    clock::{Clock, SystemClock},
    error::{Result, TtsError},
    provider::{TtsProvider, cloud_tts::CloudTtsProvider, gemini::GeminiProvider},
    types::{Engine, SynthesisRequest, SynthesisResult, SynthesizedAudio},
};

/// Synthesis dispatcher, one provider per engine
pub struct Server {
    api_key: ApiKeySource,
    gemini: GeminiProvider,
    cloud_tts: CloudTtsProvider,
}

impl Server {
    /// Route a request to its engine's provider
    ///
    /// The credential is resolved first, so a missing key is reported
    /// before the engine is even looked at and no provider is called.
    pub async fn dispatch(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        let api_key = self.api_key.resolve().ok_or_else(|| {
            tracing::error!("speech provider API key is not configured");
            TtsError::MissingApiKey
        })?;

        let engine = request.engine.ok_or(TtsError::NoEngine)?;

        self.provider(engine).synthesize(request, &api_key).await
    }

    fn provider(&self, engine: Engine) -> &dyn TtsProvider {
        match engine {
            Engine::Gemini => &self.gemini,
            Engine::CloudTts => &self.cloud_tts,
        }
    }
}

#[async_trait]
impl Synthesizer for Server {
    async fn synthesize(&self, request: SynthesisRequest) -> SynthesisResult {
        self.dispatch(&request).await.into()
    }
}

/// Builder for constructing the dispatcher from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a SynthesisConfig,
    clock: Arc<dyn Clock>,
}

impl<'a> TtsServerBuilder<'a> {
    pub fn new(config: &'a SynthesisConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock used for file name timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Server {
        tracing::debug!(
            gemini_model = %self.config.gemini.model,
            "initializing speech dispatcher"
        );

        Server {
            api_key: self.config.api_key.clone(),
            gemini: GeminiProvider::new(&self.config.gemini, self.clock.clone()),
            cloud_tts: CloudTtsProvider::new(&self.config.cloud_tts, self.clock),
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use voxform_config::{CloudTtsConfig, GeminiConfig};
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::any};

    use super::*;

    fn config(server: &MockServer, api_key: ApiKeySource) -> SynthesisConfig {
        let base_url = Url::parse(&server.uri()).unwrap();
        SynthesisConfig {
            api_key,
            gemini: GeminiConfig {
                base_url: base_url.clone(),
                ..Default::default()
            },
            cloud_tts: CloudTtsConfig { base_url },
        }
    }

    fn literal(key: &str) -> ApiKeySource {
        ApiKeySource::Value {
            value: SecretString::from(key),
        }
    }

    fn request(engine: Option<Engine>) -> SynthesisRequest {
        SynthesisRequest {
            text: "Hello".to_string(),
            engine,
            gemini_accent: "en-US".to_string(),
            gemini_voice: "Puck".to_string(),
            cloud_language: "en-US".to_string(),
            cloud_voice: "en-US-Wavenet-A".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_key_short_circuits_every_engine() {
        let upstream = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = TtsServerBuilder::new(&config(&upstream, literal(""))).build();

        for engine in [Some(Engine::Gemini), Some(Engine::CloudTts), None] {
            let err = server.dispatch(&request(engine)).await.unwrap_err();
            assert_eq!(err.to_string(), "API key is not configured.");
        }
    }

    #[tokio::test]
    async fn no_engine_makes_no_network_call() {
        let upstream = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = TtsServerBuilder::new(&config(&upstream, literal("k"))).build();
        let result = server.synthesize(request(None)).await;

        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!({ "error": "No valid engine selected." })
        );
    }

    #[tokio::test]
    async fn dispatches_to_the_selected_engine() {
        let upstream = MockServer::start().await;
        Mock::given(wiremock::matchers::path("/text:synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "audioContent": "SUQz" })))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = TtsServerBuilder::new(&config(&upstream, literal("k"))).build();
        let audio = server.dispatch(&request(Some(Engine::CloudTts))).await.unwrap();

        assert!(audio.file_name.starts_with("speech_cloud_en-US-Wavenet-A_"));
    }
}
