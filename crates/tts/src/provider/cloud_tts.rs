//! Cloud Text-to-Speech provider

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use voxform_config::CloudTtsConfig;

use super::{TtsProvider, provider_error, transport_error};
use crate::{
    clock::{self, Clock},
    error::{Result, TtsError},
    http_client::http_client,
    types::{AudioFormat, Engine, SynthesisRequest, SynthesizedAudio},
};

pub struct CloudTtsProvider {
    client: Client,
    url: String,
    clock: Arc<dyn Clock>,
}

impl CloudTtsProvider {
    pub fn new(config: &CloudTtsConfig, clock: Arc<dyn Clock>) -> Self {
        let base = config.base_url.as_str().trim_end_matches('/');

        Self {
            client: http_client(),
            url: format!("{base}/text:synthesize"),
            clock,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: Input<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct Input<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

#[async_trait]
impl TtsProvider for CloudTtsProvider {
    async fn synthesize(&self, request: &SynthesisRequest, api_key: &SecretString) -> Result<SynthesizedAudio> {
        let engine = self.engine();

        tracing::debug!(
            voice = %request.cloud_voice,
            language = %request.cloud_language,
            input_len = request.text.len(),
            "Cloud TTS request"
        );

        let body = SynthesizeRequest {
            input: Input { text: &request.text },
            voice: VoiceSelection {
                language_code: &request.cloud_language,
                name: &request.cloud_voice,
            },
            audio_config: AudioConfig { audio_encoding: "MP3" },
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(engine, e))?;

        if !response.status().is_success() {
            return Err(provider_error(engine, response).await);
        }

        let parsed: SynthesizeResponse = response.json().await.map_err(|e| transport_error(engine, e))?;

        let audio_content = parsed
            .audio_content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                tracing::error!("Cloud TTS response carried no audio content");
                TtsError::InvalidAudio(engine)
            })?;

        tracing::debug!(bytes = audio_content.len(), "Cloud TTS synthesis complete");

        Ok(SynthesizedAudio {
            audio_data: audio_content,
            format: AudioFormat::Mp3,
            file_name: clock::file_name(engine, &request.cloud_voice, &self.clock.now()),
        })
    }

    fn engine(&self) -> Engine {
        Engine::CloudTts
    }
}
