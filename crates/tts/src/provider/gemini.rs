//! Gemini speech generation provider

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use voxform_config::GeminiConfig;

use super::{TtsProvider, provider_error, transport_error};
use crate::{
    clock::{self, Clock},
    error::{Result, TtsError},
    http_client::http_client,
    types::{AudioFormat, Engine, SynthesisRequest, SynthesizedAudio},
};

/// Sample rate assumed when the mime type does not state one
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

static RATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"rate=(\d+)").expect("must be valid regex"));

/// Gemini `generateContent` with audio output
pub struct GeminiProvider {
    client: Client,
    url: String,
    model: String,
    clock: Arc<dyn Clock>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig, clock: Arc<dyn Clock>) -> Self {
        let base = config.base_url.as_str().trim_end_matches('/');

        Self {
            client: http_client(),
            url: format!("{base}/models/{}:generateContent", config.model),
            model: config.model.clone(),
            clock,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
    model: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    language_code: &'a str,
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct InlineData {
    data: Option<String>,
    mime_type: Option<String>,
}

/// L16 payload pulled out of a Gemini response
struct PcmPayload {
    data: String,
    mime_type: String,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].inlineData`, when it carries L16 audio
    fn into_pcm(self) -> Option<PcmPayload> {
        let inline = self
            .candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .inline_data?;

        let data = inline.data.filter(|data| !data.is_empty())?;
        let mime_type = inline.mime_type.filter(|mime| mime.starts_with("audio/L16"))?;

        Some(PcmPayload { data, mime_type })
    }
}

/// Sample rate from an `audio/L16;codec=pcm;rate=24000` style mime type
///
/// A missing, unparsable or zero rate falls back to [`DEFAULT_SAMPLE_RATE`].
pub fn sample_rate(mime_type: &str) -> u32 {
    RATE_RE
        .captures(mime_type)
        .and_then(|captures| captures[1].parse().ok())
        .filter(|&rate| rate > 0)
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

#[async_trait]
impl TtsProvider for GeminiProvider {
    async fn synthesize(&self, request: &SynthesisRequest, api_key: &SecretString) -> Result<SynthesizedAudio> {
        let engine = self.engine();

        tracing::debug!(
            model = %self.model,
            voice = %request.gemini_voice,
            accent = %request.gemini_accent,
            input_len = request.text.len(),
            "Gemini speech request"
        );

        let body = GenerateRequest {
            contents: [Content {
                parts: [TextPart { text: &request.text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    language_code: &request.gemini_accent,
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &request.gemini_voice,
                        },
                    },
                },
            },
            model: &self.model,
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

        let parsed: GenerateResponse = response.json().await.map_err(|e| transport_error(engine, e))?;

        let inline = parsed.into_pcm().ok_or_else(|| {
                tracing::error!("Gemini response carried no L16 audio");
                TtsError::InvalidAudio(engine)
            })?;

        let sample_rate = sample_rate(&inline.mime_type);
        let file_name = clock::file_name(engine, &request.gemini_voice, &self.clock.now());

        tracing::debug!(sample_rate, bytes = inline.data.len(), "Gemini synthesis complete");

        Ok(SynthesizedAudio {
            audio_data: inline.data,
            format: AudioFormat::Pcm { sample_rate },
            file_name,
        })
    }

    fn engine(&self) -> Engine {
        Engine::Gemini
    }
}
