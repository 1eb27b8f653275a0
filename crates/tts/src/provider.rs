pub mod cloud_tts;
pub mod gemini;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    error::{Result, TtsError},
    types::{Engine, SynthesisRequest, SynthesizedAudio},
};

/// One speech engine behind the dispatcher
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Call the provider once, without retries
    async fn synthesize(&self, request: &SynthesisRequest, api_key: &SecretString) -> Result<SynthesizedAudio>;

    /// Engine this provider serves
    fn engine(&self) -> Engine;
}

/// Google APIs report failures as `{ "error": { "message": "..." } }`
#[derive(Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
}

/// Turn a non-success provider response into the matching [`TtsError`]
///
/// A body that does not carry `error.message` is reported as unexpected.
async fn provider_error(engine: Engine, response: reqwest::Response) -> TtsError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<GoogleErrorEnvelope>(&body) {
        Ok(envelope) => {
            tracing::error!(%engine, %status, message = %envelope.error.message, "speech provider returned an error");
            TtsError::ProviderApiError {
                engine,
                status: status.as_u16(),
                message: envelope.error.message,
            }
        }
        Err(e) => {
            tracing::error!(%engine, %status, error = %e, "speech provider error body is not readable");
            TtsError::Unexpected(engine)
        }
    }
}

/// Transport failures never echo the request URL, it carries the API key
fn transport_error(engine: Engine, error: reqwest::Error) -> TtsError {
    tracing::error!(%engine, error = %error.without_url(), "speech provider request failed");
    TtsError::Unexpected(engine)
}
