use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Environment variable holding the Google API key when nothing else is configured
pub const DEFAULT_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Speech provider configuration shared by both engines
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Where the Google API key comes from
    #[serde(default)]
    pub api_key: ApiKeySource,
    /// Gemini speech generation
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Cloud Text-to-Speech
    #[serde(default)]
    pub cloud_tts: CloudTtsConfig,
}

/// Source of the provider credential
///
/// The key is looked up on every synthesis request, so an `env` source picks
/// up a variable exported after startup and reports its absence per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiKeySource {
    /// Read from an environment variable at request time
    Env { env: String },
    /// Fixed value from the configuration file
    Value { value: SecretString },
}

impl Default for ApiKeySource {
    fn default() -> Self {
        Self::Env {
            env: DEFAULT_API_KEY_VAR.to_string(),
        }
    }
}

impl ApiKeySource {
    /// Current credential, `None` when unset or empty
    pub fn resolve(&self) -> Option<SecretString> {
        match self {
            Self::Env { env } => std::env::var(env)
                .ok()
                .filter(|value| !value.is_empty())
                .map(SecretString::from),
            Self::Value { value } => (!value.expose_secret().is_empty()).then(|| value.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: Url,
    /// Speech-capable model name
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudTtsConfig {
    /// Base URL of the Cloud Text-to-Speech API
    #[serde(default = "default_cloud_tts_base_url")]
    pub base_url: Url,
}

impl Default for CloudTtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_cloud_tts_base_url(),
        }
    }
}

fn default_gemini_base_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com/v1beta").expect("must be a valid URL")
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_cloud_tts_base_url() -> Url {
    Url::parse("https://texttospeech.googleapis.com/v1").expect("must be a valid URL")
}
