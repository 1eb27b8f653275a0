use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use voxform_core::ErrorBody;

use crate::error::TtsError;

/// Speech engines the dispatcher knows how to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    /// Gemini speech generation, returns raw PCM
    Gemini,
    /// Cloud Text-to-Speech, returns MP3
    CloudTts,
}

impl Engine {
    pub const ALL: [Self; 2] = [Self::Gemini, Self::CloudTts];

    /// Value used on the wire and in form fields
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::CloudTts => "cloud-tts",
        }
    }

    /// Provider name used in user-facing messages
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::CloudTts => "Cloud TTS",
        }
    }

    /// Marker embedded in generated file names
    pub const fn file_marker(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::CloudTts => "cloud",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Engine {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|engine| engine.as_str() == s)
            .ok_or(TtsError::NoEngine)
    }
}

/// One submit's worth of synthesis input
///
/// Both engines' selections travel together; only the fields of the
/// selected engine are read by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// Text to speak
    #[serde(default)]
    pub text: String,
    /// Selected engine; unknown values deserialize to `None`
    #[serde(default, deserialize_with = "lenient_engine", skip_serializing_if = "Option::is_none")]
    pub engine: Option<Engine>,
    /// Gemini language hint (e.g. "en-US")
    #[serde(default)]
    pub gemini_accent: String,
    /// Gemini prebuilt voice (e.g. "Puck")
    #[serde(default)]
    pub gemini_voice: String,
    /// Cloud TTS language code
    #[serde(default)]
    pub cloud_language: String,
    /// Cloud TTS voice name (e.g. "en-US-Wavenet-A")
    #[serde(default)]
    pub cloud_voice: String,
}

impl SynthesisRequest {
    /// Voice identifier of the given engine's selection
    pub fn voice(&self, engine: Engine) -> &str {
        match engine {
            Engine::Gemini => &self.gemini_voice,
            Engine::CloudTts => &self.cloud_voice,
        }
    }

    /// Language code of the given engine's selection
    pub fn language(&self, engine: Engine) -> &str {
        match engine {
            Engine::Gemini => &self.gemini_accent,
            Engine::CloudTts => &self.cloud_language,
        }
    }
}

fn lenient_engine<'de, D>(deserializer: D) -> Result<Option<Engine>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

/// Encoding of a synthesized payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Raw 16-bit little-endian mono PCM that still needs MP3 encoding
    Pcm { sample_rate: u32 },
    /// Ready-to-download MP3
    Mp3,
}

/// Successful synthesis, serialized as `{ audioData, audioType, sampleRate, fileName }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AudioWire", try_from = "AudioWire")]
pub struct SynthesizedAudio {
    /// Base64 audio payload exactly as the provider returned it
    pub audio_data: String,
    pub format: AudioFormat,
    /// Suggested download name
    pub file_name: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AudioType {
    Pcm,
    Mp3,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AudioWire {
    audio_data: String,
    audio_type: AudioType,
    #[serde(default)]
    sample_rate: u32,
    file_name: String,
}

impl From<SynthesizedAudio> for AudioWire {
    fn from(audio: SynthesizedAudio) -> Self {
        let (audio_type, sample_rate) = match audio.format {
            AudioFormat::Pcm { sample_rate } => (AudioType::Pcm, sample_rate),
            AudioFormat::Mp3 => (AudioType::Mp3, 0),
        };

        Self {
            audio_data: audio.audio_data,
            audio_type,
            sample_rate,
            file_name: audio.file_name,
        }
    }
}

impl TryFrom<AudioWire> for SynthesizedAudio {
    type Error = String;

    fn try_from(wire: AudioWire) -> Result<Self, Self::Error> {
        let format = match wire.audio_type {
            AudioType::Pcm if wire.sample_rate == 0 => return Err("pcm audio requires a sample rate".to_string()),
            AudioType::Pcm => AudioFormat::Pcm {
                sample_rate: wire.sample_rate,
            },
            AudioType::Mp3 => AudioFormat::Mp3,
        };

        Ok(Self {
            audio_data: wire.audio_data,
            format,
            file_name: wire.file_name,
        })
    }
}

/// Outcome of one synthesis call: audio XOR an error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SynthesisResult {
    Success(SynthesizedAudio),
    Error(ErrorBody),
}

impl SynthesisResult {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<crate::error::Result<SynthesizedAudio>> for SynthesisResult {
    fn from(result: crate::error::Result<SynthesizedAudio>) -> Self {
        use voxform_core::HttpError;

        match result {
            Ok(audio) => Self::Success(audio),
            Err(e) => Self::Error(ErrorBody::new(e.client_message())),
        }
    }
}
