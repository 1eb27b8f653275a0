//! Form controller: draft selections, option subsets and the submit lifecycle

use delivery::{Download, EncoderSlot};
use serde::Deserialize;
use tokio::sync::Mutex;
use tts::{
    Engine, SynthesisRequest, SynthesisResult, Synthesizer,
    catalog::{self, Language, Voice},
};
use voxform_core::HttpError;

/// Everything the person has picked so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub engine: Engine,
    pub gemini_accent: String,
    pub gemini_voice: String,
    pub cloud_language: String,
    pub cloud_voice: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            text: String::new(),
            engine: Engine::Gemini,
            gemini_accent: "en-US".to_string(),
            gemini_voice: "Puck".to_string(),
            cloud_language: "en-US".to_string(),
            cloud_voice: "en-US-Wavenet-A".to_string(),
        }
    }
}

impl Draft {
    fn to_request(&self) -> SynthesisRequest {
        SynthesisRequest {
            text: self.text.clone(),
            engine: Some(self.engine),
            gemini_accent: self.gemini_accent.clone(),
            gemini_voice: self.gemini_voice.clone(),
            cloud_language: self.cloud_language.clone(),
            cloud_voice: self.cloud_voice.clone(),
        }
    }
}

/// Why a submit was refused before reaching the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("A request is already in progress.")]
    InFlight,

    #[error("Enter some text and pick a voice for the selected language.")]
    Incomplete,
}

/// Fields posted by the form page
///
/// Absent fields keep the current selection.
#[derive(Debug, Default, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub text: String,
    pub engine: Option<String>,
    pub gemini_accent: Option<String>,
    pub gemini_voice: Option<String>,
    pub cloud_language: Option<String>,
    pub cloud_voice: Option<String>,
    #[serde(default)]
    pub intent: Intent,
}

/// Which button posted the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Synthesize and download
    #[default]
    Generate,
    /// Only apply the selections and show the matching options
    Refresh,
}

/// Per-session form state
#[derive(Debug, Default)]
pub struct FormController {
    draft: Draft,
    error: Option<String>,
    in_flight: bool,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    /// Switch engines; each engine keeps its own selections
    pub const fn set_engine(&mut self, engine: Engine) {
        self.draft.engine = engine;
    }

    pub fn set_gemini_accent(&mut self, accent: impl Into<String>) {
        self.draft.gemini_accent = accent.into();
    }

    pub fn set_gemini_voice(&mut self, voice: impl Into<String>) {
        self.draft.gemini_voice = voice.into();
    }

    /// Change the Cloud TTS language and select its first voice
    ///
    /// A language without voices leaves the previous voice selected.
    pub fn set_cloud_language(&mut self, language: impl Into<String>) {
        self.draft.cloud_language = language.into();

        if let Some(voice) = catalog::first_voice_for_language(&self.draft.cloud_language) {
            self.draft.cloud_voice = voice.code.to_string();
        }
    }

    pub fn set_cloud_voice(&mut self, voice: impl Into<String>) {
        self.draft.cloud_voice = voice.into();
    }

    /// Apply posted fields in the order a person would change them
    ///
    /// A language change wins over the posted voice, which still belongs to
    /// the previous language's option list.
    pub fn apply(&mut self, fields: FormFields) {
        self.set_text(fields.text);

        if let Some(engine) = fields.engine.and_then(|raw| raw.parse().ok()) {
            self.set_engine(engine);
        }
        if let Some(accent) = fields.gemini_accent {
            self.set_gemini_accent(accent);
        }
        if let Some(voice) = fields.gemini_voice {
            self.set_gemini_voice(voice);
        }

        match fields.cloud_language {
            Some(language) if language != self.draft.cloud_language => self.set_cloud_language(language),
            _ => {
                if let Some(voice) = fields.cloud_voice {
                    self.set_cloud_voice(voice);
                }
            }
        }
    }

    /// Languages (accents for Gemini) shown for the selected engine
    pub fn visible_languages(&self) -> &'static [Language] {
        catalog::languages(self.draft.engine)
    }

    /// Voices shown for the selected engine
    ///
    /// Gemini voices are not tied to an accent; Cloud TTS voices are
    /// filtered by the selected language and may be empty.
    pub fn visible_voices(&self) -> Vec<&'static Voice> {
        match self.draft.engine {
            Engine::Gemini => catalog::voices(Engine::Gemini).iter().collect(),
            Engine::CloudTts => catalog::voices_for_language(&self.draft.cloud_language).collect(),
        }
    }

    /// The selected language code of the active engine
    pub fn selected_language(&self) -> &str {
        match self.draft.engine {
            Engine::Gemini => &self.draft.gemini_accent,
            Engine::CloudTts => &self.draft.cloud_language,
        }
    }

    /// The selected voice code of the active engine
    pub fn selected_voice(&self) -> &str {
        match self.draft.engine {
            Engine::Gemini => &self.draft.gemini_voice,
            Engine::CloudTts => &self.draft.cloud_voice,
        }
    }

    /// Whether the Cloud TTS voice belongs to a different language
    pub fn cloud_voice_is_stale(&self) -> bool {
        self.draft.engine == Engine::CloudTts
            && !catalog::voice_matches_language(&self.draft.cloud_voice, &self.draft.cloud_language)
    }

    pub fn can_submit(&self) -> bool {
        !self.draft.text.is_empty() && !self.in_flight && !self.cloud_voice_is_stale()
    }

    /// Clear the error, mark the form in flight and hand out the request
    pub fn begin_submit(&mut self) -> Result<SynthesisRequest, Rejected> {
        if self.in_flight {
            return Err(Rejected::InFlight);
        }
        if !self.can_submit() {
            return Err(Rejected::Incomplete);
        }

        self.error = None;
        self.in_flight = true;

        Ok(self.draft.to_request())
    }

    /// Record how a submit ended; always clears the in-flight flag
    pub fn settle(&mut self, outcome: Result<Download, String>) -> Option<Download> {
        self.in_flight = false;

        match outcome {
            Ok(download) => Some(download),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

/// Run one submit end to end
///
/// The lock is held only to begin and to settle, never across the provider
/// call. `Ok(None)` means the submit ran and its error is now on the form.
pub async fn submit(
    form: &Mutex<FormController>,
    synthesizer: &dyn Synthesizer,
    encoder: &EncoderSlot,
) -> Result<Option<Download>, Rejected> {
    let request = form.lock().await.begin_submit()?;

    tracing::debug!(engine = ?request.engine, "form submitted");

    let outcome = match synthesizer.synthesize(request).await {
        SynthesisResult::Error(body) => Err(body.error),
        SynthesisResult::Success(audio) => delivery::deliver(encoder, audio)
            .await
            .map_err(|e| e.client_message()),
    };

    if let Err(message) = &outcome {
        tracing::debug!(%message, "submit failed");
    }

    Ok(form.lock().await.settle(outcome))
}
