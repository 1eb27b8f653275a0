//! Static language and voice tables for both engines

use serde::Serialize;

use crate::types::Engine;

/// Selectable language or accent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

/// Selectable voice, optionally tied to one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub name: &'static str,
    pub code: &'static str,
    #[serde(rename = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<&'static str>,
}

const fn lang(name: &'static str, code: &'static str) -> Language {
    Language { name, code }
}

const fn prebuilt(name: &'static str, code: &'static str) -> Voice {
    Voice {
        name,
        code,
        language: None,
    }
}

const fn wavenet(name: &'static str, code: &'static str, language: &'static str) -> Voice {
    Voice {
        name,
        code,
        language: Some(language),
    }
}

/// Language hints accepted by Gemini speech generation
pub static GEMINI_ACCENTS: [Language; 10] = [
    lang("English (US)", "en-US"),
    lang("English (India)", "en-IN"),
    lang("Spanish (US)", "es-US"),
    lang("French (France)", "fr-FR"),
    lang("German (Germany)", "de-DE"),
    lang("Hindi (India)", "hi-IN"),
    lang("Japanese (Japan)", "ja-JP"),
    lang("Korean (South Korea)", "ko-KR"),
    lang("Portuguese (Brazil)", "pt-BR"),
    lang("Russian (Russia)", "ru-RU"),
];

/// Gemini prebuilt voices, grouped by character then alphabetized
pub static GEMINI_VOICES: [Voice; 30] = [
    prebuilt("Enceladus (Breathy)", "Enceladus"),
    prebuilt("Aoede (Breezy)", "Aoede"),
    prebuilt("Autonoe (Bright)", "Autonoe"),
    prebuilt("Zephyr (Bright)", "Zephyr"),
    prebuilt("Zubenelgenubi (Casual)", "Zubenelgenubi"),
    prebuilt("Erinome (Clear)", "Erinome"),
    prebuilt("Iapetus (Clear)", "Iapetus"),
    prebuilt("Callirrhoe (Easy-going)", "Callirrhoe"),
    prebuilt("Umbriel (Easy-going)", "Umbriel"),
    prebuilt("Schedar (Even)", "Schedar"),
    prebuilt("Fenrir (Excitable)", "Fenrir"),
    prebuilt("Alnilam (Firm)", "Alnilam"),
    prebuilt("Kore (Firm)", "Kore"),
    prebuilt("Orus (Firm)", "Orus"),
    prebuilt("Pulcherrima (Forward)", "Pulcherrima"),
    prebuilt("Achird (Friendly)", "Achird"),
    prebuilt("Vindemiatrix (Gentle)", "Vindemiatrix"),
    prebuilt("Algenib (Gravelly)", "Algenib"),
    prebuilt("Charon (Informative)", "Charon"),
    prebuilt("Rasalgethi (Informative)", "Rasalgethi"),
    prebuilt("Sadaltager (Knowledgeable)", "Sadaltager"),
    prebuilt("Sadachbia (Lively)", "Sadachbia"),
    prebuilt("Gacrux (Mature)", "Gacrux"),
    prebuilt("Algieba (Smooth)", "Algieba"),
    prebuilt("Despina (Smooth)", "Despina"),
    prebuilt("Achernar (Soft)", "Achernar"),
    prebuilt("Laomedeia (Upbeat)", "Laomedeia"),
    prebuilt("Puck (Upbeat)", "Puck"),
    prebuilt("Sulafat (Warm)", "Sulafat"),
    prebuilt("Leda (Youthful)", "Leda"),
];

pub static CLOUD_TTS_LANGUAGES: [Language; 10] = [
    lang("English (US)", "en-US"),
    lang("English (UK)", "en-GB"),
    lang("Spanish (Spain)", "es-ES"),
    lang("Spanish (Mexico)", "es-MX"),
    lang("French (France)", "fr-FR"),
    lang("German (Germany)", "de-DE"),
    lang("Italian (Italy)", "it-IT"),
    lang("Japanese (Japan)", "ja-JP"),
    lang("Korean (South Korea)", "ko-KR"),
    lang("Portuguese (Brazil)", "pt-BR"),
];

/// Curated WaveNet voices; Italian, Japanese, Korean and Portuguese have none yet
pub static CLOUD_TTS_VOICES: [Voice; 14] = [
    wavenet("WaveNet (A) - Female", "en-US-Wavenet-A", "en-US"),
    wavenet("WaveNet (B) - Male", "en-US-Wavenet-B", "en-US"),
    wavenet("WaveNet (C) - Female", "en-US-Wavenet-C", "en-US"),
    wavenet("WaveNet (D) - Male", "en-US-Wavenet-D", "en-US"),
    wavenet("WaveNet (A) - Female", "en-GB-Wavenet-A", "en-GB"),
    wavenet("WaveNet (B) - Male", "en-GB-Wavenet-B", "en-GB"),
    wavenet("WaveNet (A) - Female", "es-ES-Wavenet-A", "es-ES"),
    wavenet("WaveNet (B) - Male", "es-ES-Wavenet-B", "es-ES"),
    wavenet("WaveNet (A) - Female", "es-MX-Wavenet-A", "es-MX"),
    wavenet("WaveNet (B) - Male", "es-MX-Wavenet-B", "es-MX"),
    wavenet("WaveNet (A) - Female", "fr-FR-Wavenet-A", "fr-FR"),
    wavenet("WaveNet (B) - Male", "fr-FR-Wavenet-B", "fr-FR"),
    wavenet("WaveNet (A) - Female", "de-DE-Wavenet-A", "de-DE"),
    wavenet("WaveNet (B) - Male", "de-DE-Wavenet-B", "de-DE"),
];

/// Languages (Gemini: accents) offered for an engine
pub fn languages(engine: Engine) -> &'static [Language] {
    match engine {
        Engine::Gemini => &GEMINI_ACCENTS,
        Engine::CloudTts => &CLOUD_TTS_LANGUAGES,
    }
}

/// Every voice of an engine, regardless of language
pub fn voices(engine: Engine) -> &'static [Voice] {
    match engine {
        Engine::Gemini => &GEMINI_VOICES,
        Engine::CloudTts => &CLOUD_TTS_VOICES,
    }
}

/// Cloud TTS voices tagged with `code`; empty when the language has none
pub fn voices_for_language(code: &str) -> impl Iterator<Item = &'static Voice> + '_ {
    CLOUD_TTS_VOICES.iter().filter(move |voice| voice.language == Some(code))
}

pub fn first_voice_for_language(code: &str) -> Option<&'static Voice> {
    voices_for_language(code).next()
}

/// Whether `voice` is a Cloud TTS voice for `language`
pub fn voice_matches_language(voice: &str, language: &str) -> bool {
    voices_for_language(language).any(|v| v.code == voice)
}

/// Full catalog, as served to scripted clients
#[derive(Debug, Serialize)]
pub struct Catalog {
    pub engines: Vec<EngineCatalog>,
}

#[derive(Debug, Serialize)]
pub struct EngineCatalog {
    pub engine: Engine,
    pub name: &'static str,
    pub languages: &'static [Language],
    pub voices: &'static [Voice],
}

impl Catalog {
    pub fn all() -> Self {
        Self {
            engines: Engine::ALL
                .into_iter()
                .map(|engine| EngineCatalog {
                    engine,
                    name: engine.display_name(),
                    languages: languages(engine),
                    voices: voices(engine),
                })
                .collect(),
        }
    }
}
