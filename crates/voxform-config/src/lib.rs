#![allow(clippy::must_use_candidate)]

pub mod audio;
mod env;
pub mod identity;
mod loader;
pub mod server;
pub mod synthesis;
pub mod telemetry;

use serde::Deserialize;

pub use audio::*;
pub use identity::*;
pub use server::*;
pub use synthesis::*;
pub use telemetry::{ExportProtocol, ExporterConfig, TelemetryConfig, TracingConfig};

/// Top-level voxform configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity provider used by the sign-in screen
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
    /// Speech provider configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// MP3 encoding configuration
    #[serde(default)]
    pub audio: AudioConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
