//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;
use url::Url;
use voxform_config::{
    ApiKeySource, CloudTtsConfig, Config, GeminiConfig, HealthConfig, IdentityConfig, ServerConfig, SynthesisConfig,
};

use super::mock_google::{API_KEY, MockGoogle};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with every Google API pointed at `mock`
    pub fn new(mock: &MockGoogle) -> Self {
        let url = |raw: String| Url::parse(&raw).expect("valid URL");

        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                identity: Some(IdentityConfig {
                    api_key: SecretString::from(API_KEY),
                    identity_base_url: url(mock.identity_base_url()),
                    token_base_url: url(mock.token_base_url()),
                }),
                synthesis: SynthesisConfig {
                    api_key: ApiKeySource::Value {
                        value: SecretString::from(API_KEY),
                    },
                    gemini: GeminiConfig {
                        base_url: url(mock.gemini_base_url()),
                        ..GeminiConfig::default()
                    },
                    cloud_tts: CloudTtsConfig {
                        base_url: url(mock.cloud_tts_base_url()),
                    },
                },
                ..Config::default()
            },
        }
    }

    /// Read the provider key from a variable that is never set
    pub fn without_api_key(mut self) -> Self {
        self.config.synthesis.api_key = ApiKeySource::Env {
            env: "VOXFORM_INTEGRATION_UNSET_KEY".to_owned(),
        };
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
