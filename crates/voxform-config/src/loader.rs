use std::path::Path;

use secrecy::ExposeSecret;

use crate::{Config, audio::SUPPORTED_BITRATES_KBPS};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_identity()?;
        self.validate_server()?;
        self.validate_audio()?;
        self.validate_telemetry()?;
        Ok(())
    }

    /// The sign-in screen cannot work without an identity provider
    fn validate_identity(&self) -> anyhow::Result<()> {
        let Some(ref identity) = self.identity else {
            anyhow::bail!("an [identity] section is required");
        };

        if identity.api_key.expose_secret().is_empty() {
            anyhow::bail!("identity.api_key must not be empty");
        }

        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let session = &self.server.session;

        if session.idle_timeout_seconds == 0 {
            anyhow::bail!("server.session.idle_timeout_seconds must be greater than 0");
        }

        if session.capacity == 0 {
            anyhow::bail!("server.session.capacity must be greater than 0");
        }

        if session.cookie_name.is_empty() || session.cookie_name.contains([';', '=', ' ']) {
            anyhow::bail!("server.session.cookie_name is not a valid cookie name");
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_audio(&self) -> anyhow::Result<()> {
        if !SUPPORTED_BITRATES_KBPS.contains(&self.audio.bitrate_kbps) {
            anyhow::bail!(
                "audio.bitrate_kbps must be one of {SUPPORTED_BITRATES_KBPS:?}, got {}",
                self.audio.bitrate_kbps
            );
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        if let Some(ref telemetry) = self.telemetry
            && let Some(ref tracing) = telemetry.tracing
            && !(0.0..=1.0).contains(&tracing.sampling_rate)
        {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
