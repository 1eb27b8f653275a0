use std::{net::SocketAddr, time::Duration};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Health check endpoint configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_health_path(),
        }
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the cookie `Secure` (serve over TLS when enabled)
    #[serde(default)]
    pub secure: bool,
    /// Sessions idle for longer than this are forgotten
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Maximum number of live sessions
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl SessionConfig {
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure: false,
            idle_timeout_seconds: default_idle_timeout(),
            capacity: default_capacity(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_cookie_name() -> String {
    "voxform_session".to_string()
}

const fn default_idle_timeout() -> u64 {
    8 * 60 * 60
}

const fn default_capacity() -> u64 {
    10_000
}
