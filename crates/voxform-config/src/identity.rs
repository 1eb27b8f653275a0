use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Firebase Authentication (Identity Toolkit) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Web API key of the Firebase project
    pub api_key: SecretString,
    /// Base URL of the Identity Toolkit accounts API
    #[serde(default = "default_identity_base_url")]
    pub identity_base_url: Url,
    /// Base URL of the Secure Token API used for refreshes
    #[serde(default = "default_token_base_url")]
    pub token_base_url: Url,
}

impl IdentityConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            identity_base_url: default_identity_base_url(),
            token_base_url: default_token_base_url(),
        }
    }
}

fn default_identity_base_url() -> Url {
    Url::parse("https://identitytoolkit.googleapis.com/v1").expect("must be a valid URL")
}

fn default_token_base_url() -> Url {
    Url::parse("https://securetoken.googleapis.com/v1").expect("must be a valid URL")
}
