use async_trait::async_trait;

use crate::{AuthError, Identity};

/// Email/password identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a signed-in identity
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Ask the provider to email a password reset link
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Trade `identity`'s refresh token for fresh tokens
    async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError>;
}

