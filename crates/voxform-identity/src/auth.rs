use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::watch;

use crate::{AuthError, Identity, IdentityProvider};

/// Auth state as broadcast to subscribers
///
/// `None` until the first notification; afterwards `Some(user)`, where
/// `user` is `None` when signed out.
pub type AuthState = Option<Option<Identity>>;

/// Per-session handle on the identity provider
///
/// Every state change (sign-in, sign-out, token refresh) is broadcast on a
/// watch channel; [`crate::IdentityGate`] is the scoped subscriber.
pub struct Auth {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
}

impl Auth {
    /// New handle whose state is not yet known
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(None);
        Self { provider, state }
    }

    /// Publish the restored user as the first notification
    ///
    /// Later calls are ignored once the state has been resolved.
    pub fn resolve(&self, user: Option<Identity>) {
        self.state.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(user);
            true
        });
    }

    pub fn is_resolved(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.state.borrow().clone().flatten()
    }

    /// Subscribe to every subsequent state change
    pub fn on_auth_state_changed(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Live subscriptions, one per mounted gate
    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in(email, password).await?;
        self.state.send_replace(Some(Some(identity.clone())));
        Ok(identity)
    }

    /// Request a reset email; an empty address never reaches the provider
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::EmailRequired);
        }

        self.provider.send_password_reset(email).await
    }

    /// Forget the signed-in user; signing out twice is harmless
    pub fn sign_out(&self) {
        self.state.send_replace(Some(None));
    }

    /// Renew the ID token when it is about to expire
    ///
    /// A rejected refresh signs the session out.
    pub async fn refresh_if_expired(&self, now: Timestamp) -> Option<Identity> {
        let user = self.current_user()?;

        if !user.is_expired(now) {
            return Some(user);
        }

        match self.provider.refresh(&user).await {
            Ok(fresh) => {
                self.state.send_replace(Some(Some(fresh.clone())));
                Some(fresh)
            }
            Err(e) => {
                tracing::warn!(uid = %user.uid, error = %e, "token refresh failed, signing out");
                self.sign_out();
                None
            }
        }
    }
}
