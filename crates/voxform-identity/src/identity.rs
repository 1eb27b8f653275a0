use jiff::{SignedDuration, Timestamp};
use secrecy::SecretString;

/// Refresh this long before the ID token actually expires
const EXPIRY_MARGIN: SignedDuration = SignedDuration::from_secs(60);

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone)]
pub struct Identity {
    /// Provider-assigned user id
    pub uid: String,
    pub email: String,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
    /// When `id_token` stops being accepted
    pub expires_at: Timestamp,
}

impl Identity {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match now.checked_add(EXPIRY_MARGIN) {
            Ok(deadline) => deadline >= self.expires_at,
            Err(_) => true,
        }
    }
}
