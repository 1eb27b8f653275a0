use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use voxform_config::IdentityConfig;

use crate::{AuthError, Identity, IdentityProvider};

/// Firebase Authentication over its REST API
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    api_key: SecretString,
    sign_in_url: String,
    oob_url: String,
    token_url: String,
}

impl FirebaseIdentityProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &IdentityConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;

        let accounts = config.identity_base_url.as_str().trim_end_matches('/');
        let tokens = config.token_base_url.as_str().trim_end_matches('/');

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            sign_in_url: format!("{accounts}/accounts:signInWithPassword"),
            oob_url: format!("{accounts}/accounts:sendOobCode"),
            token_url: format!("{tokens}/token"),
        })
    }

    /// POST `body` as JSON and decode the success body
    ///
    /// Any failure is logged with the provider's detail; the caller picks
    /// the user-facing error.
    async fn post_json<B, R>(&self, url: &str, body: &B) -> Option<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body);

        self.execute(request).await
    }

    async fn execute<R>(&self, request: reqwest::RequestBuilder) -> Option<R>
    where
        R: DeserializeOwned,
    {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "identity provider unreachable");
                return None;
            }
        };

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<FirebaseErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();
            tracing::warn!(%status, %message, "identity provider rejected the request");
            return None;
        }

        match response.json().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "identity provider response unreadable");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct FirebaseErrorEnvelope {
    error: FirebaseError,
}

#[derive(Deserialize)]
struct FirebaseError {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Absolute expiry from Firebase's `expiresIn` seconds string
fn expires_at(expires_in: &str) -> Option<Timestamp> {
    let seconds: i64 = expires_in.parse().ok()?;
    Timestamp::now().checked_add(SignedDuration::from_secs(seconds)).ok()
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let body = SignInRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response: SignInResponse = self
            .post_json(&self.sign_in_url, &body)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        let expires_at = expires_at(&response.expires_in).ok_or(AuthError::InvalidCredentials)?;

        tracing::debug!(uid = %response.local_id, "signed in");

        Ok(Identity {
            uid: response.local_id,
            email: response.email,
            id_token: SecretString::from(response.id_token),
            refresh_token: SecretString::from(response.refresh_token),
            expires_at,
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = OobRequest {
            request_type: "PASSWORD_RESET",
            email,
        };

        self.post_json::<_, serde::de::IgnoredAny>(&self.oob_url, &body)
            .await
            .map(drop)
            .ok_or(AuthError::ResetFailed)
    }

    async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
        let request = self
            .http
            .post(&self.token_url)
            .query(&[("key", self.api_key.expose_secret())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", identity.refresh_token.expose_secret()),
            ]);

        let response: RefreshResponse = self.execute(request).await.ok_or(AuthError::SessionExpired)?;
        let expires_at = expires_at(&response.expires_in).ok_or(AuthError::SessionExpired)?;

        tracing::debug!(uid = %identity.uid, "refreshed ID token");

        Ok(Identity {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            id_token: SecretString::from(response.id_token),
            refresh_token: SecretString::from(response.refresh_token),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;
    use url::Url;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, body_string_contains, method, path, query_param},
    };

    use super::*;

    fn provider(server: &MockServer) -> FirebaseIdentityProvider {
        let base = Url::parse(&server.uri()).unwrap();
        let config = IdentityConfig {
            api_key: SecretString::from("web-key"),
            identity_base_url: base.clone(),
            token_base_url: base,
        };
        FirebaseIdentityProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn sign_in_returns_identity() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:signInWithPassword"))
            .and(query_param("key", "web-key"))
            .and(body_json(json!({
                "email": "ada@example.com",
                "password": "hunter2",
                "returnSecureToken": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-1",
                "email": "ada@example.com",
                "idToken": "id-1",
                "refreshToken": "refresh-1",
                "expiresIn": "3600",
                "registered": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = provider(&server).sign_in("ada@example.com", "hunter2").await.unwrap();

        assert_eq!(identity.uid, "uid-1");
        assert_eq!(identity.refresh_token.expose_secret(), "refresh-1");
        assert!(!identity.is_expired(Timestamp::now()));
    }

    #[tokio::test]
    async fn rejected_sign_in_is_generic() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server).sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[tokio::test]
    async fn password_reset_posts_oob_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:sendOobCode"))
            .and(body_json(json!({ "requestType": "PASSWORD_RESET", "email": "ada@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "ada@example.com" })))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server).send_password_reset("ada@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn failed_reset_is_generic() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "EMAIL_NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server).send_password_reset("nobody@example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to send reset link. Is the email correct?");
    }

    #[tokio::test]
    async fn refresh_exchanges_the_refresh_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": "id-2",
                "refresh_token": "refresh-2",
                "expires_in": "3600",
                "token_type": "Bearer",
                "user_id": "uid-1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stale = Identity {
            uid: "uid-1".to_string(),
            email: "ada@example.com".to_string(),
            id_token: SecretString::from("id-1"),
            refresh_token: SecretString::from("refresh-1"),
            expires_at: Timestamp::UNIX_EPOCH,
        };

        let fresh = provider(&server).refresh(&stale).await.unwrap();
        assert_eq!(fresh.id_token.expose_secret(), "id-2");
        assert_eq!(fresh.email, "ada@example.com");
    }
}
