//! Test server wrapper that starts voxform on a random port

use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use voxform_config::Config;
use voxform_server::Server;

use super::mock_google::{EMAIL, PASSWORD};

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment. The client keeps
    /// cookies, like a browser, but does not follow redirects so tests can
    /// assert on them.
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(config).await?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { addr, shutdown, client })
    }

    /// Start a server and sign its client in
    pub async fn start_signed_in(config: Config) -> anyhow::Result<Self> {
        let server = Self::start(config).await?;
        server.sign_in(EMAIL, PASSWORD).await?;
        Ok(server)
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Post the sign-in form
    pub async fn sign_in(&self, email: &str, password: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
    }

    /// Post the generator form
    pub async fn submit_form(&self, fields: &[(&str, &str)]) -> reqwest::Result<reqwest::Response> {
        self.client.post(self.url("/")).form(fields).send().await
    }

    /// Post the generator form until it answers with something other than the form page
    ///
    /// The MP3 encoder loads in the background after startup; until then a
    /// PCM submit re-renders the form with a not-ready message.
    pub async fn submit_form_when_encoder_ready(&self, fields: &[(&str, &str)]) -> reqwest::Result<reqwest::Response> {
        for _ in 0..50 {
            let response = self.submit_form(fields).await?;
            let not_ready = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .is_some_and(|value| value.as_bytes().starts_with(b"text/html"));

            if !not_ready {
                return Ok(response);
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        self.submit_form(fields).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
