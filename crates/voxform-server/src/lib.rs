#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod form;
mod home;
mod login;
mod pages;
mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};
use delivery::{EncoderSlot, LameEncoder};
use http::StatusCode;
use tower_http::trace::TraceLayer;
use tts::Synthesizer;
use voxform_config::{Config, ServerConfig};
use voxform_identity::{FirebaseIdentityProvider, IdentityProvider};

pub use form::{Draft, FormController, Rejected};
pub use session::{CurrentSession, Session, SessionStore};

/// Shared state behind the page handlers
#[derive(Clone)]
pub(crate) struct AppState {
    synthesizer: Arc<dyn Synthesizer>,
    encoder: Arc<EncoderSlot>,
    sessions: SessionStore,
}

/// Collaborators the server is assembled from
pub struct Services {
    pub tts: Arc<tts::Server>,
    pub identity: Arc<dyn IdentityProvider>,
    pub encoder: Arc<EncoderSlot>,
}

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// The MP3 encoder is loaded in the background; until it is ready, PCM
    /// downloads report that the encoder has not loaded yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider is not configured or cannot
    /// be built, or if the configured bitrate is rejected by the encoder
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let identity_config = config
            .identity
            .as_ref()
            .context("an [identity] section is required to sign users in")?;
        let identity = Arc::new(FirebaseIdentityProvider::new(identity_config)?);

        let lame = Arc::new(LameEncoder::new(config.audio.bitrate_kbps)?);
        let encoder = Arc::new(EncoderSlot::empty());
        tokio::spawn({
            let encoder = Arc::clone(&encoder);
            async move { encoder.load(lame).await }
        });

        let services = Services {
            tts: tts::build_server(&config),
            identity,
            encoder,
        };

        Ok(Self::with_services(&config.server, services))
    }

    /// Build the server around already constructed collaborators
    pub fn with_services(config: &ServerConfig, services: Services) -> Self {
        let listen_address = config
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let state = AppState {
            synthesizer: services.tts.clone(),
            encoder: services.encoder,
            sessions: SessionStore::new(&config.session, services.identity),
        };

        // Pages and the speech action, all behind the session middleware
        let speech = tts::endpoint_router()
            .with_state(services.tts)
            .layer(axum::middleware::from_fn(session::require_user));

        let mut app = Router::new()
            .route("/login", get(login::login_page).post(login::sign_in))
            .route("/login/reset", post(login::password_reset))
            .route("/logout", post(login::sign_out))
            .route("/", get(home::form_page).post(home::submit))
            .merge(speech)
            .layer(axum::middleware::from_fn_with_state(
                state.sessions.clone(),
                session::session_middleware,
            ))
            .with_state(state);

        // Public routes
        app = app.merge(tts::catalog_router());

        if config.health.enabled {
            app = app.route(&config.health.path, get(health_handler));
        }

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the configured listen address
    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
