//! Mock Google backends for integration tests
//!
//! Serves minimal versions of the Gemini `generateContent`, Cloud
//! Text-to-Speech `text:synthesize`, Identity Toolkit and Secure Token APIs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json, Router, routing};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// API key the mock accepts
pub const API_KEY: &str = "test-key";

/// The only account the mock identity provider knows
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct";

/// Bytes returned, base64 encoded, as the Cloud TTS MP3
pub const CLOUD_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00mock-mp3";

/// Sample rate advertised in the Gemini mime type
pub const GEMINI_SAMPLE_RATE: u32 = 24_000;

/// Mock Google APIs that return predictable responses
pub struct MockGoogle {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockGoogleState>,
}

struct MockGoogleState {
    gemini_count: AtomicU32,
    cloud_count: AtomicU32,
    sign_in_count: AtomicU32,
    reset_count: AtomicU32,
    /// Status and message every Gemini call fails with (if set)
    gemini_failure: Option<(StatusCode, String)>,
    last_gemini_body: Mutex<Option<Value>>,
    last_cloud_body: Mutex<Option<Value>>,
}

impl MockGoogle {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a mock whose Gemini endpoint always fails
    pub async fn start_with_gemini_error(status: StatusCode, message: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some((status, message.to_owned()))).await
    }

    async fn start_inner(gemini_failure: Option<(StatusCode, String)>) -> anyhow::Result<Self> {
        let state = Arc::new(MockGoogleState {
            gemini_count: AtomicU32::new(0),
            cloud_count: AtomicU32::new(0),
            sign_in_count: AtomicU32::new(0),
            reset_count: AtomicU32::new(0),
            gemini_failure,
            last_gemini_body: Mutex::new(None),
            last_cloud_body: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1beta/models/{call}", routing::post(handle_generate_content))
            .route("/v1/text:synthesize", routing::post(handle_synthesize))
            .route("/identity/v1/accounts:signInWithPassword", routing::post(handle_sign_in))
            .route("/identity/v1/accounts:sendOobCode", routing::post(handle_oob_code))
            .route("/securetoken/v1/token", routing::post(handle_token))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn gemini_base_url(&self) -> String {
        self.url("/v1beta")
    }

    pub fn cloud_tts_base_url(&self) -> String {
        self.url("/v1")
    }

    pub fn identity_base_url(&self) -> String {
        self.url("/identity/v1")
    }

    pub fn token_base_url(&self) -> String {
        self.url("/securetoken/v1")
    }

    pub fn gemini_count(&self) -> u32 {
        self.state.gemini_count.load(Ordering::Relaxed)
    }

    pub fn cloud_count(&self) -> u32 {
        self.state.cloud_count.load(Ordering::Relaxed)
    }

    pub fn sign_in_count(&self) -> u32 {
        self.state.sign_in_count.load(Ordering::Relaxed)
    }

    pub fn reset_count(&self) -> u32 {
        self.state.reset_count.load(Ordering::Relaxed)
    }

    /// Body of the most recent Gemini request
    pub fn last_gemini_body(&self) -> Option<Value> {
        self.state.last_gemini_body.lock().ok()?.clone()
    }

    /// Body of the most recent Cloud TTS request
    pub fn last_cloud_body(&self) -> Option<Value> {
        self.state.last_cloud_body.lock().ok()?.clone()
    }
}

impl Drop for MockGoogle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Half a second of a 440 Hz tone as 16-bit little-endian mono PCM
pub fn gemini_pcm() -> Vec<u8> {
    let samples = GEMINI_SAMPLE_RATE / 2;
    (0..samples)
        .flat_map(|i| {
            let t = f64::from(i) / f64::from(GEMINI_SAMPLE_RATE);
            #[allow(clippy::cast_possible_truncation)]
            let sample = ((t * 440.0 * std::f64::consts::TAU).sin() * 8000.0) as i16;
            sample.to_le_bytes()
        })
        .collect()
}

fn google_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message, "status": "INVALID_ARGUMENT" } })),
    )
        .into_response()
}

fn has_key(query: &HashMap<String, String>) -> bool {
    query.get("key").is_some_and(|key| key == API_KEY)
}

async fn handle_generate_content(
    State(state): State<Arc<MockGoogleState>>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !call.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if !has_key(&query) {
        return google_error(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key.");
    }

    state.gemini_count.fetch_add(1, Ordering::Relaxed);
    if let Ok(mut last) = state.last_gemini_body.lock() {
        *last = Some(body);
    }

    if let Some((status, message)) = &state.gemini_failure {
        return google_error(*status, message);
    }

    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{
                    "inlineData": {
                        "mimeType": format!("audio/L16;codec=pcm;rate={GEMINI_SAMPLE_RATE}"),
                        "data": STANDARD.encode(gemini_pcm()),
                    }
                }]
            },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

async fn handle_synthesize(
    State(state): State<Arc<MockGoogleState>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !has_key(&query) {
        return google_error(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key.");
    }

    state.cloud_count.fetch_add(1, Ordering::Relaxed);
    if let Ok(mut last) = state.last_cloud_body.lock() {
        *last = Some(body);
    }

    Json(json!({ "audioContent": STANDARD.encode(CLOUD_MP3) })).into_response()
}

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

async fn handle_sign_in(State(state): State<Arc<MockGoogleState>>, Json(body): Json<SignInBody>) -> Response {
    state.sign_in_count.fetch_add(1, Ordering::Relaxed);

    if body.email != EMAIL || body.password != PASSWORD {
        return google_error(StatusCode::BAD_REQUEST, "INVALID_LOGIN_CREDENTIALS");
    }

    Json(json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-ada",
        "email": EMAIL,
        "displayName": "",
        "idToken": "id-token-1",
        "registered": true,
        "refreshToken": "refresh-token-1",
        "expiresIn": "3600",
    }))
    .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OobBody {
    request_type: String,
    email: String,
}

async fn handle_oob_code(State(state): State<Arc<MockGoogleState>>, Json(body): Json<OobBody>) -> Response {
    state.reset_count.fetch_add(1, Ordering::Relaxed);

    if body.request_type != "PASSWORD_RESET" || body.email != EMAIL {
        return google_error(StatusCode::BAD_REQUEST, "EMAIL_NOT_FOUND");
    }

    Json(json!({ "kind": "identitytoolkit#GetOobConfirmationCodeResponse", "email": EMAIL })).into_response()
}

async fn handle_token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("grant_type").map(String::as_str) != Some("refresh_token") {
        return google_error(StatusCode::BAD_REQUEST, "INVALID_GRANT_TYPE");
    }

    Json(json!({
        "id_token": "id-token-2",
        "refresh_token": "refresh-token-2",
        "expires_in": "3600",
        "token_type": "Bearer",
        "user_id": "uid-ada",
    }))
    .into_response()
}
