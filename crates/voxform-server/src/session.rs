use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, HeaderValue, header, request::Parts};
use jiff::Timestamp;
use mini_moka::sync::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;
use voxform_config::SessionConfig;
use voxform_identity::{Auth, AuthError, GateDecision, IdentityGate, IdentityProvider, Page, SessionState, decide};

use crate::{form::FormController, pages};

/// One browser session
///
/// The id lives in the store's key, not here, so a session can be moved to a
/// new id when its user signs in.
pub struct Session {
    pub auth: Auth,
    pub form: Mutex<FormController>,
}

/// In-memory sessions keyed by the id in the session cookie
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, Arc<Session>>,
    identity: Arc<dyn IdentityProvider>,
    cookie_name: String,
    secure: bool,
}

impl SessionStore {
    pub fn new(config: &SessionConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_idle(config.idle_timeout())
                .build(),
            identity,
            cookie_name: config.cookie_name.clone(),
            secure: config.secure,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.sessions.get(id)
    }

    /// Start a session with nobody signed in
    pub fn create(&self) -> (Uuid, Arc<Session>) {
        let auth = Auth::new(Arc::clone(&self.identity));
        // A fresh session has no persisted user to restore
        auth.resolve(None);

        let id = Uuid::new_v4();
        let session = Arc::new(Session {
            auth,
            form: Mutex::new(FormController::new()),
        });

        self.sessions.insert(id, Arc::clone(&session));
        tracing::debug!(session = %id, "session created");

        (id, session)
    }

    /// Move `session` from `old` to a fresh id
    ///
    /// Sign-in state and the form draft travel with it; the old id stops
    /// resolving immediately.
    pub fn rotate(&self, old: &Uuid, session: &Arc<Session>) -> Uuid {
        let id = Uuid::new_v4();

        self.sessions.insert(id, Arc::clone(session));
        self.sessions.invalidate(old);
        tracing::debug!(from = %old, to = %id, "session rotated");

        id
    }

    pub fn remove(&self, id: &Uuid) {
        self.sessions.invalidate(id);
    }

    /// Session id carried by the request's cookies, if any
    pub fn session_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .and_then(|(_, value)| Uuid::parse_str(value).ok())
    }

    /// `Set-Cookie` value binding the browser to `id`
    pub fn cookie(&self, id: Uuid) -> Option<HeaderValue> {
        let mut cookie = format!("{}={id}; Path=/; HttpOnly; SameSite=Lax", self.cookie_name);
        if self.secure {
            cookie.push_str("; Secure");
        }

        self.header_value(&cookie)
    }

    /// `Set-Cookie` value that makes the browser forget the session
    pub fn expired_cookie(&self) -> Option<HeaderValue> {
        let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.cookie_name);
        if self.secure {
            cookie.push_str("; Secure");
        }

        self.header_value(&cookie)
    }

    fn header_value(&self, cookie: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(cookie)
            .inspect_err(|e| tracing::error!(cookie_name = %self.cookie_name, error = %e, "invalid session cookie"))
            .ok()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

/// The request's session together with its mounted identity gate
///
/// Present in request extensions only inside the session middleware; the
/// gate is released when the last clone is dropped at the end of the request.
#[derive(Clone)]
pub struct CurrentSession {
    /// Id the request arrived with
    pub id: Uuid,
    pub session: Arc<Session>,
    gate: Arc<IdentityGate>,
}

impl CurrentSession {
    pub fn state(&self) -> SessionState {
        self.gate.state()
    }

    /// Response to send instead of rendering `page`, if any
    pub fn guard(&self, page: Page) -> Option<Response> {
        match decide(&self.state(), page) {
            GateDecision::Render => None,
            GateDecision::Wait => Some(pages::waiting().into_response()),
            GateDecision::Redirect(to) => Some(Redirect::to(to).into_response()),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "session read without the session middleware");
            AuthError::OutsideScope
        })
    }
}

/// Attach the browser's session to the request, creating one if needed
///
/// Known sessions get their ID token renewed when it is about to expire.
pub async fn session_middleware(State(store): State<SessionStore>, mut request: Request, next: Next) -> Response {
    let existing = store
        .session_id(request.headers())
        .and_then(|id| store.get(&id).map(|session| (id, session)));

    let (id, session, created) = match existing {
        Some((id, session)) => {
            session.auth.refresh_if_expired(Timestamp::now()).await;
            (id, session, false)
        }
        None => {
            let (id, session) = store.create();
            (id, session, true)
        }
    };

    let gate = IdentityGate::mount(&session.auth);
    request.extensions_mut().insert(CurrentSession {
        id,
        session,
        gate: Arc::new(gate),
    });

    let mut response = next.run(request).await;

    // Handlers that rotate or expire the session set their own cookie
    if created
        && !response.headers().contains_key(header::SET_COOKIE)
        && let Some(cookie) = store.cookie(id)
    {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    response
}

/// Reject requests whose session has nobody signed in
pub async fn require_user(session: CurrentSession, request: Request, next: Next) -> Response {
    if session.state().user.is_none() {
        return AuthError::SignInRequired.into_response();
    }

    next.run(request).await
}
