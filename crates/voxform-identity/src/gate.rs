use tokio::sync::watch;

use crate::{Auth, AuthError, Identity, auth::AuthState};

/// What the application is allowed to know about the current session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub user: Option<Identity>,
    /// `true` until the first auth notification has arrived
    pub loading: bool,
}

impl SessionState {
    fn from_auth(state: &AuthState) -> Self {
        match state {
            None => Self {
                user: None,
                loading: true,
            },
            Some(user) => Self {
                user: user.clone(),
                loading: false,
            },
        }
    }
}

/// One mounted subscription to an [`Auth`]
///
/// Mounting takes exactly one subscription; dropping the gate releases it.
pub struct IdentityGate {
    rx: watch::Receiver<AuthState>,
}

impl IdentityGate {
    pub fn mount(auth: &Auth) -> Self {
        Self {
            rx: auth.on_auth_state_changed(),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_auth(&self.rx.borrow())
    }

    /// Wait for the next emission and return the new state
    pub async fn changed(&mut self) -> Result<SessionState, AuthError> {
        self.rx.changed().await.map_err(|_| AuthError::OutsideScope)?;
        Ok(SessionState::from_auth(&self.rx.borrow_and_update()))
    }
}

/// Kind of page being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// The sign-in screen
    SignIn,
    /// Anything that requires a signed-in user
    Protected,
}

/// Outcome of the routing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Auth state unknown; render only a waiting indicator
    Wait,
    Render,
    Redirect(&'static str),
}

pub const SIGN_IN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Routing policy for a page given the session state
pub fn decide(state: &SessionState, page: Page) -> GateDecision {
    if state.loading {
        return GateDecision::Wait;
    }

    match (page, state.user.is_some()) {
        (Page::Protected, false) => GateDecision::Redirect(SIGN_IN_PATH),
        (Page::SignIn, true) => GateDecision::Redirect(HOME_PATH),
        _ => GateDecision::Render,
    }
}
