#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod auth;
mod error;
mod firebase;
mod gate;
mod identity;
mod provider;

pub use auth::{Auth, AuthState};
pub use error::AuthError;
pub use firebase::FirebaseIdentityProvider;
pub use gate::{GateDecision, HOME_PATH, IdentityGate, Page, SIGN_IN_PATH, SessionState, decide};
pub use identity::Identity;
pub use provider::IdentityProvider;
