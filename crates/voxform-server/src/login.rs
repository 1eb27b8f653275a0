use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use http::header;
use serde::Deserialize;
use voxform_core::HttpError;
use voxform_identity::{HOME_PATH, Page, SIGN_IN_PATH};

use crate::{AppState, pages, session::CurrentSession};

const RESET_SENT: &str = "Password reset link sent! Check your inbox.";

#[derive(Debug, Deserialize)]
pub struct SignInFields {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetFields {
    #[serde(default)]
    email: String,
}

pub async fn login_page(current: CurrentSession) -> Response {
    if let Some(response) = current.guard(Page::SignIn) {
        return response;
    }

    pages::login("", None, None).into_response()
}

/// Sign in, moving the session to a new id on success
pub async fn sign_in(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(fields): Form<SignInFields>,
) -> Response {
    if let Some(response) = current.guard(Page::SignIn) {
        return response;
    }

    match current.session.auth.sign_in(&fields.email, &fields.password).await {
        Ok(identity) => {
            let id = state.sessions.rotate(&current.id, &current.session);
            tracing::info!(uid = %identity.uid, session = %id, "signed in");

            let mut response = Redirect::to(HOME_PATH).into_response();
            if let Some(cookie) = state.sessions.cookie(id) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
        Err(e) => {
            tracing::warn!(session = %current.id, error = %e, "sign-in failed");
            (e.status_code(), pages::login(&fields.email, Some(&e.client_message()), None)).into_response()
        }
    }
}

pub async fn password_reset(current: CurrentSession, Form(fields): Form<ResetFields>) -> Response {
    if let Some(response) = current.guard(Page::SignIn) {
        return response;
    }

    match current.session.auth.send_password_reset(&fields.email).await {
        Ok(()) => pages::login(&fields.email, None, Some(RESET_SENT)).into_response(),
        Err(e) => {
            tracing::warn!(session = %current.id, error = %e, "password reset failed");
            (e.status_code(), pages::login(&fields.email, Some(&e.client_message()), None)).into_response()
        }
    }
}

/// Sign out locally, forget the session and expire its cookie
pub async fn sign_out(State(state): State<AppState>, current: CurrentSession) -> Response {
    current.session.auth.sign_out();
    state.sessions.remove(&current.id);

    tracing::debug!(session = %current.id, "signed out");

    let mut response = Redirect::to(SIGN_IN_PATH).into_response();
    if let Some(cookie) = state.sessions.expired_cookie() {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    response
}
