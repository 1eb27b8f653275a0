use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use voxform_identity::Page;

use crate::{
    AppState,
    form::{self, FormFields, Intent},
    pages,
    session::CurrentSession,
};

/// Signed-in user's email; the gate has already rejected anonymous sessions
fn email(current: &CurrentSession) -> String {
    current.state().user.map(|user| user.email).unwrap_or_default()
}

pub async fn form_page(current: CurrentSession) -> Response {
    if let Some(response) = current.guard(Page::Protected) {
        return response;
    }

    let form = current.session.form.lock().await;
    pages::form(&form, &email(&current), None).into_response()
}

/// Apply the posted selections, then either re-render or generate
///
/// A successful generate answers with the MP3 attachment; every failure
/// re-renders the form with its message.
pub async fn submit(State(state): State<AppState>, current: CurrentSession, Form(fields): Form<FormFields>) -> Response {
    if let Some(response) = current.guard(Page::Protected) {
        return response;
    }

    let intent = fields.intent;
    current.session.form.lock().await.apply(fields);

    if intent == Intent::Refresh {
        let form = current.session.form.lock().await;
        return pages::form(&form, &email(&current), None).into_response();
    }

    // Run detached so a dropped connection cannot leave the form in flight
    let session = current.session.clone();
    let task = tokio::spawn(async move {
        form::submit(&session.form, state.synthesizer.as_ref(), &state.encoder).await
    });

    let rejection = match task.await {
        Ok(Ok(Some(download))) => {
            tracing::info!(file_name = %download.file_name(), "download ready");
            return download.into_response();
        }
        Ok(Ok(None)) => None,
        Ok(Err(rejected)) => Some(rejected.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "submit task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "submit failed").into_response();
        }
    };

    let form = current.session.form.lock().await;
    pages::form(&form, &email(&current), rejection.as_deref()).into_response()
}
