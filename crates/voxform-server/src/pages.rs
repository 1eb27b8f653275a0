//! Server-rendered HTML for the sign-in screen, the form and the waiting page

use std::fmt::Write as _;

use axum::response::Html;
use tts::Engine;

use crate::form::FormController;

/// Escape text for use in element content and quoted attributes
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<main>\n{body}</main>\n</body>\n</html>\n",
        escape(title)
    ))
}

fn message(class: &str, text: Option<&str>) -> String {
    text.map(|text| format!("<p class=\"{class}\" role=\"alert\">{}</p>\n", escape(text)))
        .unwrap_or_default()
}

/// Shown while the session's auth state is still unknown
pub fn waiting() -> Html<String> {
    Html(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"1\">\n<title>Loading</title>\n</head>\n\
         <body>\n<main><p class=\"spinner\" aria-busy=\"true\">Loading...</p></main>\n</body>\n</html>\n"
            .to_string(),
    )
}

/// Sign-in screen with the password reset action
pub fn login(email: &str, error: Option<&str>, notice: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Sign In</h1>\n\
         <p>Enter your email and password to access the generator.</p>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label for=\"email\">Email</label>\n\
         <input id=\"email\" name=\"email\" type=\"email\" value=\"{email}\" required>\n\
         <label for=\"password\">Password</label>\n\
         <input id=\"password\" name=\"password\" type=\"password\" required>\n\
         {error}{notice}\
         <button type=\"submit\">Sign In</button>\n\
         <button type=\"submit\" formaction=\"/login/reset\" formnovalidate>Forgot password?</button>\n\
         </form>\n",
        email = escape(email),
        error = message("error", error),
        notice = message("notice", notice),
    );

    layout("Sign In", &body)
}

fn options<'a>(items: impl Iterator<Item = (&'a str, &'a str)>, selected: &str) -> String {
    items.fold(String::new(), |mut html, (code, name)| {
        let marker = if code == selected { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{}\"{marker}>{}</option>", escape(code), escape(name));
        html
    })
}

/// The generator form for a signed-in user
///
/// `rejection` is shown instead of the form's own error when the last
/// submit never started.
pub fn form(form: &FormController, email: &str, rejection: Option<&str>) -> Html<String> {
    let draft = form.draft();

    let engines = Engine::ALL.iter().fold(String::new(), |mut html, engine| {
        let checked = if *engine == draft.engine { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label><input type=\"radio\" name=\"engine\" value=\"{}\"{checked}> {}</label>",
            engine.as_str(),
            escape(engine.display_name()),
        );
        html
    });

    let (language_field, language_label, voice_field, voice_label) = match draft.engine {
        Engine::Gemini => ("gemini_accent", "Accent / Language", "gemini_voice", "Voice Character"),
        Engine::CloudTts => ("cloud_language", "Language", "cloud_voice", "Voice"),
    };

    let languages = options(
        form.visible_languages().iter().map(|language| (language.code, language.name)),
        form.selected_language(),
    );
    let voices = options(
        form.visible_voices().into_iter().map(|voice| (voice.code, voice.name)),
        form.selected_voice(),
    );

    let disabled = if form.can_submit() || draft.text.is_empty() { "" } else { " disabled" };
    let label = if form.in_flight() { "Generating..." } else { "Generate MP3" };

    let body = format!(
        "<h1>Text-to-Speech Generator</h1>\n\
         <p>Select an engine and options to generate audio.</p>\n\
         <p class=\"user\">Signed in as {email}</p>\n\
         <form method=\"post\" action=\"/\">\n\
         <fieldset>\n<legend>TTS Engine</legend>\n{engines}</fieldset>\n\
         <label for=\"text\">Text</label>\n\
         <textarea id=\"text\" name=\"text\" rows=\"5\" placeholder=\"Type your text here...\" required>{text}</textarea>\n\
         <label for=\"{language_field}\">{language_label}</label>\n\
         <select id=\"{language_field}\" name=\"{language_field}\">\n{languages}</select>\n\
         <label for=\"{voice_field}\">{voice_label}</label>\n\
         <select id=\"{voice_field}\" name=\"{voice_field}\">\n{voices}</select>\n\
         {error}\
         <button type=\"submit\" name=\"intent\" value=\"refresh\" formnovalidate>Update options</button>\n\
         <button type=\"submit\" name=\"intent\" value=\"generate\"{disabled}>{label}</button>\n\
         </form>\n\
         <form method=\"post\" action=\"/logout\">\n<button type=\"submit\">Sign Out</button>\n</form>\n",
        email = escape(email),
        text = escape(&draft.text),
        error = message("error", rejection.or_else(|| form.error())),
    );

    layout("Text-to-Speech Generator", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b a="1">Tom & 'Jerry'</b>"#), "&lt;b a=&quot;1&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn login_shows_error_and_escaped_email() {
        let Html(html) = login("<x>@example.com", Some("Invalid email or password."), None);

        assert!(html.contains("value=\"&lt;x&gt;@example.com\""));
        assert!(html.contains("Invalid email or password."));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn gemini_form_lists_accents_and_all_voices() {
        let Html(html) = form(&FormController::new(), "ada@example.com", None);

        assert!(html.contains("name=\"gemini_accent\""));
        assert!(html.contains("<option value=\"Puck\" selected>Puck (Upbeat)</option>"));
        assert!(html.contains("value=\"gemini\" checked"));
        assert!(!html.contains("cloud_voice"));
    }

    #[test]
    fn cloud_form_lists_voices_for_language() {
        let mut controller = FormController::new();
        controller.set_engine(Engine::CloudTts);
        controller.set_cloud_language("en-GB");

        let Html(html) = form(&controller, "ada@example.com", None);

        assert!(html.contains("<option value=\"en-GB-Wavenet-A\" selected>"));
        assert!(html.contains("en-GB-Wavenet-B"));
        assert!(!html.contains("en-US-Wavenet-A"));
    }

    #[test]
    fn stale_voice_disables_generate() {
        let mut controller = FormController::new();
        controller.set_text("hello");
        controller.set_engine(Engine::CloudTts);
        controller.set_cloud_language("it-IT");

        let Html(html) = form(&controller, "ada@example.com", None);
        assert!(html.contains("value=\"generate\" disabled"));
    }

    #[test]
    fn rejection_wins_over_form_error() {
        let Html(html) = form(&FormController::new(), "ada@example.com", Some("A request is already in progress."));
        assert!(html.contains("A request is already in progress."));
    }
}
