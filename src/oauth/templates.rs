//! Callback HTML pages
//!
//! The popup talks to the Decap CMS admin page (its opener) with
//! `window.postMessage`. The message strings are fixed by Decap CMS:
//! `authorization:github:success:<token>` and `authorization:github:error:<message>`.

use askama::Template;

/// Delay before posting, gives the opener time to attach its listener
const POST_DELAY_MS: u32 = 50;

/// Delay before the popup navigates away when `window.close()` was refused
const REDIRECT_DELAY_MS: u32 = 500;

pub const SUCCESS_MESSAGE_PREFIX: &str = "authorization:github:success:";
pub const ERROR_MESSAGE_PREFIX: &str = "authorization:github:error:";

/// Page returned after a successful exchange
///
/// Script values are pre-quoted JS literals and rendered unescaped.
#[derive(Template)]
#[template(path = "oauth_success.html")]
struct SuccessPage {
    message: String,
    target_origin: String,
    redirect_url: String,
    post_delay_ms: u32,
    redirect_delay_ms: u32,
}

/// Page returned when the exchange failed
///
/// Posts to `*` since the message carries no credential.
#[derive(Template)]
#[template(path = "oauth_error.html")]
struct ErrorPage {
    detail: String,
    message: String,
}

pub fn render_success_page(
    access_token: &str,
    target_origin: &str,
    redirect_url: &str,
) -> Result<String, askama::Error> {
    SuccessPage {
        message: js_string(&format!("{}{}", SUCCESS_MESSAGE_PREFIX, access_token)),
        target_origin: js_string(target_origin),
        redirect_url: js_string(redirect_url),
        post_delay_ms: POST_DELAY_MS,
        redirect_delay_ms: REDIRECT_DELAY_MS,
    }
    .render()
}

pub fn render_error_page(detail: &str, opener_message: &str) -> Result<String, askama::Error> {
    ErrorPage {
        detail: detail.to_string(),
        message: js_string(&format!("{}{}", ERROR_MESSAGE_PREFIX, opener_message)),
    }
    .render()
}

/// Quote `value` as a JavaScript string literal safe inside `<script>`
fn js_string(value: &str) -> String {
    // JSON strings are valid JS literals; `</` would still end the script element
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
