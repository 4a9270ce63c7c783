//! HTTP route handlers.
//!
//! Page routes render Askama templates; `/download` streams the stored
//! translation bytes. Uploads use the POST-Redirect-GET pattern so a page
//! refresh never re-runs a translation.

mod download;
mod log;
mod pages;
mod text;
mod upload;

pub use download::download;
pub use log::activity_page;
pub use pages::{index, result_page};
pub use text::translate_text;
pub use upload::upload_document;

use axum::http::StatusCode;
use doc_translator_core::{display_name_for_code, lang_for_display_name, Error, Lang};
use serde::Deserialize;

/// Form data for the typed-text flow.
#[derive(Deserialize)]
pub struct TextForm {
    pub text: String,
    #[serde(default)]
    pub username: String,
    pub target: String,
}

/// Label written to the activity log when no username was given.
pub const ANONYMOUS_USER: &str = "anonymous";

pub fn username_or_default(username: &str) -> &str {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        ANONYMOUS_USER
    } else {
        trimmed
    }
}

/// Resolve a submitted target language (code or display name) against the
/// exposed table. Unknown targets are rejected here, before any backend
/// call is attempted.
pub fn resolve_target(input: &str) -> Result<Lang, (StatusCode, String)> {
    let input = input.trim();
    if display_name_for_code(input).is_some() {
        return Ok(Lang::new(input));
    }
    lang_for_display_name(input).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Error::TranslationUnsupportedLanguage(input.to_string()).to_string(),
        )
    })
}
