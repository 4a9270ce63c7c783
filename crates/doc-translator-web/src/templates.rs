//! Askama templates for the web pages.
//!
//! - `base.html` - common layout
//! - `index.html` - upload and typed-text forms
//! - `result.html` - document translation result with download link
//! - `text_result.html` - typed-text translation, side by side
//! - `log.html` - activity log table

use askama::Template;
use askama_web::WebTemplate;
use doc_translator_core::{target_languages, ActivityRecord, LanguageOption, DEFAULT_TARGET_LANG};

/// Landing page with the upload and text forms.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub targets: Vec<LanguageOption>,
    pub default_target: &'static str,
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self {
            targets: target_languages(),
            default_target: DEFAULT_TARGET_LANG,
        }
    }
}

/// Document translation result with a download link.
#[derive(Template, WebTemplate)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub session_id: String,
    pub original_filename: String,
    pub download_name: String,
    pub source_label: String,
    pub target_name: String,
    pub units_translated: usize,
}

/// Typed-text translation shown side by side with the original.
#[derive(Template, WebTemplate)]
#[template(path = "text_result.html")]
pub struct TextResultTemplate {
    pub session_id: String,
    pub original: String,
    pub translated: String,
    pub source_label: String,
    pub target_name: String,
}

/// Activity log table, most recent rows first.
#[derive(Template, WebTemplate)]
#[template(path = "log.html")]
pub struct LogTemplate {
    pub rows: Vec<ActivityRecord>,
}
