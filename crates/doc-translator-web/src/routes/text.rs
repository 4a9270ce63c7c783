//! Text route - translate typed text and offer it as a synthesized PDF.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use doc_translator_core::{detect_lines, display_name_for_code, pdf::synthesize_pdf, util, Error};
use std::time::Instant;
use tracing::error;

use crate::helpers::RouteResult;
use crate::routes::{username_or_default, TextForm};
use crate::state::{Session, SharedState};
use crate::templates::TextResultTemplate;

/// Translate typed text and show it next to the original.
///
/// The translation is also rendered to a fresh PDF and stored in a session
/// so the result page can offer a download.
pub async fn translate_text(
    State(state): State<SharedState>,
    Form(form): Form<TextForm>,
) -> RouteResult<TextResultTemplate> {
    let target = crate::routes::resolve_target(&form.target)?;

    let pipeline = state.pipeline(target.clone()).map_err(|e| {
        error!("Failed to create pipeline: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let translated = pipeline.translate_text(&form.text).await.map_err(|e| match e {
        Error::NoTextContent => (StatusCode::BAD_REQUEST, e.to_string()),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    let pdf = synthesize_pdf(&translated)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let detection = detect_lines(&form.text);
    let source_label = detection.label();

    let session = Session {
        original_filename: "-".to_string(),
        download_name: util::synthesized_pdf_name("text"),
        output: pdf.into(),
        source_label: source_label.clone(),
        target: target.clone(),
        units_translated: 1,
        created_at: Instant::now(),
    };
    let session_id = state.insert_session(session).await;

    state
        .activity_log
        .append(
            username_or_default(&form.username),
            "-",
            &source_label,
            target.as_str(),
        )
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(TextResultTemplate {
        session_id,
        original: form.text,
        translated,
        source_label,
        target_name: display_name_for_code(target.as_str())
            .map_or_else(|| target.as_str().to_string(), ToString::to_string),
    })
}
