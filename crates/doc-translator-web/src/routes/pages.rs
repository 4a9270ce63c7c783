//! Page routes - index and translation result.

use axum::extract::{Path, State};
use doc_translator_core::display_name_for_code;

use crate::helpers::{OptionExt, RouteResult};
use crate::state::SharedState;
use crate::templates::{IndexTemplate, ResultTemplate};

/// Landing page with the upload and text forms.
pub async fn index() -> IndexTemplate {
    IndexTemplate::default()
}

/// Result page after a document upload (target of the upload redirect).
pub async fn result_page(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> RouteResult<ResultTemplate> {
    state
        .with_session(&session_id, |session| ResultTemplate {
            session_id: session_id.clone(),
            original_filename: session.original_filename.clone(),
            download_name: session.download_name.clone(),
            source_label: session.source_label.clone(),
            target_name: display_name_for_code(session.target.as_str())
                .map_or_else(|| session.target.as_str().to_string(), ToString::to_string),
            units_translated: session.units_translated,
        })
        .await
        .or_not_found("Session not found or expired")
}
