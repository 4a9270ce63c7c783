//! Upload route - document upload and translation.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use axum_extra::extract::Multipart;
use doc_translator_core::{util, DocFormat, Error, Lang};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::helpers::{ResultExt, RouteResult};
use crate::routes::username_or_default;
use crate::state::{Session, SharedState};

/// Upload and translate a document, then redirect to the result page
/// (POST-Redirect-GET pattern).
///
/// Supports both HTMX requests (HX-Redirect header) and standard form
/// submissions (303 See Other) so the form works without JavaScript.
pub async fn upload_document(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> RouteResult<Response> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut username = String::new();
    let mut target = String::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "file" => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let data = field.bytes().await.or_bad_request()?;
                file = Some((filename, data.to_vec()));
            }
            "username" => username = field.text().await.or_bad_request()?,
            "target" => target = field.text().await.or_bad_request()?,
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| (StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;

    // Strip any client-supplied directory components.
    let filename = Path::new(&filename)
        .file_name()
        .map_or_else(|| "document".to_string(), |n| n.to_string_lossy().to_string());

    // Reject unknown extensions before reading a single byte of content.
    let format = DocFormat::from_path(Path::new(&filename))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let target = if target.trim().is_empty() {
        Lang::new(doc_translator_core::DEFAULT_TARGET_LANG)
    } else {
        crate::routes::resolve_target(&target)?
    };

    // Keep a copy of the upload, like the rest of the flow, best effort.
    let upload_path = state.config.storage.upload_dir.join(&filename);
    if let Err(e) = tokio::fs::write(&upload_path, &data).await {
        warn!("Failed to save upload {}: {}", upload_path.display(), e);
    }

    let pipeline = state.pipeline(target.clone()).map_err(|e| {
        error!("Failed to create pipeline: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let (output, units, detection) =
        pipeline
            .translate_bytes(format, &data)
            .await
            .map_err(|e| match e {
                Error::NoTextContent => (StatusCode::BAD_REQUEST, e.to_string()),
                other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            })?;

    let download_name = util::translated_output_path(Path::new(&filename), &target, None)
        .file_name()
        .map_or_else(|| "translated".to_string(), |n| n.to_string_lossy().to_string());

    let source_label = detection.label();
    let session = Session {
        original_filename: filename.clone(),
        download_name,
        output: output.into(),
        source_label: source_label.clone(),
        target: target.clone(),
        units_translated: units,
        created_at: Instant::now(),
    };
    let session_id = state.insert_session(session).await;

    state
        .activity_log
        .append(
            username_or_default(&username),
            &filename,
            &source_label,
            target.as_str(),
        )
        .or_internal_error()?;

    info!(
        "Translated {} ({} units) for session {}",
        filename, units, session_id
    );

    let redirect_url = format!("/result/{session_id}");
    let is_htmx = headers.get("HX-Request").is_some();

    if is_htmx {
        Response::builder()
            .status(StatusCode::OK)
            .header("HX-Redirect", redirect_url)
            .body(Body::empty())
            .or_internal_error()
    } else {
        Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header(header::LOCATION, redirect_url)
            .body(Body::empty())
            .or_internal_error()
    }
}
