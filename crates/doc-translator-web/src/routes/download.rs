//! Download route - streams stored translation bytes.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::state::SharedState;

/// Download a finished translation by session ID.
pub async fn download(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> RouteResult<Response> {
    let (name, bytes) = state
        .with_session(&session_id, |session| {
            (session.download_name.clone(), session.output.clone())
        })
        .await
        .or_not_found("Session not found or expired")?;

    let content_type = mime_guess::from_path(&name).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        )
        .body(Body::from(bytes))
        .or_internal_error()
}
