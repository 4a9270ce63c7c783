//! Log route - activity log viewer.

use axum::extract::State;

use crate::helpers::{ResultExt, RouteResult};
use crate::state::SharedState;
use crate::templates::LogTemplate;

const MAX_ROWS: usize = 100;

/// Activity log page, most recent rows first.
pub async fn activity_page(State(state): State<SharedState>) -> RouteResult<LogTemplate> {
    let rows = state
        .activity_log
        .read_recent(MAX_ROWS)
        .or_internal_error()?;

    Ok(LogTemplate { rows })
}
