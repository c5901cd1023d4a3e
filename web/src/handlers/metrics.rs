//! Prometheus scrape endpoint.

use crate::{WebResult, error::AppError, state::AppState};
use axum::{extract::State, http::header, response::IntoResponse};

/// Renders every registered metric in the Prometheus text format.
///
/// # Errors
///
/// 503 when no recorder was installed.
#[allow(clippy::unused_async)]
pub async fn render_metrics(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::unavailable("Metrics recorder not installed"))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
