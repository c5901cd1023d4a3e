//! Scrollpass membership enrollment.

use crate::WebResult;
use crate::error::AppError;
use crate::request::EnrollmentPayload;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use regaccess_core::types::{EventId, ProfileId};
use serde::Serialize;

/// Body of a successful enrollment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    /// Event joined
    pub event_id: EventId,
    /// New member
    pub profile_id: ProfileId,
    /// Member count after enrollment
    pub member_count: usize,
}

/// `POST /api/events/:event_id/members/scrollpass`
///
/// Each hash is redeemable once, by anyone.
///
/// # Errors
///
/// 400 for a malformed body, 409 for an existing member or a redeemed hash,
/// 404 for an event without a membership document, 500 for infrastructure
/// failures.
pub async fn enroll_scrollpass_member(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<EnrollmentPayload>, JsonRejection>,
) -> WebResult<(StatusCode, Json<EnrollmentResponse>)> {
    let Json(payload) = payload.map_err(|r| AppError::bad_request(r.body_text()))?;
    let membership = state
        .gateway
        .enroll_scrollpass_member(
            &EventId::new(event_id),
            payload.profile_id.clone(),
            payload.scrollpass_hash,
        )
        .await
        .map_err(|e| AppError::from_domain(e, state.expose_internal_errors))?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            event_id: membership.event_id,
            profile_id: payload.profile_id,
            member_count: membership.members.len(),
        }),
    ))
}
