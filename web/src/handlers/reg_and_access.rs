//! Registration & access record endpoints.
//!
//! - `POST /api/reg-and-access` - apply an update intent
//! - `GET /api/events/:event_id/reg-and-access` - record plus evaluated policy

use crate::WebResult;
use crate::error::AppError;
use crate::extractors::CorrelationId;
use crate::request::UpdatePayload;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use regaccess_core::RegAccessError;
use regaccess_core::intent::UpdateRequest;
use regaccess_core::types::EventId;
use regaccess_gateway::PolicyView;
use serde::Serialize;

/// Body of a successful update.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Confirmation, e.g. `"switch updated"`
    pub message: String,
}

/// Applies an update intent.
///
/// Every failure, including a body that does not parse, is answered with 500
/// and `{error, code, status}`; `code` tells the failures apart.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/reg-and-access \
///   -H 'content-type: application/json' \
///   -d '{"type":"switch","eventId":"e1","profileId":"did:a","id":"r1","checkinOpen":"1"}'
/// # {"message":"switch updated"}
/// ```
///
/// # Errors
///
/// Any [`RegAccessError`], rendered with status 500.
pub async fn submit_update(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    payload: Result<Json<UpdatePayload>, JsonRejection>,
) -> WebResult<Json<SubmitResponse>> {
    let expose = state.expose_internal_errors;
    let failure = move |error: RegAccessError| {
        AppError::from_domain(error, expose).with_status(StatusCode::INTERNAL_SERVER_ERROR)
    };

    let Json(payload) = payload
        .map_err(|rejection| failure(RegAccessError::InvalidIntent(rejection.body_text())))?;
    let request = UpdateRequest::try_from(payload).map_err(failure)?;

    let receipt = state.gateway.submit(request).await.map_err(failure)?;

    tracing::debug!(
        correlation_id = %correlation_id,
        record_id = %receipt.record.id,
        "Update applied"
    );
    Ok(Json(SubmitResponse {
        message: receipt.message,
    }))
}

/// Returns the event's record with its evaluated policy.
///
/// # Errors
///
/// 404 when the event has no record, 500 when the read fails.
pub async fn get_policy(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> WebResult<Json<PolicyView>> {
    let view = state
        .gateway
        .policy(&EventId::new(event_id))
        .await
        .map_err(|e| AppError::from_domain(e, state.expose_internal_errors))?;

    Ok(Json(view))
}
