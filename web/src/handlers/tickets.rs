//! Ticket artwork updates.

use crate::WebResult;
use crate::error::AppError;
use crate::request::TicketImagePayload;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use regaccess_core::types::EventId;
use regaccess_gateway::TicketImageOutcome;

/// `POST /api/events/:event_id/tickets/image`
///
/// Replaces the image of every Scrollpass ticket whose contract address
/// matches, ignoring case. A request that matches nothing succeeds with
/// `{"outcome":"noMatchingTicket"}` and writes nothing.
///
/// # Errors
///
/// 400 for a malformed body, 404 when the event has no record, 500 for
/// signing, session or store failures.
pub async fn update_ticket_image(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<TicketImagePayload>, JsonRejection>,
) -> WebResult<Json<TicketImageOutcome>> {
    let Json(payload) = payload.map_err(|r| AppError::bad_request(r.body_text()))?;
    let outcome = state
        .gateway
        .update_ticket_image(
            &EventId::new(event_id),
            payload.profile_id,
            payload.contract_address,
            payload.image_url,
        )
        .await
        .map_err(|e| AppError::from_domain(e, state.expose_internal_errors))?;

    Ok(Json(outcome))
}
